use float_cmp::approx_eq;
use trellis_core::{BlockSizes, DiagramClass, ExpandedFlags, Obb, PlacedDiagram, point, size};
use trellis_physics::{BodyState, DiagramKey, EngineConfig, Error, SettlingEngine};

const FRAME: f64 = 1.0 / 60.0;

fn run_until_idle(engine: &mut SettlingEngine) {
    for _ in 0..2000 {
        if engine.settle_steps_remaining() == 0
            && engine.active_animation_count() == 0
            && engine.dragged_id().is_none()
        {
            return;
        }
        engine.step(FRAME);
    }
}

fn overlapping_pairs(placed: &PlacedDiagram) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (i, a) in placed.blocks.iter().enumerate() {
        for b in &placed.blocks[i + 1..] {
            if Obb::from_rect(&a.rect).intersects(&Obb::from_rect(&b.rect)) {
                out.push((a.class_id.clone(), b.class_id.clone()));
            }
        }
    }
    out
}

fn built(classes: &[DiagramClass]) -> SettlingEngine {
    let mut engine = SettlingEngine::new();
    engine.build(
        DiagramKey(1),
        classes,
        &ExpandedFlags::default(),
        &BlockSizes::default(),
    );
    engine
}

#[test]
fn building_without_classes_leaves_the_engine_empty() {
    let mut engine = built(&[]);
    assert!(!engine.is_built());
    assert!(engine.is_settled());
    assert!(engine.placed().is_empty());
    assert_eq!(engine.settle_steps_remaining(), 0);
    engine.step(FRAME);
    engine.begin_drag("A");
    engine.update_block_size("A", 10.0, 10.0, true);
    assert!(engine.dragged_id().is_none());
    assert_eq!(engine.active_animation_count(), 0);
}

#[test]
fn build_arms_the_settle_countdown() {
    let engine = built(&[DiagramClass::new("A"), DiagramClass::new("B").with_parent("A")]);
    assert!(engine.is_built());
    assert_eq!(engine.body_count(), 2);
    assert_eq!(engine.settle_steps_remaining(), 600);
    assert_eq!(engine.body_state("A"), Some(BodyState::Free));
    assert_eq!(engine.diagram_key(), Some(DiagramKey(1)));
}

#[test]
fn overlapping_seeds_separate_until_no_pair_intersects() {
    let classes = vec![
        DiagramClass::new("A").with_pin(100.0, 100.0),
        DiagramClass::new("B").with_pin(130.0, 110.0),
        DiagramClass::new("C").with_pin(90.0, 120.0),
        DiagramClass::new("D").with_pin(160.0, 95.0),
        DiagramClass::new("E").with_parent("A"),
    ];
    let mut engine = built(&classes);
    run_until_idle(&mut engine);

    assert!(engine.is_settled());
    assert_eq!(engine.settle_steps_remaining(), 0);
    let placed = engine.placed();
    assert_eq!(placed.len(), 5);
    assert!(overlapping_pairs(&placed).is_empty(), "{:?}", overlapping_pairs(&placed));
}

#[test]
fn identical_pins_stay_overlapping_after_settling() {
    let classes = vec![
        DiagramClass::new("A").with_pin(0.0, 0.0),
        DiagramClass::new("B").with_pin(0.0, 0.0),
    ];
    let mut sizes = BlockSizes::default();
    sizes.insert("A".to_string(), size(100.0, 50.0));
    sizes.insert("B".to_string(), size(100.0, 50.0));
    let mut engine = SettlingEngine::new();
    engine.build(DiagramKey(7), &classes, &ExpandedFlags::default(), &sizes);
    run_until_idle(&mut engine);

    assert!(engine.is_settled());
    assert_eq!(
        overlapping_pairs(&engine.placed()),
        vec![("A".to_string(), "B".to_string())]
    );
}

#[test]
fn rebuilding_the_same_diagram_keeps_blocks_in_place() {
    let classes = vec![
        DiagramClass::new("Root"),
        DiagramClass::new("Left").with_parent("Root"),
        DiagramClass::new("Right").with_parent("Root"),
        DiagramClass::new("Leaf").with_parent("Left").with_child("Right", "peer"),
    ];
    let mut engine = built(&classes);
    run_until_idle(&mut engine);
    engine.begin_drag("Leaf");
    engine.drag_to("Leaf", 600.0, 400.0);
    engine.end_drag("Leaf");
    run_until_idle(&mut engine);
    let before = engine.placed();

    engine.build(
        DiagramKey(1),
        &classes,
        &ExpandedFlags::default(),
        &BlockSizes::default(),
    );
    let after = engine.placed();

    for (a, b) in before.blocks.iter().zip(&after.blocks) {
        assert_eq!(a.class_id, b.class_id);
        let (ca, cb) = (a.rect.center(), b.rect.center());
        assert!((ca - cb).length() < 0.5, "{} moved from {ca:?} to {cb:?}", a.class_id);
    }
}

#[test]
fn a_new_diagram_key_discards_previous_positions() {
    let classes = vec![DiagramClass::new("A")];
    let mut engine = built(&classes);
    engine.begin_drag("A");
    engine.drag_to("A", 500.0, 500.0);
    engine.end_drag("A");
    run_until_idle(&mut engine);

    engine.build(
        DiagramKey(2),
        &classes,
        &ExpandedFlags::default(),
        &BlockSizes::default(),
    );
    assert_eq!(engine.rect("A").unwrap().origin(), point(8.0, 8.0));
}

#[test]
fn resize_keeps_the_top_left_anchor_and_lands_on_the_final_size() {
    let mut engine = built(&[DiagramClass::new("A")]);
    run_until_idle(&mut engine);
    let anchor = engine.rect("A").unwrap().origin();

    engine.update_block_size("A", 300.0, 120.0, true);
    assert_eq!(engine.body_state("A"), Some(BodyState::Resizing));
    engine.step(FRAME);
    engine.step(FRAME);
    let mid = engine.rect("A").unwrap();
    assert!(mid.width > 140.0 && mid.width < 300.0);

    engine.update_block_size("A", 220.7, 90.3, true);
    assert_eq!(engine.active_animation_count(), 1);
    for _ in 0..60 {
        engine.step(FRAME);
        if engine.active_animation_count() == 0 {
            break;
        }
    }

    assert_eq!(engine.active_animation_count(), 0);
    let end = engine.rect("A").unwrap();
    assert_eq!((end.width, end.height), (220.7, 90.3));
    assert!(approx_eq!(f64, end.x, anchor.x, epsilon = 1e-9));
    assert!(approx_eq!(f64, end.y, anchor.y, epsilon = 1e-9));
    assert_eq!(engine.body_state("A"), Some(BodyState::Free));
    assert!(engine.placed().get("A").unwrap().expanded);
}

#[test]
fn settled_is_false_while_an_animation_runs() {
    let mut engine = built(&[DiagramClass::new("A")]);
    run_until_idle(&mut engine);
    assert!(engine.is_settled());
    engine.update_block_size("A", 200.0, 80.0, true);
    assert!(!engine.is_settled());
    assert_eq!(engine.settle_steps_remaining(), 600);
}

#[test]
fn drag_to_for_a_block_that_is_not_dragged_does_nothing() {
    let mut engine = built(&[DiagramClass::new("A"), DiagramClass::new("B")]);
    run_until_idle(&mut engine);
    let b_before = engine.rect("B").unwrap();

    engine.begin_drag("A");
    engine.drag_to("B", 999.0, 999.0);
    assert_eq!(engine.rect("B").unwrap(), b_before);

    engine.drag_to("A", 500.0, 600.0);
    let a = engine.rect("A").unwrap();
    assert!(approx_eq!(f64, a.x, 500.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, a.y, 600.0, epsilon = 1e-9));
    assert_eq!(engine.body_state("A"), Some(BodyState::Dragged));
    assert_eq!(engine.dragged_id(), Some("A"));
}

#[test]
fn beginning_a_second_drag_releases_the_first() {
    let mut engine = built(&[DiagramClass::new("A"), DiagramClass::new("B")]);
    engine.begin_drag("A");
    engine.begin_drag("B");
    assert_eq!(engine.dragged_id(), Some("B"));
    assert_eq!(engine.body_state("A"), Some(BodyState::Free));
    assert_eq!(engine.body_state("B"), Some(BodyState::Dragged));

    engine.end_drag("A");
    assert_eq!(engine.dragged_id(), Some("B"));
    engine.end_drag("B");
    assert_eq!(engine.dragged_id(), None);
    assert_eq!(engine.body_state("B"), Some(BodyState::Free));
    assert_eq!(engine.settle_steps_remaining(), 600);
}

#[test]
fn dragged_block_pushes_free_neighbours_away() {
    let mut engine = built(&[DiagramClass::new("A"), DiagramClass::new("B")]);
    run_until_idle(&mut engine);
    let b = engine.rect("B").unwrap();

    engine.begin_drag("A");
    engine.drag_to("A", b.x + 20.0, b.y + 5.0);
    for _ in 0..300 {
        engine.step(FRAME);
    }
    let a = engine.rect("A").unwrap();
    assert!(approx_eq!(f64, a.x, b.x + 20.0, epsilon = 1e-9));
    assert!(engine.rect("B").unwrap() != b);
    assert!(overlapping_pairs(&engine.placed()).is_empty());
}

#[test]
fn unknown_ids_are_ignored() {
    let mut engine = built(&[DiagramClass::new("A")]);
    run_until_idle(&mut engine);
    let before = engine.placed();

    engine.begin_drag("Ghost");
    engine.drag_to("Ghost", 1.0, 1.0);
    engine.end_drag("Ghost");
    engine.update_block_size("Ghost", 10.0, 10.0, true);

    assert!(engine.dragged_id().is_none());
    assert_eq!(engine.active_animation_count(), 0);
    assert!(!engine.contains("Ghost"));
    assert!(engine.rect("Ghost").is_none());
    assert!(engine.body_state("Ghost").is_none());
    assert!(!engine.block_sizes().contains_key("Ghost"));
    assert_eq!(engine.placed(), before);
}

#[test]
fn resizing_a_known_block_records_its_new_size() {
    let mut engine = built(&[DiagramClass::new("A"), DiagramClass::new("B")]);
    engine.update_block_size("A", 200.0, 60.0, true);
    engine.update_block_size("Ghost", 10.0, 10.0, true);

    assert_eq!(engine.block_sizes().get("A"), Some(&size(200.0, 60.0)));
    assert_eq!(engine.block_sizes().len(), 1);
}

#[test]
fn idle_engine_does_not_move_anything() {
    let mut engine = built(&[DiagramClass::new("A"), DiagramClass::new("B")]);
    run_until_idle(&mut engine);
    let before = engine.placed();
    for _ in 0..10 {
        engine.step(FRAME);
    }
    assert_eq!(engine.placed(), before);
}

#[test]
fn clear_returns_to_the_empty_state() {
    let mut engine = built(&[DiagramClass::new("A")]);
    engine.clear();
    assert!(!engine.is_built());
    assert!(engine.is_settled());
    assert!(engine.placed().is_empty());
    assert_eq!(engine.diagram_key(), None);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = EngineConfig {
        substeps: 0,
        ..Default::default()
    };
    assert!(matches!(
        SettlingEngine::with_config(cfg),
        Err(Error::InvalidConfig { .. })
    ));
}
