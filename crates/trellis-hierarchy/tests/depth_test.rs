use trellis_core::{ClassIndex, DiagramClass};
use trellis_hierarchy::PlacementConfig;
use trellis_hierarchy::depth::{Tree, assign_depths};
use trellis_hierarchy::order::rows_by_depth;

fn depths_of(classes: &[DiagramClass]) -> Vec<usize> {
    let index = ClassIndex::new(classes);
    assign_depths(&Tree::from_index(&index))
}

#[test]
fn linear_chain_gets_one_row_per_generation() {
    let classes = vec![
        DiagramClass::new("A"),
        DiagramClass::new("B").with_parent("A"),
        DiagramClass::new("C").with_parent("B"),
    ];
    let depths = depths_of(&classes);
    assert_eq!(depths, vec![0, 1, 2]);
    assert_eq!(rows_by_depth(&depths), vec![vec![0], vec![1], vec![2]]);
}

#[test]
fn every_child_is_exactly_one_row_below_its_primary_parent() {
    let classes = vec![
        DiagramClass::new("Leaf").with_parent("Mid"),
        DiagramClass::new("Mid").with_parent("Root"),
        DiagramClass::new("Root"),
        DiagramClass::new("Other").with_parent("Root").with_parent("Mid"),
        DiagramClass::new("Deep").with_parent("Leaf"),
        DiagramClass::new("Orphan").with_parent("NotInDiagram"),
    ];
    let index = ClassIndex::new(&classes);
    let tree = Tree::from_index(&index);
    let depths = assign_depths(&tree);

    for (ix, class) in classes.iter().enumerate() {
        match class.primary_parent().and_then(|p| index.position(p)) {
            Some(p) => assert_eq!(depths[ix], depths[p] + 1, "class {}", class.id),
            None => assert_eq!(depths[ix], 0, "root {}", class.id),
        }
    }
    assert_eq!(depths, vec![2, 1, 0, 1, 3, 0]);
}

#[test]
fn secondary_parents_do_not_affect_depth() {
    let classes = vec![
        DiagramClass::new("A"),
        DiagramClass::new("B").with_parent("A"),
        DiagramClass::new("C").with_parent("A").with_parent("B"),
    ];
    assert_eq!(depths_of(&classes), vec![0, 1, 1]);
}

#[test]
fn rows_keep_encounter_order_within_a_depth() {
    let depths = vec![1, 0, 1, 1, 0];
    assert_eq!(rows_by_depth(&depths), vec![vec![1, 4], vec![0, 2, 3]]);
    assert!(rows_by_depth(&[]).is_empty());
}

#[test]
fn default_placement_config_uses_three_sweeps() {
    let cfg = PlacementConfig::default();
    assert_eq!(cfg.sweeps, 3);
    assert_eq!(cfg.row_gap, 48.0);
    assert_eq!(cfg.composition_weight, 0.3);
}
