use nalgebra::Vector2;
use trellis_physics::{BodyDef, BodyKind, World, WorldConfig};

fn world() -> World {
    World::new(WorldConfig::default())
}

#[test]
fn overlapping_dynamic_boxes_are_pushed_apart_along_the_shallow_axis() {
    let mut w = world();
    let a = w.create_body(BodyDef::dynamic(Vector2::new(0.0, 0.0)).linear_damping(5.0));
    let b = w.create_body(BodyDef::dynamic(Vector2::new(10.0, 0.0)).linear_damping(5.0));
    w.create_box_collider(a, Vector2::new(20.0, 10.0)).unwrap();
    w.create_box_collider(b, Vector2::new(20.0, 10.0)).unwrap();

    for _ in 0..300 {
        w.step(1.0 / 60.0, 4);
    }

    let ta = w.translation(a).unwrap();
    let tb = w.translation(b).unwrap();
    assert!(tb.x - ta.x >= 40.0 - 1e-2, "still overlapping: {ta:?} {tb:?}");
    assert_eq!(ta.y, 0.0);
    assert_eq!(tb.y, 0.0);
    // Equal masses share the correction.
    assert!((ta.x + tb.x - 10.0).abs() < 1e-6);
}

#[test]
fn kinematic_bodies_are_not_moved_by_contacts() {
    let mut w = world();
    let wall = w.create_body(BodyDef::dynamic(Vector2::new(0.0, 0.0)));
    w.set_body_kind(wall, BodyKind::Kinematic);
    let free = w.create_body(BodyDef::dynamic(Vector2::new(0.0, 5.0)).linear_damping(5.0));
    w.create_box_collider(wall, Vector2::new(50.0, 10.0)).unwrap();
    w.create_box_collider(free, Vector2::new(50.0, 10.0)).unwrap();

    for _ in 0..200 {
        w.step(1.0 / 60.0, 4);
    }

    assert_eq!(w.translation(wall), Some(Vector2::new(0.0, 0.0)));
    let t = w.translation(free).unwrap();
    assert_eq!(t.x, 0.0);
    assert!(t.y >= 20.0 - 1e-2);
}

#[test]
fn two_kinematic_bodies_ignore_each_other() {
    let mut w = world();
    let a = w.create_body(BodyDef::dynamic(Vector2::new(0.0, 0.0)));
    let b = w.create_body(BodyDef::dynamic(Vector2::new(1.0, 0.0)));
    w.set_body_kind(a, BodyKind::Kinematic);
    w.set_body_kind(b, BodyKind::Kinematic);
    w.create_box_collider(a, Vector2::new(10.0, 10.0)).unwrap();
    w.create_box_collider(b, Vector2::new(10.0, 10.0)).unwrap();
    w.step(1.0 / 60.0, 4);
    assert_eq!(w.translation(a), Some(Vector2::new(0.0, 0.0)));
    assert_eq!(w.translation(b), Some(Vector2::new(1.0, 0.0)));
}

#[test]
fn coincident_centres_are_never_separated() {
    let mut w = world();
    let a = w.create_body(BodyDef::dynamic(Vector2::new(3.0, 4.0)));
    let b = w.create_body(BodyDef::dynamic(Vector2::new(3.0, 4.0)));
    w.create_box_collider(a, Vector2::new(10.0, 10.0)).unwrap();
    w.create_box_collider(b, Vector2::new(10.0, 10.0)).unwrap();
    for _ in 0..60 {
        w.step(1.0 / 60.0, 4);
    }
    assert_eq!(w.translation(a), w.translation(b));
    assert_eq!(w.linvel(a), Some(Vector2::zeros()));
}

#[test]
fn linear_damping_decays_velocity_without_contacts() {
    let mut w = world();
    let body = w.create_body(BodyDef::dynamic(Vector2::zeros()).linear_damping(5.0));
    w.set_linvel(body, Vector2::new(10.0, 0.0));
    w.step(1.0, 100);

    let v = w.linvel(body).unwrap();
    let expected = 10.0 * (1.0_f64 / 1.05).powi(100);
    assert!((v.x - expected).abs() < 1e-9);
    assert!(w.translation(body).unwrap().x > 0.0);
}

#[test]
fn resting_bodies_fall_asleep_and_wake_on_request() {
    let mut w = world();
    let body = w.create_body(BodyDef::dynamic(Vector2::zeros()));
    assert_eq!(w.is_sleeping(body), Some(false));
    for _ in 0..40 {
        w.step(1.0 / 60.0, 1);
    }
    assert_eq!(w.is_sleeping(body), Some(true));
    assert!(w.wake(body));
    assert_eq!(w.is_sleeping(body), Some(false));
}

#[test]
fn destroyed_handles_are_rejected_everywhere() {
    let mut w = world();
    let body = w.create_body(BodyDef::dynamic(Vector2::zeros()));
    let collider = w.create_box_collider(body, Vector2::new(1.0, 1.0)).unwrap();
    assert!(w.destroy_collider(collider));
    assert!(!w.destroy_collider(collider));
    assert!(w.destroy_body(body));
    assert_eq!(w.body_count(), 0);
    assert!(w.create_box_collider(body, Vector2::new(1.0, 1.0)).is_none());
    assert!(!w.set_body_kind(body, BodyKind::Kinematic));
    assert!(!w.set_linvel(body, Vector2::new(1.0, 0.0)));
    assert!(!w.wake(body));
    assert!(w.linvel(body).is_none());
}

#[test]
fn damping_is_recorded_per_body_and_stale_handles_report_none() {
    let mut w = world();
    let body = w.create_body(
        BodyDef::dynamic(Vector2::zeros())
            .linear_damping(5.0)
            .angular_damping(8.0),
    );
    assert_eq!(w.damping(body), Some((5.0, 8.0)));

    assert!(w.destroy_body(body));
    assert_eq!(w.damping(body), None);
}
