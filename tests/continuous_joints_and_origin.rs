use rapier2d_lite::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct ImpulseRecorder {
    normal_impulses: Vec<Real>,
}

struct RecordingListener(Rc<RefCell<ImpulseRecorder>>);

impl ContactListener for RecordingListener {
    fn post_solve(&mut self, _a: ShapeId, _b: ShapeId, impulse: &ContactImpulse) {
        self.0.borrow_mut().normal_impulses.extend(impulse.normal_impulses.iter().copied());
    }
}

#[test]
fn two_touching_disks_report_a_single_nonnegative_normal_impulse() {
    let config = WorldConfigBuilder::new().velocity_iterations(1).position_iterations(1).build();
    let mut world = World::new(config);
    world.set_gravity((0.0, 0.0));

    let recorder = Rc::new(RefCell::new(ImpulseRecorder::default()));
    world.set_contact_listener(Box::new(RecordingListener(recorder.clone())));

    let a = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 0.0)).build())
        .unwrap();
    world
        .create_shape_id(a, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 1.0)), &ShapeDef::builder().density(1.0).build())
        .unwrap();

    let b = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((2.0, 0.0)).build())
        .unwrap();
    world
        .create_shape_id(b, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 1.0)), &ShapeDef::builder().density(1.0).build())
        .unwrap();

    world.step(1.0 / 60.0);

    let recorded = recorder.borrow();
    assert_eq!(recorded.normal_impulses.len(), 1, "two touching disks should report exactly one contact point");
    assert!(recorded.normal_impulses[0] >= 0.0, "normal impulse must not be negative (no pulling contacts)");

    let pa = world.body_mut(a).position();
    let pb = world.body_mut(b).position();
    let separation = (pb.x - pa.x).hypot(pb.y - pa.y);
    assert!(separation >= 2.0 - 0.01, "disks should not have sunk past their combined radius, got {separation}");
}

#[test]
fn kinematic_body_translates_by_its_prescribed_velocity() {
    let mut world = World::default();
    world.set_gravity((0.0, 0.0));

    let platform = world
        .create_body_id(
            &BodyDef::builder()
                .body_type(BodyType::Kinematic)
                .position((0.0, 0.0))
                .linear_velocity((2.0, 0.0))
                .build(),
        )
        .unwrap();

    for _ in 0..60 {
        world.step(1.0 / 60.0);
    }

    let pos = world.body_mut(platform).position();
    assert!((pos.x - 2.0).abs() < 1e-3, "kinematic body did not advance by its velocity, x={}", pos.x);
    assert!((pos.y - 0.0).abs() < 1e-5);
}

#[test]
fn free_floating_kinematic_body_moves_without_any_contacts() {
    // a kinematic body with no shapes and no contacts must still be
    // integrated every step; it is never seeded into an island.
    let mut world = World::default();
    world.set_gravity((0.0, -10.0));

    let body = world
        .create_body_id(
            &BodyDef::builder()
                .body_type(BodyType::Kinematic)
                .position((0.0, 0.0))
                .angular_velocity(1.0)
                .build(),
        )
        .unwrap();

    world.step(1.0 / 60.0);

    let angle = world.body_mut(body).angle();
    assert!(angle > 0.0, "kinematic body's angle should advance regardless of gravity/contacts");
}

#[test]
fn bullet_does_not_tunnel_through_a_thin_wall() {
    let mut world = World::default();
    world.set_gravity((0.0, 0.0));

    let wall = world
        .create_body_id(&BodyDef::builder().position((5.0, 0.0)).build())
        .unwrap();
    world
        .create_shape_id(
            wall,
            shapes::Shape::Polygon(shapes::box_polygon(0.05, 5.0)),
            &ShapeDef::builder().density(0.0).build(),
        )
        .unwrap();

    let bullet = world
        .create_body_id(
            &BodyDef::builder()
                .body_type(BodyType::Dynamic)
                .position((0.0, 0.0))
                .linear_velocity((500.0, 0.0))
                .bullet(true)
                .build(),
        )
        .unwrap();
    world
        .create_shape_id(bullet, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.1)), &ShapeDef::default())
        .unwrap();

    world.step(1.0 / 60.0);

    let x = world.body_mut(bullet).position().x;
    assert!(x < 5.0, "bullet tunneled through the thin wall, ended up at x={x}");
}

#[test]
fn destroying_a_joint_wakes_both_connected_bodies() {
    let mut world = World::default();
    world.set_gravity((0.0, 0.0));

    let a = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 0.0)).build())
        .unwrap();
    world
        .create_shape_id(a, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default())
        .unwrap();

    let b = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((2.0, 0.0)).build())
        .unwrap();
    world
        .create_shape_id(b, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default())
        .unwrap();

    let base = JointBase::builder().bodies(a, b).build();
    let joint = world
        .create_distance_joint(DistanceJointDef {
            base,
            length: 2.0,
            min_length: 2.0,
            max_length: 2.0,
            enable_limit: true,
            enable_spring: false,
            hertz: 0.0,
            damping_ratio: 0.0,
        })
        .unwrap();
    let joint_id = joint.id();
    drop(joint);

    world.body_mut(a).set_awake(false);
    world.body_mut(b).set_awake(false);
    assert!(!world.body_mut(a).is_awake());
    assert!(!world.body_mut(b).is_awake());

    world.destroy_joint(joint_id).unwrap();

    assert!(world.body_mut(a).is_awake(), "destroying a joint should wake body_a");
    assert!(world.body_mut(b).is_awake(), "destroying a joint should wake body_b");
}

#[test]
fn shift_origin_preserves_relative_body_positions_and_is_invertible() {
    let mut world = World::default();
    world.set_gravity((0.0, 0.0));

    let body = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((15.0, 20.0)).build())
        .unwrap();
    world
        .create_shape_id(body, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default())
        .unwrap();

    let before = world.body_mut(body).position();

    world.shift_origin(Vec2::new(5.0, 5.0)).unwrap();
    let after = world.body_mut(body).position();
    assert!((after.x - (before.x - 5.0)).abs() < 1e-5);
    assert!((after.y - (before.y - 5.0)).abs() < 1e-5);

    world.shift_origin(Vec2::new(-5.0, -5.0)).unwrap();
    let restored = world.body_mut(body).position();
    assert!((restored.x - before.x).abs() < 1e-5);
    assert!((restored.y - before.y).abs() < 1e-5);
}
