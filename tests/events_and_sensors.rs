use rapier2d_lite::{shapes, BodyDef, BodyType, ShapeDef, World};

#[test]
fn contact_begin_and_end_events_fire_once_each() {
    let mut world = World::default();
    world.set_gravity((0.0, -10.0));

    let ground = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(
        ground,
        shapes::Shape::Polygon(shapes::box_polygon(10.0, 0.5)),
        &ShapeDef::builder().density(0.0).build(),
    ).unwrap();

    let body = world.create_body_id(
        &BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 3.0)).build(),
    ).unwrap();
    world.create_shape_id(body, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

    let mut begins = 0;
    let mut ends = 0;
    for _ in 0..180 {
        world.step(1.0 / 60.0);
        begins += world.step_events().contact_begin.len();
        ends += world.step_events().contact_end.len();
    }

    assert_eq!(begins, 1);
    assert_eq!(ends, 0, "a body resting on the ground should not separate again");
}

#[test]
fn sensor_overlap_is_reported_without_a_physical_response() {
    let mut world = World::default();
    world.set_gravity((0.0, 0.0));

    let sensor = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(
        sensor,
        shapes::Shape::Circle(shapes::circle((0.0, 0.0), 2.0)),
        &ShapeDef::builder().sensor(true).build(),
    ).unwrap();

    let visitor = world.create_body_id(
        &BodyDef::builder().body_type(BodyType::Dynamic).position((-5.0, 0.0)).linear_velocity((1.0, 0.0)).build(),
    ).unwrap();
    world.create_shape_id(visitor, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.25)), &ShapeDef::default()).unwrap();

    let mut sensor_begins = 0;
    for _ in 0..600 {
        world.step(1.0 / 60.0);
        sensor_begins += world.step_events().sensor_begin.len();
    }

    assert_eq!(sensor_begins, 1);
    // the visitor kept its velocity straight through the sensor region
    assert!((world.body_mut(visitor).linear_velocity().x - 1.0).abs() < 1e-4);
}

#[test]
fn disabled_event_flag_suppresses_contact_events() {
    let mut world = World::default();
    world.set_gravity((0.0, -10.0));

    let ground = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(
        ground,
        shapes::Shape::Polygon(shapes::box_polygon(10.0, 0.5)),
        &ShapeDef::builder().density(0.0).enable_contact_events(false).build(),
    ).unwrap();

    let body = world.create_body_id(
        &BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 3.0)).build(),
    ).unwrap();
    world.create_shape_id(
        body,
        shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)),
        &ShapeDef::builder().enable_contact_events(false).build(),
    ).unwrap();

    let mut begins = 0;
    for _ in 0..180 {
        world.step(1.0 / 60.0);
        begins += world.step_events().contact_begin.len();
    }

    assert_eq!(begins, 0);
}
