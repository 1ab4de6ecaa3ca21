use rapier2d_lite::{shapes, BodyDef, BodyType, ShapeDef, World};

fn approx(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn box_settles_on_ground() {
    let mut world = World::default();

    let ground = world.create_body_id(&BodyDef::builder().position((0.0, -10.0)).build()).unwrap();
    world
        .create_shape_id(
            ground,
            shapes::Shape::Polygon(shapes::box_polygon(50.0, 10.0)),
            &ShapeDef::builder().density(0.0).build(),
        )
        .unwrap();

    let body = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 4.0)).build())
        .unwrap();
    let sdef = ShapeDef::builder().density(1.0).friction(0.3).build();
    world
        .create_shape_id(body, shapes::Shape::Polygon(shapes::box_polygon(1.0, 1.0)), &sdef)
        .unwrap();

    for _ in 0..120 {
        world.step(1.0 / 60.0);
    }

    let pos = world.body_mut(body).position();
    assert!(approx(pos.x, 0.0, 0.01));
    assert!(approx(pos.y, 1.0, 0.05));
}

#[test]
fn dynamic_body_without_shapes_still_falls_under_gravity() {
    let mut world = World::default();
    let body = world
        .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 10.0)).build())
        .unwrap();

    for _ in 0..60 {
        world.step(1.0 / 60.0);
    }

    assert!(world.body_mut(body).position().y < 10.0);
}

#[test]
fn static_body_never_moves() {
    let mut world = World::default();
    let body = world.create_body_id(&BodyDef::builder().position((3.0, 3.0)).build()).unwrap();
    world
        .create_shape_id(body, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 1.0)), &ShapeDef::default())
        .unwrap();

    for _ in 0..60 {
        world.step(1.0 / 60.0);
    }

    let pos = world.body_mut(body).position();
    assert!(approx(pos.x, 3.0, 1e-6));
    assert!(approx(pos.y, 3.0, 1e-6));
}
