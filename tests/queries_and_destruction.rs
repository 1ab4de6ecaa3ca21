use rapier2d_lite::{shapes, Aabb, BodyDef, BodyType, QueryFilter, ShapeDef, World};

#[test]
fn overlap_aabb_finds_only_shapes_inside_the_query_box() {
    let mut world = World::default();

    let near = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(near, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

    let far = world.create_body_id(&BodyDef::builder().position((100.0, 100.0)).build()).unwrap();
    world.create_shape_id(far, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

    let hits = world.overlap_aabb(
        &Aabb { lower: (-1.0, -1.0).into(), upper: (1.0, 1.0).into() },
        QueryFilter::default(),
    );

    assert_eq!(hits.len(), 1);
}

#[test]
fn ray_cast_hits_the_nearest_shape_first() {
    let mut world = World::default();

    let body = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    let near_shape = world.create_shape_id(body, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 1.0)), &ShapeDef::default()).unwrap();

    let behind = world.create_body_id(&BodyDef::builder().position((0.0, -5.0)).build()).unwrap();
    world.create_shape_id(behind, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 1.0)), &ShapeDef::default()).unwrap();

    let hit = world
        .cast_ray_closest((0.0, 5.0).into(), (0.0, -10.0).into(), QueryFilter::default())
        .expect("ray should hit the nearer circle");

    assert_eq!(hit.shape, near_shape);
    assert!((hit.point.y - 1.0).abs() < 1e-3);
}

#[test]
fn destroying_a_body_removes_its_shapes_from_queries() {
    let mut world = World::default();
    let body = world.create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(body, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

    assert_eq!(world.shape_count(), 1);
    world.destroy_body(body).unwrap();
    assert_eq!(world.shape_count(), 0);
    assert_eq!(world.body_count(), 0);

    let hits = world.overlap_aabb(
        &Aabb { lower: (-1.0, -1.0).into(), upper: (1.0, 1.0).into() },
        QueryFilter::default(),
    );
    assert!(hits.is_empty());
}
