use rapier2d_lite::{shapes, BodyDef, BodyType, ContactFilter, ContactImpulse, ContactListener, ShapeDef, ShapeId, World};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Recorder {
    begins: usize,
    ends: usize,
    post_solves: usize,
}

struct RecordingListener(Rc<RefCell<Recorder>>);

impl ContactListener for RecordingListener {
    fn begin_contact(&mut self, _a: ShapeId, _b: ShapeId) {
        self.0.borrow_mut().begins += 1;
    }
    fn end_contact(&mut self, _a: ShapeId, _b: ShapeId) {
        self.0.borrow_mut().ends += 1;
    }
    fn post_solve(&mut self, _a: ShapeId, _b: ShapeId, _impulse: &ContactImpulse) {
        self.0.borrow_mut().post_solves += 1;
    }
}

#[test]
fn contact_listener_sees_begin_and_post_solve() {
    let mut world = World::default();
    world.set_gravity((0.0, -10.0));

    let recorder = Rc::new(RefCell::new(Recorder::default()));
    world.set_contact_listener(Box::new(RecordingListener(recorder.clone())));

    let ground = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(
        ground,
        shapes::Shape::Polygon(shapes::box_polygon(10.0, 0.5)),
        &ShapeDef::builder().density(0.0).build(),
    ).unwrap();

    let body = world.create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 3.0)).build()).unwrap();
    world.create_shape_id(body, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

    for _ in 0..180 {
        world.step(1.0 / 60.0);
    }

    let recorded = recorder.borrow();
    assert_eq!(recorded.begins, 1);
    assert_eq!(recorded.ends, 0);
    assert!(recorded.post_solves > 0, "a resting contact should keep reporting post-solve impulses");
}

#[test]
fn custom_filter_rejects_pair_matching_built_in_category_mask() {
    struct RejectAll;
    impl ContactFilter for RejectAll {
        fn should_collide(&mut self, _a: ShapeId, _b: ShapeId) -> bool {
            false
        }
    }

    let mut world = World::default();
    world.set_gravity((0.0, -10.0));
    world.set_custom_filter(Box::new(RejectAll));

    let ground = world.create_body_id(&BodyDef::builder().position((0.0, 0.0)).build()).unwrap();
    world.create_shape_id(
        ground,
        shapes::Shape::Polygon(shapes::box_polygon(10.0, 0.5)),
        &ShapeDef::builder().density(0.0).enable_custom_filtering(true).build(),
    ).unwrap();

    let body = world.create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 1.0)).build()).unwrap();
    world.create_shape_id(
        body,
        shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)),
        &ShapeDef::builder().enable_custom_filtering(true).build(),
    ).unwrap();

    for _ in 0..120 {
        world.step(1.0 / 60.0);
    }

    // with collisions rejected, the body falls straight through the ground
    assert!(world.body_mut(body).position().y < -1.0);
}
