//! The most common types, for a single glob import.

pub use crate::{
    body::{Body, BodyBuilder, BodyDef, BodyType},
    collision::Aabb,
    error::{PhysicsError, PhysicsResult},
    events::{BodyMoveEvent, ContactBeginTouchEvent, ContactEndTouchEvent, SensorBeginTouchEvent, SensorEndTouchEvent, StepEvents},
    filter::Filter,
    fixture::ShapeHandle,
    joints::{
        distance::{DistanceJoint, DistanceJointDef},
        filter::{FilterJoint, FilterJointDef},
        prismatic::{PrismaticJoint, PrismaticJointDef},
        revolute::{RevoluteJoint, RevoluteJointDef},
        weld::{WeldJoint, WeldJointDef},
        Joint, JointBase, JointBaseBuilder, JointDyn,
    },
    query::{QueryFilter, RayCastHit},
    shapes::{self, Shape, ShapeDef, ShapeDefBuilder, SurfaceMaterial},
    tuning::{WorldConfig, WorldConfigBuilder},
    types::{BodyId, ContactId, JointId, Real, ShapeId, Vec2},
    world::{ContactFilter, ContactImpulse, ContactListener, Goodbye, World},
};
