//! rapier2d-lite: a native 2D rigid-body physics simulator.
//!
//! Highlights
//! - Broad phase (dynamic AABB tree) + narrow phase (GJK distance, SAT
//!   manifold generation) + sequential-impulse island solver, with a
//!   continuous-collision pass for fast-moving bodies.
//! - Two usage styles:
//!   - RAII wrappers (`Body<'w>`/`ShapeHandle<'w>`/`Joint<'w>`, lifetime-bound
//!     to the `World` they borrow).
//!   - ID-style (`BodyId`/`ShapeId`/`JointId`, free to store and pass
//!     around without borrow issues).
//!
//! Quickstart (RAII)
//! ```
//! use rapier2d_lite::{World, BodyDef, BodyType, ShapeDef, shapes};
//!
//! let mut world = World::default();
//! let mut body = world.create_body(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 10.0)).build()).unwrap();
//! body.create_shape(shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();
//! drop(body);
//! world.step(1.0 / 60.0);
//! ```
//!
//! Quickstart (ID-style)
//! ```
//! use rapier2d_lite::{World, BodyDef, BodyType, ShapeDef, shapes};
//!
//! let mut world = World::default();
//! let body_id = world.create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 10.0)).build()).unwrap();
//! let _shape_id = world.create_shape_id(body_id, shapes::Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();
//! world.step(1.0 / 60.0);
//! ```
//!
//! Modules
//! - `world`, `body`, `fixture`, `shapes`, `joints`, `contact`, `island`,
//!   `solver`, `collision`, `query`, `events`, `filter`, `tuning`, `core`,
//!   `error`, `prelude`. Import `rapier2d_lite::prelude::*` for the most
//!   common types.
//!
//! Queries (AABB + ray cast)
//! ```
//! use rapier2d_lite::{World, BodyDef, BodyType, ShapeDef, shapes, Aabb, QueryFilter};
//!
//! let mut world = World::default();
//! let body = world.create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 2.0)).build()).unwrap();
//! world.create_shape_id(body, shapes::Shape::Polygon(shapes::box_polygon(0.5, 0.5)), &ShapeDef::default()).unwrap();
//!
//! let hits = world.overlap_aabb(&Aabb { lower: (-1.0, 0.5).into(), upper: (1.0, 3.5).into() }, QueryFilter::default());
//! assert!(!hits.is_empty());
//!
//! let hit = world.cast_ray_closest((0.0, 5.0).into(), (0.0, -5.0).into(), QueryFilter::default());
//! if let Some(hit) = hit {
//!     let _ = (hit.point, hit.normal, hit.fraction);
//! }
//! ```
//!
//! Feature flags
//! - `serialize`: config and body-definition snapshotting (see [`serialize`]).
//! - `cgmath` / `nalgebra` / `glam`: conversions with their 2D vector types.

pub mod body;
pub mod collision;
pub mod contact;
pub mod core;
pub mod error;
pub mod events;
pub mod filter;
pub mod fixture;
pub mod island;
pub mod joints;
pub mod prelude;
pub mod query;
#[cfg(feature = "serialize")]
pub mod serialize;
pub mod shapes;
pub mod solver;
pub mod tuning;
pub mod types;
pub mod world;

pub use body::{Body, BodyBuilder, BodyDef, BodyType};
pub use collision::Aabb;
pub use core::{Rot, Transform};
pub use error::{PhysicsError, PhysicsResult};
pub use events::{
    BodyMoveEvent, ContactBeginTouchEvent, ContactEndTouchEvent, SensorBeginTouchEvent, SensorEndTouchEvent, StepEvents,
};
pub use filter::Filter;
pub use fixture::ShapeHandle;
pub use joints::{
    distance::{DistanceJoint, DistanceJointDef},
    filter::{FilterJoint, FilterJointDef},
    prismatic::{PrismaticJoint, PrismaticJointDef},
    revolute::{RevoluteJoint, RevoluteJointDef},
    weld::{WeldJoint, WeldJointDef},
    Joint, JointBase, JointBaseBuilder, JointDyn,
};
pub use query::{QueryFilter, RayCastHit};
pub use shapes::{Shape, ShapeDef, ShapeDefBuilder, SurfaceMaterial};
pub use tuning::{WorldConfig, WorldConfigBuilder};
pub use types::{BodyId, ContactId, JointId, Real, ShapeId, Vec2};
pub use world::{ContactFilter, ContactImpulse, ContactListener, Goodbye, World};
