//! Per-step event buffers, following Box2D v3's snapshot-array design
//! (`b2ContactEvents`/`b2SensorEvents`/`b2BodyEvents`) rather than the
//! older listener/callback trait: `World::step` replaces `StepEvents`
//! wholesale each call, and callers read whatever is relevant to them
//! from `World::step_events()` afterward.

use crate::core::Transform;
use crate::types::{BodyId, ShapeId};

/// Two non-sensor shapes started touching this step.
#[derive(Copy, Clone, Debug)]
pub struct ContactBeginTouchEvent {
    pub shape_a: ShapeId,
    pub shape_b: ShapeId,
}

/// Two non-sensor shapes stopped touching this step (including when one
/// of the shapes, or its body, was destroyed while touching).
#[derive(Copy, Clone, Debug)]
pub struct ContactEndTouchEvent {
    pub shape_a: ShapeId,
    pub shape_b: ShapeId,
}

/// A sensor shape started overlapping a non-sensor visitor shape.
#[derive(Copy, Clone, Debug)]
pub struct SensorBeginTouchEvent {
    pub sensor_shape: ShapeId,
    pub visitor_shape: ShapeId,
}

/// A sensor shape stopped overlapping a visitor shape.
#[derive(Copy, Clone, Debug)]
pub struct SensorEndTouchEvent {
    pub sensor_shape: ShapeId,
    pub visitor_shape: ShapeId,
}

/// A body's transform changed this step, either by integration or by
/// falling asleep (`fell_asleep` lets callers tell the two apart without
/// re-querying `World::is_body_awake`).
#[derive(Copy, Clone, Debug)]
pub struct BodyMoveEvent {
    pub body: BodyId,
    pub transform: Transform,
    pub fell_asleep: bool,
}

/// All events produced by a single `World::step` call. Replaced fresh at
/// the start of every step; nothing here survives across steps.
#[derive(Default)]
pub struct StepEvents {
    pub contact_begin: Vec<ContactBeginTouchEvent>,
    pub contact_end: Vec<ContactEndTouchEvent>,
    pub sensor_begin: Vec<SensorBeginTouchEvent>,
    pub sensor_end: Vec<SensorEndTouchEvent>,
    pub body_moved: Vec<BodyMoveEvent>,
}
