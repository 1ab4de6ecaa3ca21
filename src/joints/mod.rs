//! Joints: constraints between two bodies, solved alongside contacts in
//! the velocity/position solver.

pub mod distance;
pub mod filter;
pub mod prismatic;
pub mod revolute;
pub mod weld;

use slotmap::SlotMap;

use crate::body::BodyData;
use crate::core::Transform;
use crate::types::{BodyId, JointId, Real, Vec2};
use crate::world::World;

pub(crate) type BodyArena = SlotMap<BodyId, BodyData>;

/// Per-type joint behavior, invoked by the island solver once per
/// sub-step. Implementors own their own warm-start impulse state.
pub trait JointDyn: Send + Sync {
    fn body_a(&self) -> BodyId;
    fn body_b(&self) -> BodyId;
    fn collide_connected(&self) -> bool;

    fn init_velocity_constraints(&mut self, bodies: &BodyArena, h: Real);
    fn warm_start(&mut self, bodies: &mut BodyArena);
    fn solve_velocity_constraints(&mut self, bodies: &mut BodyArena, inv_h: Real);
    /// Returns `true` once positional error is within tolerance.
    fn solve_position_constraints(&mut self, bodies: &mut BodyArena) -> bool;
    fn shift_origin(&mut self, delta: Vec2);

    fn reaction_force(&self, inv_h: Real) -> Vec2;
    fn reaction_torque(&self, inv_h: Real) -> Real;
}

/// Common joint construction fields shared by every joint type: plain
/// data struct plus a fluent builder.
#[derive(Clone, Copy, Debug)]
pub struct JointBase {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub local_frame_a: Transform,
    pub local_frame_b: Transform,
    pub collide_connected: bool,
    pub force_threshold: Real,
    pub torque_threshold: Real,
}

impl JointBase {
    pub fn builder() -> JointBaseBuilder {
        JointBaseBuilder::new()
    }
}

#[derive(Clone, Debug)]
pub struct JointBaseBuilder {
    body_a: Option<BodyId>,
    body_b: Option<BodyId>,
    local_frame_a: Transform,
    local_frame_b: Transform,
    collide_connected: bool,
    force_threshold: Real,
    torque_threshold: Real,
}

impl Default for JointBaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JointBaseBuilder {
    pub fn new() -> Self {
        Self {
            body_a: None,
            body_b: None,
            local_frame_a: Transform::IDENTITY,
            local_frame_b: Transform::IDENTITY,
            collide_connected: false,
            force_threshold: Real::MAX,
            torque_threshold: Real::MAX,
        }
    }

    pub fn bodies(mut self, a: BodyId, b: BodyId) -> Self {
        self.body_a = Some(a);
        self.body_b = Some(b);
        self
    }

    pub fn local_frames(mut self, a: Transform, b: Transform) -> Self {
        self.local_frame_a = a;
        self.local_frame_b = b;
        self
    }

    /// Sets local anchors from world points, given each body's current
    /// transform (rotation of each local frame stays identity).
    pub fn local_points_from_world(mut self, xf_a: Transform, world_a: Vec2, xf_b: Transform, world_b: Vec2) -> Self {
        self.local_frame_a.p = crate::core::math::world_to_local_point(xf_a, world_a);
        self.local_frame_b.p = crate::core::math::world_to_local_point(xf_b, world_b);
        self
    }

    pub fn collide_connected(mut self, flag: bool) -> Self {
        self.collide_connected = flag;
        self
    }

    pub fn force_threshold(mut self, v: Real) -> Self {
        self.force_threshold = v;
        self
    }

    pub fn torque_threshold(mut self, v: Real) -> Self {
        self.torque_threshold = v;
        self
    }

    #[must_use]
    pub fn build(self) -> JointBase {
        JointBase {
            body_a: self.body_a.expect("joint requires bodies()"),
            body_b: self.body_b.expect("joint requires bodies()"),
            local_frame_a: self.local_frame_a,
            local_frame_b: self.local_frame_b,
            collide_connected: self.collide_connected,
            force_threshold: self.force_threshold,
            torque_threshold: self.torque_threshold,
        }
    }
}

/// An RAII handle to a joint, borrowing the world mutably.
pub struct Joint<'w> {
    pub(crate) world: &'w mut World,
    pub(crate) id: JointId,
}

impl<'w> Joint<'w> {
    pub(crate) fn new(world: &'w mut World, id: JointId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn body_a(&self) -> BodyId {
        self.world.joint_body_a(self.id)
    }

    pub fn body_b(&self) -> BodyId {
        self.world.joint_body_b(self.id)
    }

    pub fn reaction_force(&self) -> Vec2 {
        self.world.joint_reaction_force(self.id)
    }

    pub fn reaction_torque(&self) -> Real {
        self.world.joint_reaction_torque(self.id)
    }
}
