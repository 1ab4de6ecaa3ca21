//! Filter joint: applies no constraint forces at all. Its only purpose
//! is `collide_connected = false`, letting two bodies be linked for
//! island/graph-coloring purposes while suppressing contacts between
//! them (e.g. two halves of a ragdoll that shouldn't collide).

use crate::types::{BodyId, Real, Vec2};

use super::{BodyArena, JointBase, JointDyn};

#[derive(Clone, Copy, Debug)]
pub struct FilterJointDef {
    pub base: JointBase,
}

pub struct FilterJoint {
    def: FilterJointDef,
}

impl FilterJoint {
    pub fn new(def: FilterJointDef) -> Self {
        Self { def }
    }
}

impl JointDyn for FilterJoint {
    fn body_a(&self) -> BodyId {
        self.def.base.body_a
    }
    fn body_b(&self) -> BodyId {
        self.def.base.body_b
    }
    fn collide_connected(&self) -> bool {
        false
    }

    fn init_velocity_constraints(&mut self, _bodies: &BodyArena, _h: Real) {}
    fn warm_start(&mut self, _bodies: &mut BodyArena) {}
    fn solve_velocity_constraints(&mut self, _bodies: &mut BodyArena, _inv_h: Real) {}
    fn solve_position_constraints(&mut self, _bodies: &mut BodyArena) -> bool {
        true
    }
    fn shift_origin(&mut self, _delta: Vec2) {}

    fn reaction_force(&self, _inv_h: Real) -> Vec2 {
        Vec2::ZERO
    }
    fn reaction_torque(&self, _inv_h: Real) -> Real {
        0.0
    }
}
