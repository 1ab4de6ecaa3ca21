//! Weld joint: rigidly locks the relative position and angle of two
//! bodies. Reduced fidelity relative to upstream Box2D's weld joint: no
//! soft (hertz/damping) mode, always a rigid 3x3 point+angle solve.

use crate::types::{BodyId, Real, Vec2};

use super::{BodyArena, JointBase, JointDyn};

#[derive(Clone, Copy, Debug)]
pub struct WeldJointDef {
    pub base: JointBase,
}

pub struct WeldJoint {
    def: WeldJointDef,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    reference_angle: Real,
    point_impulse: Vec2,
    angle_impulse: Real,
}

impl WeldJoint {
    pub fn new(def: WeldJointDef, reference_angle: Real) -> Self {
        Self {
            local_anchor_a: def.base.local_frame_a.p,
            local_anchor_b: def.base.local_frame_b.p,
            def,
            reference_angle,
            point_impulse: Vec2::ZERO,
            angle_impulse: 0.0,
        }
    }
}

impl JointDyn for WeldJoint {
    fn body_a(&self) -> BodyId {
        self.def.base.body_a
    }
    fn body_b(&self) -> BodyId {
        self.def.base.body_b
    }
    fn collide_connected(&self) -> bool {
        self.def.base.collide_connected
    }

    fn init_velocity_constraints(&mut self, _bodies: &BodyArena, _h: Real) {}

    fn warm_start(&mut self, bodies: &mut BodyArena) {
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= self.point_impulse * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * (ra.cross(self.point_impulse) + self.angle_impulse);
        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += self.point_impulse * b.inv_mass;
        b.velocity.angular += b.inv_inertia * (rb.cross(self.point_impulse) + self.angle_impulse);
    }

    fn solve_velocity_constraints(&mut self, bodies: &mut BodyArena, _inv_h: Real) {
        let a_inv_i = bodies[self.def.base.body_a].inv_inertia;
        let b_inv_i = bodies[self.def.base.body_b].inv_inertia;
        let k_angle = a_inv_i + b_inv_i;
        let angle_mass = if k_angle > 0.0 { 1.0 / k_angle } else { 0.0 };

        let cdot_angle = bodies[self.def.base.body_b].velocity.angular - bodies[self.def.base.body_a].velocity.angular;
        let angle_impulse = -angle_mass * cdot_angle;
        self.angle_impulse += angle_impulse;
        bodies[self.def.base.body_a].velocity.angular -= a_inv_i * angle_impulse;
        bodies[self.def.base.body_b].velocity.angular += b_inv_i * angle_impulse;

        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);

        let k11 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.y * ra.y + b.inv_inertia * rb.y * rb.y;
        let k12 = -a.inv_inertia * ra.x * ra.y - b.inv_inertia * rb.x * rb.y;
        let k22 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.x * ra.x + b.inv_inertia * rb.x * rb.x;
        let point_mass = crate::core::Mat22::new(Vec2::new(k11, k12), Vec2::new(k12, k22));

        let vpa = a.velocity.linear + Vec2::cross_sv(a.velocity.angular, ra);
        let vpb = b.velocity.linear + Vec2::cross_sv(b.velocity.angular, rb);
        let cdot = vpb - vpa;
        let impulse = point_mass.solve(-cdot);
        self.point_impulse += impulse;

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= impulse * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * ra.cross(impulse);
        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += impulse * b.inv_mass;
        b.velocity.angular += b.inv_inertia * rb.cross(impulse);
    }

    fn solve_position_constraints(&mut self, bodies: &mut BodyArena) -> bool {
        let angle_error = {
            let a = &bodies[self.def.base.body_a];
            let b = &bodies[self.def.base.body_b];
            (b.sweep.a - a.sweep.a - self.reference_angle).abs()
        };

        let a_inv_i = bodies[self.def.base.body_a].inv_inertia;
        let b_inv_i = bodies[self.def.base.body_b].inv_inertia;
        let k_angle = a_inv_i + b_inv_i;
        if k_angle > 0.0 {
            let c = bodies[self.def.base.body_b].sweep.a - bodies[self.def.base.body_a].sweep.a - self.reference_angle;
            let impulse = -c / k_angle;
            bodies[self.def.base.body_a].sweep.a -= a_inv_i * impulse;
            bodies[self.def.base.body_b].sweep.a += b_inv_i * impulse;
            bodies[self.def.base.body_a].synchronize_transform();
            bodies[self.def.base.body_b].synchronize_transform();
        }

        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);
        let c = (b.sweep.c + rb) - (a.sweep.c + ra);
        let position_error = c.length();

        let k11 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.y * ra.y + b.inv_inertia * rb.y * rb.y;
        let k12 = -a.inv_inertia * ra.x * ra.y - b.inv_inertia * rb.x * rb.y;
        let k22 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.x * ra.x + b.inv_inertia * rb.x * rb.x;
        let mass = crate::core::Mat22::new(Vec2::new(k11, k12), Vec2::new(k12, k22));
        let impulse = mass.solve(-c);

        let a = &mut bodies[self.def.base.body_a];
        a.sweep.c -= impulse * a.inv_mass;
        a.sweep.a -= a.inv_inertia * ra.cross(impulse);
        a.synchronize_transform();
        let b = &mut bodies[self.def.base.body_b];
        b.sweep.c += impulse * b.inv_mass;
        b.sweep.a += b.inv_inertia * rb.cross(impulse);
        b.synchronize_transform();

        position_error < 0.005 && angle_error < 0.005
    }

    fn shift_origin(&mut self, _delta: Vec2) {}

    fn reaction_force(&self, inv_h: Real) -> Vec2 {
        self.point_impulse * inv_h
    }

    fn reaction_torque(&self, inv_h: Real) -> Real {
        self.angle_impulse * inv_h
    }
}
