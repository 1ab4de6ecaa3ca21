//! Revolute joint: pins two bodies together at a shared point, with an
//! optional motor and angle limit, following Box2D's
//! `b2RevoluteJoint`.

use crate::core::Mat22;
use crate::types::{BodyId, Real, Vec2};

use super::{BodyArena, JointBase, JointDyn};

#[derive(Clone, Copy, Debug)]
pub struct RevoluteJointDef {
    pub base: JointBase,
    pub enable_motor: bool,
    pub motor_speed: Real,
    pub max_motor_torque: Real,
    pub enable_limit: bool,
    pub lower_angle: Real,
    pub upper_angle: Real,
    pub reference_angle: Real,
}

pub struct RevoluteJoint {
    def: RevoluteJointDef,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    point_impulse: Vec2,
    motor_impulse: Real,
    lower_impulse: Real,
    upper_impulse: Real,
    point_mass: Mat22,
    axial_mass: Real,
    angle: Real,
}

impl RevoluteJoint {
    pub fn new(def: RevoluteJointDef) -> Self {
        Self {
            local_anchor_a: def.base.local_frame_a.p,
            local_anchor_b: def.base.local_frame_b.p,
            def,
            point_impulse: Vec2::ZERO,
            motor_impulse: 0.0,
            lower_impulse: 0.0,
            upper_impulse: 0.0,
            point_mass: Mat22::default(),
            axial_mass: 0.0,
            angle: 0.0,
        }
    }
}

impl JointDyn for RevoluteJoint {
    fn body_a(&self) -> BodyId {
        self.def.base.body_a
    }
    fn body_b(&self) -> BodyId {
        self.def.base.body_b
    }
    fn collide_connected(&self) -> bool {
        self.def.base.collide_connected
    }

    fn init_velocity_constraints(&mut self, bodies: &BodyArena, _h: Real) {
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];

        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);

        let k11 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.y * ra.y + b.inv_inertia * rb.y * rb.y;
        let k12 = -a.inv_inertia * ra.x * ra.y - b.inv_inertia * rb.x * rb.y;
        let k22 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.x * ra.x + b.inv_inertia * rb.x * rb.x;
        self.point_mass = Mat22::new(Vec2::new(k11, k12), Vec2::new(k12, k22));

        let k_axial = a.inv_inertia + b.inv_inertia;
        self.axial_mass = if k_axial > 0.0 { 1.0 / k_axial } else { 0.0 };

        self.angle = (b.sweep.a - a.sweep.a) - self.def.reference_angle;

        if !self.def.enable_motor {
            self.motor_impulse = 0.0;
        }
        if !self.def.enable_limit {
            self.lower_impulse = 0.0;
            self.upper_impulse = 0.0;
        }
    }

    fn warm_start(&mut self, bodies: &mut BodyArena) {
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);

        let axial = self.motor_impulse + self.lower_impulse - self.upper_impulse;

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= self.point_impulse * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * (ra.cross(self.point_impulse) + axial);

        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += self.point_impulse * b.inv_mass;
        b.velocity.angular += b.inv_inertia * (rb.cross(self.point_impulse) + axial);
    }

    fn solve_velocity_constraints(&mut self, bodies: &mut BodyArena, _inv_h: Real) {
        let a_inv_i = bodies[self.def.base.body_a].inv_inertia;
        let b_inv_i = bodies[self.def.base.body_b].inv_inertia;

        if self.def.enable_motor {
            let cdot = bodies[self.def.base.body_b].velocity.angular - bodies[self.def.base.body_a].velocity.angular
                - self.def.motor_speed;
            let mut impulse = -self.axial_mass * cdot;
            let old = self.motor_impulse;
            let max_impulse = self.def.max_motor_torque * 0.016667; // approx per-substep dt budget
            self.motor_impulse = (old + impulse).clamp(-max_impulse, max_impulse);
            impulse = self.motor_impulse - old;

            bodies[self.def.base.body_a].velocity.angular -= a_inv_i * impulse;
            bodies[self.def.base.body_b].velocity.angular += b_inv_i * impulse;
        }

        if self.def.enable_limit {
            let c = self.angle - self.def.lower_angle;
            let cdot = bodies[self.def.base.body_b].velocity.angular - bodies[self.def.base.body_a].velocity.angular;
            let bias = (c.min(0.0)) * 5.0;
            let mut impulse = -self.axial_mass * (cdot + bias);
            let old = self.lower_impulse;
            self.lower_impulse = (old + impulse).max(0.0);
            impulse = self.lower_impulse - old;
            bodies[self.def.base.body_a].velocity.angular -= a_inv_i * impulse;
            bodies[self.def.base.body_b].velocity.angular += b_inv_i * impulse;

            let c = self.def.upper_angle - self.angle;
            let cdot = bodies[self.def.base.body_a].velocity.angular - bodies[self.def.base.body_b].velocity.angular;
            let bias = (c.min(0.0)) * 5.0;
            let mut impulse = -self.axial_mass * (cdot + bias);
            let old = self.upper_impulse;
            self.upper_impulse = (old + impulse).max(0.0);
            impulse = self.upper_impulse - old;
            bodies[self.def.base.body_a].velocity.angular += a_inv_i * impulse;
            bodies[self.def.base.body_b].velocity.angular -= b_inv_i * impulse;
        }

        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);
        let vpa = a.velocity.linear + Vec2::cross_sv(a.velocity.angular, ra);
        let vpb = b.velocity.linear + Vec2::cross_sv(b.velocity.angular, rb);
        let cdot = vpb - vpa;
        let impulse = self.point_mass.solve(-cdot);
        self.point_impulse += impulse;

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= impulse * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * ra.cross(impulse);
        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += impulse * b.inv_mass;
        b.velocity.angular += b.inv_inertia * rb.cross(impulse);
    }

    fn solve_position_constraints(&mut self, bodies: &mut BodyArena) -> bool {
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);

        let c = (b.sweep.c + rb) - (a.sweep.c + ra);
        let position_error = c.length();

        let k11 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.y * ra.y + b.inv_inertia * rb.y * rb.y;
        let k12 = -a.inv_inertia * ra.x * ra.y - b.inv_inertia * rb.x * rb.y;
        let k22 = a.inv_mass + b.inv_mass + a.inv_inertia * ra.x * ra.x + b.inv_inertia * rb.x * rb.x;
        let mass = Mat22::new(Vec2::new(k11, k12), Vec2::new(k12, k22));
        let impulse = mass.solve(-c);

        let a = &mut bodies[self.def.base.body_a];
        a.sweep.c -= impulse * a.inv_mass;
        a.sweep.a -= a.inv_inertia * ra.cross(impulse);
        a.synchronize_transform();

        let b = &mut bodies[self.def.base.body_b];
        b.sweep.c += impulse * b.inv_mass;
        b.sweep.a += b.inv_inertia * rb.cross(impulse);
        b.synchronize_transform();

        position_error < 0.005
    }

    fn shift_origin(&mut self, _delta: Vec2) {}

    fn reaction_force(&self, inv_h: Real) -> Vec2 {
        self.point_impulse * inv_h
    }

    fn reaction_torque(&self, inv_h: Real) -> Real {
        (self.motor_impulse + self.lower_impulse - self.upper_impulse) * inv_h
    }
}
