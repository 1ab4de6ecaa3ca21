//! Distance joint: holds two anchor points at a fixed (or spring-soft)
//! separation, following Box2D's `b2DistanceJoint`.

use super::{BodyArena, JointBase, JointDyn};
use crate::types::{BodyId, Real, Vec2};

#[derive(Clone, Copy, Debug)]
pub struct DistanceJointDef {
    pub base: JointBase,
    pub length: Real,
    pub min_length: Real,
    pub max_length: Real,
    pub enable_limit: bool,
    pub enable_spring: bool,
    pub hertz: Real,
    pub damping_ratio: Real,
}

pub struct DistanceJoint {
    def: DistanceJointDef,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    axis: Vec2,
    mass: Real,
    bias: Real,
    gamma: Real,
    impulse: Real,
    lower_impulse: Real,
    upper_impulse: Real,
}

impl DistanceJoint {
    pub fn new(def: DistanceJointDef) -> Self {
        Self {
            local_anchor_a: def.base.local_frame_a.p,
            local_anchor_b: def.base.local_frame_b.p,
            def,
            axis: Vec2::new(1.0, 0.0),
            mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
            impulse: 0.0,
            lower_impulse: 0.0,
            upper_impulse: 0.0,
        }
    }

    fn anchors_world(&self, bodies: &BodyArena) -> (Vec2, Vec2, Vec2, Vec2) {
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);
        let pa = a.sweep.c + ra;
        let pb = b.sweep.c + rb;
        (ra, rb, pa, pb)
    }
}

impl JointDyn for DistanceJoint {
    fn body_a(&self) -> BodyId {
        self.def.base.body_a
    }
    fn body_b(&self) -> BodyId {
        self.def.base.body_b
    }
    fn collide_connected(&self) -> bool {
        self.def.base.collide_connected
    }

    fn init_velocity_constraints(&mut self, bodies: &BodyArena, h: Real) {
        let (_, _, pa, pb) = self.anchors_world(bodies);
        let d = pb - pa;
        let length = d.length();
        self.axis = if length > Real::EPSILON { d * (1.0 / length) } else { Vec2::new(1.0, 0.0) };

        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);

        let cra = ra.cross(self.axis);
        let crb = rb.cross(self.axis);
        let k = a.inv_mass + b.inv_mass + a.inv_inertia * cra * cra + b.inv_inertia * crb * crb;
        self.mass = if k > 0.0 { 1.0 / k } else { 0.0 };

        if self.def.enable_spring {
            let omega = 2.0 * std::f32::consts::PI * self.def.hertz;
            let c = h * omega * (2.0 * self.def.damping_ratio + h * omega);
            self.gamma = if c > 0.0 { 1.0 / c } else { 0.0 };
            self.bias = (length - self.def.length) * h * omega * omega * self.gamma;
        } else {
            self.gamma = 0.0;
            self.bias = 0.0;
        }

        if !self.def.enable_spring {
            self.lower_impulse = 0.0;
            self.upper_impulse = 0.0;
        }
    }

    fn warm_start(&mut self, bodies: &mut BodyArena) {
        let (ra, rb, _, _) = self.anchors_world(bodies);
        let total = self.impulse + self.lower_impulse - self.upper_impulse;
        let p = self.axis * total;

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= p * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * ra.cross(p);

        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += p * b.inv_mass;
        b.velocity.angular += b.inv_inertia * rb.cross(p);
    }

    fn solve_velocity_constraints(&mut self, bodies: &mut BodyArena, inv_h: Real) {
        let (ra, rb, _, _) = self.anchors_world(bodies);

        if self.def.enable_spring {
            let a = &bodies[self.def.base.body_a];
            let b = &bodies[self.def.base.body_b];
            let vpa = a.velocity.linear + Vec2::cross_sv(a.velocity.angular, ra);
            let vpb = b.velocity.linear + Vec2::cross_sv(b.velocity.angular, rb);
            let cdot = (vpb - vpa).dot(self.axis);

            let impulse = -self.mass * (cdot + self.bias) - self.gamma * self.impulse;
            self.impulse += impulse;

            let p = self.axis * impulse;
            let a = &mut bodies[self.def.base.body_a];
            a.velocity.linear -= p * a.inv_mass;
            a.velocity.angular -= a.inv_inertia * ra.cross(p);
            let b = &mut bodies[self.def.base.body_b];
            b.velocity.linear += p * b.inv_mass;
            b.velocity.angular += b.inv_inertia * rb.cross(p);
        } else {
            let a = &bodies[self.def.base.body_a];
            let b = &bodies[self.def.base.body_b];
            let vpa = a.velocity.linear + Vec2::cross_sv(a.velocity.angular, ra);
            let vpb = b.velocity.linear + Vec2::cross_sv(b.velocity.angular, rb);
            let cdot = (vpb - vpa).dot(self.axis);

            let impulse = -self.mass * cdot;
            self.impulse += impulse;

            let p = self.axis * impulse;
            let a = &mut bodies[self.def.base.body_a];
            a.velocity.linear -= p * a.inv_mass;
            a.velocity.angular -= a.inv_inertia * ra.cross(p);
            let b = &mut bodies[self.def.base.body_b];
            b.velocity.linear += p * b.inv_mass;
            b.velocity.angular += b.inv_inertia * rb.cross(p);
        }

        let _ = inv_h;
    }

    fn solve_position_constraints(&mut self, bodies: &mut BodyArena) -> bool {
        if self.def.enable_spring {
            return true;
        }

        let (ra, rb, pa, pb) = self.anchors_world(bodies);
        let d = pb - pa;
        let length = d.length();
        let axis = if length > Real::EPSILON { d * (1.0 / length) } else { self.axis };
        let c = length - self.def.length;
        let correction = c.clamp(-0.2, 0.2);

        let cra = ra.cross(axis);
        let crb = rb.cross(axis);
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let k = a.inv_mass + b.inv_mass + a.inv_inertia * cra * cra + b.inv_inertia * crb * crb;
        let impulse = if k > 0.0 { -correction / k } else { 0.0 };
        let p = axis * impulse;

        let a = &mut bodies[self.def.base.body_a];
        a.sweep.c -= p * a.inv_mass;
        a.sweep.a -= a.inv_inertia * ra.cross(p);
        a.synchronize_transform();

        let b = &mut bodies[self.def.base.body_b];
        b.sweep.c += p * b.inv_mass;
        b.sweep.a += b.inv_inertia * rb.cross(p);
        b.synchronize_transform();

        c.abs() < 0.005
    }

    fn shift_origin(&mut self, _delta: Vec2) {}

    fn reaction_force(&self, inv_h: Real) -> Vec2 {
        self.axis * ((self.impulse + self.lower_impulse - self.upper_impulse) * inv_h)
    }

    fn reaction_torque(&self, _inv_h: Real) -> Real {
        0.0
    }
}
