//! Prismatic joint: constrains relative motion to a single axis.
//! Reduced fidelity relative to upstream Box2D: no motor or limit, just
//! the perpendicular + angular lock (a "slider" with no drive).

use crate::types::{BodyId, Real, Vec2};

use super::{BodyArena, JointBase, JointDyn};

#[derive(Clone, Copy, Debug)]
pub struct PrismaticJointDef {
    pub base: JointBase,
    pub local_axis_a: Vec2,
}

pub struct PrismaticJoint {
    def: PrismaticJointDef,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    reference_angle: Real,
    impulse: Vec2, // x: perpendicular impulse, y: angular impulse
}

impl PrismaticJoint {
    pub fn new(def: PrismaticJointDef, reference_angle: Real) -> Self {
        Self {
            local_anchor_a: def.base.local_frame_a.p,
            local_anchor_b: def.base.local_frame_b.p,
            def,
            reference_angle,
            impulse: Vec2::ZERO,
        }
    }
}

impl JointDyn for PrismaticJoint {
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
        let (axis, perp, ra, rb, s1, s2) = self.geometry(bodies);
        let p = perp * self.impulse.x;
        let la = self.impulse.x * s1 + self.impulse.y;
        let lb = self.impulse.x * s2 + self.impulse.y;

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= p * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * la;
        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += p * b.inv_mass;
        b.velocity.angular += b.inv_inertia * lb;
        let _ = (axis, ra, rb);
    }

    fn solve_velocity_constraints(&mut self, bodies: &mut BodyArena, _inv_h: Real) {
        let (_, perp, _, _, s1, s2) = self.geometry(bodies);

        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let k11 = a.inv_mass + b.inv_mass + a.inv_inertia * s1 * s1 + b.inv_inertia * s2 * s2;
        let k12 = a.inv_inertia * s1 + b.inv_inertia * s2;
        let k22 = (a.inv_inertia + b.inv_inertia).max(Real::EPSILON);
        let mass = crate::core::Mat22::new(Vec2::new(k11, k12), Vec2::new(k12, k22));

        let cdot_x = perp.dot(b.velocity.linear - a.velocity.linear) + s2 * b.velocity.angular - s1 * a.velocity.angular;
        let cdot_y = b.velocity.angular - a.velocity.angular;

        let impulse = mass.solve(-Vec2::new(cdot_x, cdot_y));
        self.impulse += impulse;

        let p = perp * impulse.x;
        let la = impulse.x * s1 + impulse.y;
        let lb = impulse.x * s2 + impulse.y;

        let a = &mut bodies[self.def.base.body_a];
        a.velocity.linear -= p * a.inv_mass;
        a.velocity.angular -= a.inv_inertia * la;
        let b = &mut bodies[self.def.base.body_b];
        b.velocity.linear += p * b.inv_mass;
        b.velocity.angular += b.inv_inertia * lb;
    }

    fn solve_position_constraints(&mut self, bodies: &mut BodyArena) -> bool {
        let (axis, perp, ra, rb, s1, s2) = self.geometry(bodies);
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let d = (b.sweep.c + rb) - (a.sweep.c + ra);

        let c1 = perp.dot(d);
        let c2 = b.sweep.a - a.sweep.a - self.reference_angle;
        let error = c1.abs().max(c2.abs());

        let k11 = a.inv_mass + b.inv_mass + a.inv_inertia * s1 * s1 + b.inv_inertia * s2 * s2;
        let k12 = a.inv_inertia * s1 + b.inv_inertia * s2;
        let k22 = (a.inv_inertia + b.inv_inertia).max(Real::EPSILON);
        let mass = crate::core::Mat22::new(Vec2::new(k11, k12), Vec2::new(k12, k22));
        let impulse = mass.solve(-Vec2::new(c1, c2));

        let p = perp * impulse.x;
        let la = impulse.x * s1 + impulse.y;
        let lb = impulse.x * s2 + impulse.y;

        let a = &mut bodies[self.def.base.body_a];
        a.sweep.c -= p * a.inv_mass;
        a.sweep.a -= a.inv_inertia * la;
        a.synchronize_transform();
        let b = &mut bodies[self.def.base.body_b];
        b.sweep.c += p * b.inv_mass;
        b.sweep.a += b.inv_inertia * lb;
        b.synchronize_transform();

        let _ = axis;
        error < 0.005
    }

    fn shift_origin(&mut self, _delta: Vec2) {}

    fn reaction_force(&self, inv_h: Real) -> Vec2 {
        Vec2::new(0.0, self.impulse.x) * inv_h
    }

    fn reaction_torque(&self, inv_h: Real) -> Real {
        self.impulse.y * inv_h
    }
}

impl PrismaticJoint {
    fn geometry(&self, bodies: &BodyArena) -> (Vec2, Vec2, Vec2, Vec2, Real, Real) {
        let a = &bodies[self.def.base.body_a];
        let b = &bodies[self.def.base.body_b];
        let axis = a.transform.q.rotate_vec(self.def.local_axis_a);
        let perp = axis.left_perp();

        let ra = a.transform.q.rotate_vec(self.local_anchor_a - a.sweep.local_center);
        let rb = b.transform.q.rotate_vec(self.local_anchor_b - b.sweep.local_center);
        let d = (b.sweep.c + rb) - (a.sweep.c + ra);

        let s1 = (d + ra).cross(perp);
        let s2 = rb.cross(perp);

        (axis, perp, ra, rb, s1, s2)
    }
}
