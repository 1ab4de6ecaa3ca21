//! Contact velocity constraints: sequential-impulse normal + Coulomb
//! friction, with restitution applied at the first pass bias, grounded
//! in Box2D's `b2ContactSolver::SolveVelocityConstraints`.
//!
//! Simplification versus upstream: this solves each point sequentially
//! rather than with the 2-point block LCP upstream uses for resting
//! stacked contacts; see DESIGN.md for the tradeoff.

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::body::BodyData;
use crate::collision::manifold::WorldManifold;
use crate::contact::Contact;
use crate::types::{BodyId, ContactId, Real, ShapeId, Vec2};

struct PointConstraint {
    ra: Vec2,
    rb: Vec2,
    normal_mass: Real,
    tangent_mass: Real,
    velocity_bias: Real,
    normal_impulse: Real,
    tangent_impulse: Real,
    separation: Real,
}

pub struct ContactConstraint {
    contact: ContactId,
    body_a: BodyId,
    body_b: BodyId,
    normal: Vec2,
    friction: Real,
    restitution: Real,
    points: SmallVec<[PointConstraint; 2]>,
}

/// Builds per-point constraint data from each touching contact's current
/// manifold and body state. Must run after contacts have been updated
/// for this step (`Contact::update`).
pub fn prepare(
    contacts: &SlotMap<ContactId, Contact>,
    island_contacts: &[ContactId],
    bodies: &SlotMap<BodyId, BodyData>,
    velocity_threshold: Real,
    radius_of: impl Fn(ShapeId) -> Real,
) -> Vec<ContactConstraint> {
    let mut out = Vec::with_capacity(island_contacts.len());

    for &cid in island_contacts {
        let Some(contact) = contacts.get(cid) else { continue };
        if !contact.is_touching || contact.is_sensor || !contact.enabled {
            continue;
        }

        let a = &bodies[contact.body_a];
        let b = &bodies[contact.body_b];
        let radius_a = radius_of(contact.shape_a);
        let radius_b = radius_of(contact.shape_b);
        let wm = WorldManifold::new(&contact.manifold, a.transform, radius_a, b.transform, radius_b);
        if wm.points.is_empty() {
            continue;
        }

        let mut points = SmallVec::new();
        for (i, &world_point) in wm.points.iter().enumerate() {
            let ra = world_point - a.sweep.c;
            let rb = world_point - b.sweep.c;

            let rn_a = ra.cross(wm.normal);
            let rn_b = rb.cross(wm.normal);
            let k_normal = a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
            let normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

            let tangent = wm.normal.right_perp();
            let rt_a = ra.cross(tangent);
            let rt_b = rb.cross(tangent);
            let k_tangent = a.inv_mass + b.inv_mass + a.inv_inertia * rt_a * rt_a + b.inv_inertia * rt_b * rt_b;
            let tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

            let rel_vel = (b.velocity.linear + Vec2::cross_sv(b.velocity.angular, rb))
                - (a.velocity.linear + Vec2::cross_sv(a.velocity.angular, ra));
            let vn = rel_vel.dot(wm.normal);

            let mut velocity_bias = 0.0;
            if vn < -velocity_threshold {
                velocity_bias = -contact.restitution * vn;
            }

            let mp = &contact.manifold.points[i];
            points.push(PointConstraint {
                ra,
                rb,
                normal_mass,
                tangent_mass,
                velocity_bias,
                normal_impulse: mp.normal_impulse,
                tangent_impulse: mp.tangent_impulse,
                separation: wm.separations[i],
            });
        }

        out.push(ContactConstraint {
            contact: cid,
            body_a: contact.body_a,
            body_b: contact.body_b,
            normal: wm.normal,
            friction: contact.friction,
            restitution: contact.restitution,
            points,
        });
    }

    out
}

pub fn warm_start(constraints: &[ContactConstraint], bodies: &mut SlotMap<BodyId, BodyData>) {
    for c in constraints {
        let tangent = c.normal.right_perp();
        for p in &c.points {
            let impulse = c.normal * p.normal_impulse + tangent * p.tangent_impulse;

            let a = &mut bodies[c.body_a];
            a.velocity.linear -= impulse * a.inv_mass;
            a.velocity.angular -= a.inv_inertia * p.ra.cross(impulse);

            let b = &mut bodies[c.body_b];
            b.velocity.linear += impulse * b.inv_mass;
            b.velocity.angular += b.inv_inertia * p.rb.cross(impulse);
        }
    }
}

pub fn solve(constraints: &mut [ContactConstraint], bodies: &mut SlotMap<BodyId, BodyData>) {
    for c in constraints.iter_mut() {
        let tangent = c.normal.right_perp();

        for p in c.points.iter_mut() {
            // Friction first (as in Box2D): bounded by the *previous*
            // step's normal impulse to avoid order-dependent bias.
            let a = &bodies[c.body_a];
            let b = &bodies[c.body_b];
            let rel_vel = (b.velocity.linear + Vec2::cross_sv(b.velocity.angular, p.rb))
                - (a.velocity.linear + Vec2::cross_sv(a.velocity.angular, p.ra));
            let vt = rel_vel.dot(tangent);
            let mut lambda = -p.tangent_mass * vt;

            let max_friction = c.friction * p.normal_impulse;
            let new_impulse = (p.tangent_impulse + lambda).clamp(-max_friction, max_friction);
            lambda = new_impulse - p.tangent_impulse;
            p.tangent_impulse = new_impulse;

            let impulse = tangent * lambda;
            let a = &mut bodies[c.body_a];
            a.velocity.linear -= impulse * a.inv_mass;
            a.velocity.angular -= a.inv_inertia * p.ra.cross(impulse);
            let b = &mut bodies[c.body_b];
            b.velocity.linear += impulse * b.inv_mass;
            b.velocity.angular += b.inv_inertia * p.rb.cross(impulse);
        }

        for p in c.points.iter_mut() {
            let a = &bodies[c.body_a];
            let b = &bodies[c.body_b];
            let rel_vel = (b.velocity.linear + Vec2::cross_sv(b.velocity.angular, p.rb))
                - (a.velocity.linear + Vec2::cross_sv(a.velocity.angular, p.ra));
            let vn = rel_vel.dot(c.normal);

            let mut lambda = -p.normal_mass * (vn - p.velocity_bias);
            let new_impulse = (p.normal_impulse + lambda).max(0.0);
            lambda = new_impulse - p.normal_impulse;
            p.normal_impulse = new_impulse;

            let impulse = c.normal * lambda;
            let a = &mut bodies[c.body_a];
            a.velocity.linear -= impulse * a.inv_mass;
            a.velocity.angular -= a.inv_inertia * p.ra.cross(impulse);
            let b = &mut bodies[c.body_b];
            b.velocity.linear += impulse * b.inv_mass;
            b.velocity.angular += b.inv_inertia * p.rb.cross(impulse);
        }
    }
}

/// Copies solved impulses back into each contact's manifold so the next
/// step's narrow phase can warm-start from them.
pub fn store_impulses(constraints: &[ContactConstraint], contacts: &mut SlotMap<ContactId, Contact>) {
    for c in constraints {
        if let Some(contact) = contacts.get_mut(c.contact) {
            for (i, p) in c.points.iter().enumerate() {
                if let Some(mp) = contact.manifold.points.get_mut(i) {
                    mp.normal_impulse = p.normal_impulse;
                    mp.tangent_impulse = p.tangent_impulse;
                    mp.max_normal_impulse = mp.max_normal_impulse.max(p.normal_impulse);
                }
            }
        }
    }
}
