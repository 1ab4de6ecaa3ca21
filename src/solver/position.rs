//! Contact position correction: Box2D's nonlinear Gauss-Seidel position
//! solver (`b2ContactSolver::SolvePositionConstraints`). Runs after
//! velocity solving and integration, nudging overlapping bodies apart
//! directly in position space rather than through velocity bias, so it
//! doesn't add energy.

use slotmap::SlotMap;

use crate::body::BodyData;
use crate::collision::manifold::WorldManifold;
use crate::contact::Contact;
use crate::types::{BodyId, ContactId, Real};

pub struct PositionConstraint {
    contact: ContactId,
    body_a: BodyId,
    body_b: BodyId,
    radius_a: Real,
    radius_b: Real,
}

pub fn prepare(
    contacts: &SlotMap<ContactId, Contact>,
    island_contacts: &[ContactId],
    radius_of: impl Fn(crate::types::ShapeId) -> Real,
) -> Vec<PositionConstraint> {
    island_contacts
        .iter()
        .filter_map(|&cid| {
            let contact = contacts.get(cid)?;
            if !contact.is_touching || contact.is_sensor || !contact.enabled {
                return None;
            }
            Some(PositionConstraint {
                contact: cid,
                body_a: contact.body_a,
                body_b: contact.body_b,
                radius_a: radius_of(contact.shape_a),
                radius_b: radius_of(contact.shape_b),
            })
        })
        .collect()
}

/// Runs one NGS position-correction pass over every constraint. Returns
/// whether every point's separation is within `linear_slop` of zero, the
/// termination condition for the position-iteration loop.
pub fn solve(
    constraints: &[PositionConstraint],
    contacts: &SlotMap<ContactId, Contact>,
    bodies: &mut SlotMap<BodyId, BodyData>,
    linear_slop: Real,
    max_linear_correction: Real,
) -> bool {
    let mut min_separation: Real = 0.0;

    for c in constraints {
        let Some(contact) = contacts.get(c.contact) else { continue };
        let a = &bodies[c.body_a];
        let b = &bodies[c.body_b];
        let wm = WorldManifold::new(&contact.manifold, a.transform, c.radius_a, b.transform, c.radius_b);

        for (i, &world_point) in wm.points.iter().enumerate() {
            let separation = wm.separations[i];
            min_separation = min_separation.min(separation);

            let correction = (separation + linear_slop).clamp(-max_linear_correction, 0.0);
            if correction >= 0.0 {
                continue;
            }

            let a = &bodies[c.body_a];
            let b = &bodies[c.body_b];
            let ra = world_point - a.sweep.c;
            let rb = world_point - b.sweep.c;

            let rn_a = ra.cross(wm.normal);
            let rn_b = rb.cross(wm.normal);
            let k = a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
            let impulse_mag = if k > 0.0 { -correction / k } else { 0.0 };
            let impulse = wm.normal * impulse_mag;

            let a = &mut bodies[c.body_a];
            a.sweep.c -= impulse * a.inv_mass;
            a.sweep.a -= a.inv_inertia * ra.cross(impulse);
            a.synchronize_transform();

            let b = &mut bodies[c.body_b];
            b.sweep.c += impulse * b.inv_mass;
            b.sweep.a += b.inv_inertia * rb.cross(impulse);
            b.synchronize_transform();
        }
    }

    min_separation > -3.0 * linear_slop
}
