//! Contacts: persistent per-fixture-pair state bridging the broad phase
//! to the narrow phase and solver, plus the doubly-linked per-body
//! contact edge lists used for island construction.

use crate::collision::collide::collide_shapes;
use crate::collision::manifold::Manifold;
use crate::types::{BodyId, ContactId, Real, ShapeId};

/// One direction of the doubly-linked contact list hanging off a body,
/// mirroring Box2D's `b2ContactEdge`.
#[derive(Copy, Clone, Debug)]
pub struct ContactEdge {
    pub other: BodyId,
    pub contact: ContactId,
}

pub struct Contact {
    pub shape_a: ShapeId,
    pub shape_b: ShapeId,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub manifold: Manifold,
    pub friction: Real,
    pub restitution: Real,
    pub tangent_speed: Real,
    pub is_touching: bool,
    pub was_touching: bool,
    pub enabled: bool,
    pub is_sensor: bool,
    /// Set when either shape's filter or a custom filter callback
    /// rejected the pair; the contact is kept (not destroyed) so it is
    /// recreated only if the broad phase re-reports an overlap, but it
    /// is skipped in `update`.
    pub filtered: bool,
    pub island_index: Option<u32>,
    pub toi_count: u32,
}

impl Contact {
    pub fn new(shape_a: ShapeId, body_a: BodyId, shape_b: ShapeId, body_b: BodyId, is_sensor: bool) -> Self {
        Self {
            shape_a,
            shape_b,
            body_a,
            body_b,
            manifold: Manifold::empty(),
            friction: 0.6,
            restitution: 0.0,
            tangent_speed: 0.0,
            is_touching: false,
            was_touching: false,
            enabled: true,
            is_sensor,
            filtered: false,
            island_index: None,
            toi_count: 0,
        }
    }

    /// Runs the narrow phase and updates the manifold in place, carrying
    /// forward warm-start impulses for points whose `ContactFeature` id
    /// matches a point from the previous manifold.
    pub fn update(
        &mut self,
        shape_a: &crate::shapes::Shape,
        xf_a: crate::core::Transform,
        shape_b: &crate::shapes::Shape,
        xf_b: crate::core::Transform,
    ) {
        self.was_touching = self.is_touching;

        if !self.enabled || self.filtered {
            self.manifold = Manifold::empty();
            self.is_touching = false;
            return;
        }

        let old_manifold = std::mem::replace(&mut self.manifold, Manifold::empty());
        let mut new_manifold = collide_shapes(shape_a, xf_a, shape_b, xf_b);

        for np in new_manifold.points.iter_mut() {
            for op in old_manifold.points.iter() {
                if np.id == op.id {
                    np.normal_impulse = op.normal_impulse;
                    np.tangent_impulse = op.tangent_impulse;
                    break;
                }
            }
        }

        self.is_touching = new_manifold.point_count() > 0;
        self.manifold = new_manifold;
    }
}
