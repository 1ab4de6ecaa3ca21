//! Contact manifolds: the narrow phase's output, carrying enough state
//! (feature ids, local anchors, warm-start impulses) to persist contact
//! points across steps.

use smallvec::SmallVec;

use crate::core::Transform;
use crate::types::{Real, Vec2};

/// Identifies which shape features produced a manifold point, so the
/// same contact point can be tracked frame to frame for warm-starting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFeature {
    pub index_a: u8,
    pub index_b: u8,
    pub type_a: u8,
    pub type_b: u8,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ManifoldPoint {
    /// Contact point, local to shape A's body.
    pub local_anchor_a: Vec2,
    /// Contact point, local to shape B's body.
    pub local_anchor_b: Vec2,
    pub separation: Real,
    pub normal_impulse: Real,
    pub tangent_impulse: Real,
    /// Normal impulse from the last solve; used to detect persistent
    /// contacts for restitution application.
    pub max_normal_impulse: Real,
    pub id: ContactFeature,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ManifoldType {
    Circles,
    FaceA,
    FaceB,
}

#[derive(Clone, Debug)]
pub struct Manifold {
    pub kind: ManifoldType,
    pub local_normal: Vec2,
    pub local_point: Vec2,
    pub points: SmallVec<[ManifoldPoint; 2]>,
}

impl Manifold {
    pub fn empty() -> Self {
        Self {
            kind: ManifoldType::Circles,
            local_normal: Vec2::ZERO,
            local_point: Vec2::ZERO,
            points: SmallVec::new(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

/// World-space points/normal/separations derived from a local manifold
/// and the two body transforms, used directly by the velocity solver.
#[derive(Clone, Debug, Default)]
pub struct WorldManifold {
    pub normal: Vec2,
    pub points: SmallVec<[Vec2; 2]>,
    pub separations: SmallVec<[Real; 2]>,
}

impl WorldManifold {
    pub fn new(manifold: &Manifold, xf_a: Transform, radius_a: Real, xf_b: Transform, radius_b: Real) -> Self {
        if manifold.points.is_empty() {
            return Self::default();
        }

        let (normal, points_pairs) = match manifold.kind {
            ManifoldType::Circles => {
                let point_a = xf_a.transform_point(manifold.local_point);
                let point_b = xf_b.transform_point(manifold.points[0].local_anchor_b);
                let normal = if (point_b - point_a).length_squared() > Real::EPSILON * Real::EPSILON {
                    (point_b - point_a).normalized()
                } else {
                    Vec2::new(1.0, 0.0)
                };
                let ca = point_a + normal * radius_a;
                let cb = point_b - normal * radius_b;
                (normal, vec![(ca, cb)])
            }
            ManifoldType::FaceA => {
                let normal = xf_a.q.rotate_vec(manifold.local_normal);
                let plane_point = xf_a.transform_point(manifold.local_point);
                let mut pairs = Vec::new();
                for p in &manifold.points {
                    let clip_point = xf_b.transform_point(p.local_anchor_b);
                    let ca = clip_point + normal * (radius_a - (clip_point - plane_point).dot(normal));
                    let cb = clip_point - normal * radius_b;
                    pairs.push((ca, cb));
                }
                (normal, pairs)
            }
            ManifoldType::FaceB => {
                let normal = xf_b.q.rotate_vec(manifold.local_normal);
                let plane_point = xf_b.transform_point(manifold.local_point);
                let mut pairs = Vec::new();
                for p in &manifold.points {
                    let clip_point = xf_a.transform_point(p.local_anchor_a);
                    let cb = clip_point + normal * (radius_b - (clip_point - plane_point).dot(normal));
                    let ca = clip_point - normal * radius_a;
                    pairs.push((ca, cb));
                }
                // FaceB manifolds report the normal pointing from B into A
                // on the wire, but solver code expects A->B; flip here.
                (-normal, pairs)
            }
        };

        let mut points = SmallVec::new();
        let mut separations = SmallVec::new();
        for (ca, cb) in points_pairs {
            points.push((ca + cb) * 0.5);
            separations.push((cb - ca).dot(normal));
        }

        Self {
            normal,
            points,
            separations,
        }
    }
}
