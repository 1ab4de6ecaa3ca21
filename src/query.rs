//! Spatial queries over a `World`'s broad phase: AABB overlap and ray
//! casting, following Box2D's `b2World::QueryAABB`/`b2World::RayCast`.
//! Pure geometry lives here; `World` exposes thin wrappers that supply
//! its own tree/shape/body state.

use crate::collision::Aabb;
use crate::filter::Filter;
use crate::fixture::FixtureData;
use crate::shapes::RayCastOutput;
use crate::types::{Real, ShapeId, Vec2};
use crate::world::World;

/// Category/mask filter applied to a query, independent of a fixture's
/// own collision filter (mirrors Box2D v3's `b2QueryFilter`: queries
/// have no group-index override, only category/mask).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueryFilter {
    pub category_bits: u64,
    pub mask_bits: u64,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self { category_bits: 1, mask_bits: u64::MAX }
    }
}

impl QueryFilter {
    pub fn matches(&self, fixture_filter: &Filter) -> bool {
        (self.category_bits & fixture_filter.mask_bits) != 0 && (fixture_filter.category_bits & self.mask_bits) != 0
    }
}

/// The nearest shape hit by a ray cast.
#[derive(Copy, Clone, Debug)]
pub struct RayCastHit {
    pub shape: ShapeId,
    pub point: Vec2,
    pub normal: Vec2,
    pub fraction: Real,
}

impl World {
    /// Visits every fixture whose fattened broad-phase AABB overlaps
    /// `aabb`. `callback` returning `false` stops the query early.
    pub fn query_aabb(&self, aabb: &Aabb, mut callback: impl FnMut(ShapeId) -> bool) {
        let mut stop = false;
        self.tree().query(aabb, |proxy| {
            if stop {
                return false;
            }
            if let Some(shape_id) = self.tree().user_data(proxy) {
                if !callback(shape_id) {
                    stop = true;
                    return false;
                }
            }
            true
        });
    }

    /// Convenience wrapper collecting every fixture overlapping `aabb`.
    pub fn overlap_aabb(&self, aabb: &Aabb, filter: QueryFilter) -> Vec<ShapeId> {
        let mut out = Vec::new();
        self.query_aabb(aabb, |sid| {
            if self.shapes().get(sid).is_some_and(|f: &FixtureData| filter.matches(&f.filter)) {
                out.push(sid);
            }
            true
        });
        out
    }

    /// Casts a segment from `p1` to `p2`, visiting every fixture it
    /// might hit (broad-phase order, not sorted by distance). `callback`
    /// returns the new fraction to continue narrowing the search with,
    /// `0.0` to stop immediately, or the unchanged fraction to skip this
    /// hit and keep going.
    pub fn ray_cast(&self, p1: Vec2, p2: Vec2, filter: QueryFilter, mut callback: impl FnMut(RayCastHit) -> Real) {
        self.tree().ray_cast(p1, p2, 1.0, |proxy, seg_p1, seg_p2| {
            let Some(shape_id) = self.tree().user_data(proxy) else { return 1.0 };
            let Some(fixture) = self.shapes().get(shape_id) else { return 1.0 };
            if !filter.matches(&fixture.filter) {
                return 1.0;
            }
            let Some(body) = self.bodies().get(fixture.body) else { return 1.0 };
            let Some(hit) = fixture.shape.ray_cast(body.transform, seg_p1, seg_p2, 1.0) else { return 1.0 };
            let point = seg_p1 + (seg_p2 - seg_p1) * hit.fraction;
            callback(RayCastHit { shape: shape_id, point, normal: hit.normal, fraction: hit.fraction })
        });
    }

    /// Returns the closest fixture hit by the segment `p1 -> p2`, if any.
    pub fn cast_ray_closest(&self, p1: Vec2, p2: Vec2, filter: QueryFilter) -> Option<RayCastHit> {
        let mut best: Option<RayCastHit> = None;
        self.ray_cast(p1, p2, filter, |hit| {
            best = Some(hit);
            hit.fraction
        });
        best
    }
}
