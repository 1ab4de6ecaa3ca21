//! Polygon construction helpers: convex hull extraction and normal/centroid
//! computation, following Box2D's `b2ComputeHull` (quickhull) so
//! `polygon_from_points` accepts arbitrary point soup, not just
//! already-convex CCW input.

use smallvec::SmallVec;

use super::{Polygon, MAX_POLY_VERTS};
use crate::types::{Real, Vec2};

const LINEAR_SLOP: Real = 0.005;

/// Recursive quickhull step: finds points strictly to the left of the
/// directed line `p1 -> p2` and appends the hull vertices they imply.
fn hull_recurse(p1: Vec2, p2: Vec2, points: &[Vec2], out: &mut Vec<Vec2>) {
    if points.is_empty() {
        return;
    }

    let e = (p2 - p1).normalized();

    let mut best_index = usize::MAX;
    let mut best_distance = 0.0f32;
    let mut left: Vec<Vec2> = Vec::new();

    for &p in points {
        let d = (p - p1).cross(e);
        if d > 0.0 {
            if best_index == usize::MAX || d > best_distance {
                best_distance = d;
                best_index = left.len();
            }
            left.push(p);
        }
    }

    if left.is_empty() {
        return;
    }

    let best = left[best_index];
    left.swap_remove(best_index);

    let rest = left;
    hull_recurse(p1, best, &rest, out);
    out.push(best);
    hull_recurse(best, p2, &rest, out);
}

/// Computes the convex hull of an arbitrary point set, CCW-wound,
/// collapsing near-duplicate and near-collinear points.
pub fn compute_hull(points: &[Vec2]) -> Option<SmallVec<[Vec2; MAX_POLY_VERTS]>> {
    if points.len() < 3 {
        return None;
    }

    // Find extreme points on the x-axis to seed the hull.
    let mut lower = points[0];
    let mut upper = points[0];
    for &p in &points[1..] {
        if p.x < lower.x || (p.x == lower.x && p.y < lower.y) {
            lower = p;
        }
        if p.x > upper.x || (p.x == upper.x && p.y > upper.y) {
            upper = p;
        }
    }
    if (lower - upper).length() < LINEAR_SLOP {
        return None;
    }

    let mut hull = vec![lower];
    let rest: Vec<Vec2> = points
        .iter()
        .copied()
        .filter(|&p| p != lower && p != upper)
        .collect();
    hull_recurse(lower, upper, &rest, &mut hull);
    hull.push(upper);
    hull_recurse(upper, lower, &rest, &mut hull);

    if hull.len() < 3 || hull.len() > MAX_POLY_VERTS {
        return None;
    }

    // Drop near-collinear vertices so normals stay well defined.
    let mut cleaned: Vec<Vec2> = Vec::with_capacity(hull.len());
    for i in 0..hull.len() {
        let prev = hull[(i + hull.len() - 1) % hull.len()];
        let curr = hull[i];
        let next = hull[(i + 1) % hull.len()];
        let e1 = curr - prev;
        let e2 = next - curr;
        if e1.cross(e2) > 1e-6 {
            cleaned.push(curr);
        }
    }

    if cleaned.len() < 3 || cleaned.len() > MAX_POLY_VERTS {
        return None;
    }

    let mut out = SmallVec::new();
    out.extend(cleaned);
    Some(out)
}

/// Builds a `Polygon` (vertices + normals + centroid) from an already
/// convex, CCW-wound vertex list.
pub fn make_polygon(vertices: &[Vec2], radius: Real) -> Polygon {
    let n = vertices.len();
    let mut normals = SmallVec::new();
    for i in 0..n {
        let edge = vertices[(i + 1) % n] - vertices[i];
        debug_assert!(edge.length_squared() > Real::EPSILON);
        normals.push(edge.right_perp().normalized());
    }

    let mut verts = SmallVec::new();
    verts.extend(vertices.iter().copied());

    let centroid = compute_centroid(&verts);

    Polygon {
        vertices: verts,
        normals,
        centroid,
        radius,
    }
}

fn compute_centroid(vertices: &[Vec2]) -> Vec2 {
    let n = vertices.len();
    let origin = vertices[0];
    let mut area = 0.0f32;
    let mut center = Vec2::ZERO;
    for i in 1..n - 1 {
        let e1 = vertices[i] - origin;
        let e2 = vertices[i + 1] - origin;
        let a = 0.5 * e1.cross(e2);
        area += a;
        center += (e1 + e2) * (a / 3.0);
    }
    if area > Real::EPSILON {
        center * (1.0 / area) + origin
    } else {
        origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_of_square_has_four_vertices() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.5, 0.5), // interior point, should be dropped
        ];
        let hull = compute_hull(&points).expect("hull");
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn make_polygon_centroid_of_square_is_center() {
        let verts = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        let poly = make_polygon(&verts, 0.0);
        assert!(poly.centroid.length() < 1e-5);
    }
}
