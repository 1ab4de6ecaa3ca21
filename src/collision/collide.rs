//! Narrow-phase manifold generation: `collide_shapes` dispatches on the
//! shape-kind pair and produces a `Manifold` in the conventions
//! `WorldManifold` expects (see `manifold.rs`), following Box2D's
//! `b2CollideCircles` / `b2CollidePolygonAndCircle` / `b2CollidePolygons`.

use smallvec::SmallVec;

use super::manifold::{ContactFeature, Manifold, ManifoldPoint, ManifoldType};
use crate::core::Transform;
use crate::shapes::{Capsule, Circle, Polygon, Segment, Shape};
use crate::types::{Real, Vec2};

/// A read-only convex-polygon view used to treat polygons, capsules, and
/// segments uniformly in SAT code. Circles have no polygon view; they are
/// handled by dedicated circle-pair functions.
struct PolyView {
    vertices: SmallVec<[Vec2; 8]>,
    normals: SmallVec<[Vec2; 8]>,
    radius: Real,
}

impl PolyView {
    fn of_polygon(p: &Polygon) -> Self {
        Self {
            vertices: p.vertices.clone(),
            normals: p.normals.clone(),
            radius: p.radius,
        }
    }

    fn of_capsule(c: &Capsule) -> Self {
        let axis = (c.center2 - c.center1).normalized();
        let mut vertices = SmallVec::new();
        vertices.push(c.center1);
        vertices.push(c.center2);
        let mut normals = SmallVec::new();
        normals.push(axis.right_perp());
        normals.push(axis.left_perp());
        Self {
            vertices,
            normals,
            radius: c.radius,
        }
    }

    fn of_segment(s: &Segment) -> Self {
        let axis = (s.point2 - s.point1).normalized();
        let mut vertices = SmallVec::new();
        vertices.push(s.point1);
        vertices.push(s.point2);
        let mut normals = SmallVec::new();
        normals.push(axis.right_perp());
        normals.push(axis.left_perp());
        Self {
            vertices,
            normals,
            radius: 0.0,
        }
    }

    fn of_shape(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::Polygon(p) => Some(Self::of_polygon(p)),
            Shape::Capsule(c) => Some(Self::of_capsule(c)),
            Shape::Segment(s) => Some(Self::of_segment(s)),
            Shape::Circle(_) => None,
        }
    }
}

/// Top-level narrow-phase dispatch. Returns an empty manifold if the
/// shapes are not overlapping.
pub fn collide_shapes(shape_a: &Shape, xf_a: Transform, shape_b: &Shape, xf_b: Transform) -> Manifold {
    match (shape_a, shape_b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => collide_circles(ca, xf_a, cb, xf_b),
        (_, Shape::Circle(cb)) => {
            if let Some(poly) = PolyView::of_shape(shape_a) {
                collide_polygon_and_circle(&poly, xf_a, cb, xf_b, true)
            } else {
                Manifold::empty()
            }
        }
        (Shape::Circle(ca), _) => {
            if let Some(poly) = PolyView::of_shape(shape_b) {
                collide_polygon_and_circle(&poly, xf_b, ca, xf_a, false)
            } else {
                Manifold::empty()
            }
        }
        _ => {
            let (Some(pa), Some(pb)) = (PolyView::of_shape(shape_a), PolyView::of_shape(shape_b)) else {
                return Manifold::empty();
            };
            collide_polygons(&pa, xf_a, &pb, xf_b)
        }
    }
}

fn collide_circles(a: &Circle, xf_a: Transform, b: &Circle, xf_b: Transform) -> Manifold {
    let p_a = xf_a.transform_point(a.center);
    let p_b = xf_b.transform_point(b.center);
    let d = p_b - p_a;
    let dist = d.length();
    let separation = dist - a.radius - b.radius;

    if separation > 0.0 {
        return Manifold::empty();
    }

    let mut points = SmallVec::new();
    points.push(ManifoldPoint {
        local_anchor_a: a.center,
        local_anchor_b: b.center,
        separation,
        normal_impulse: 0.0,
        tangent_impulse: 0.0,
        max_normal_impulse: 0.0,
        id: ContactFeature::default(),
    });

    Manifold {
        kind: ManifoldType::Circles,
        local_normal: Vec2::ZERO,
        local_point: a.center,
        points,
    }
}

/// Polygon-like shape A (poly/capsule/segment) against circle B. When
/// `poly_is_a` is false the caller passed (circle, poly) in that world
/// order; the returned manifold's frame still follows `kind` (FaceA when
/// `poly_is_a`, FaceB otherwise) so `local_anchor_a`/`local_anchor_b`
/// line up with the caller's actual shape_a/shape_b.
fn collide_polygon_and_circle(
    poly: &PolyView,
    xf_poly: Transform,
    circle: &Circle,
    xf_circle: Transform,
    poly_is_a: bool,
) -> Manifold {
    // Circle center in the polygon's local frame.
    let c = xf_poly.inv_transform_point(xf_circle.transform_point(circle.center));

    let n = poly.vertices.len();
    let mut separation = Real::MIN;
    let mut normal_index = 0usize;
    for i in 0..n {
        let s = poly.normals[i].dot(c - poly.vertices[i]);
        if s > separation {
            separation = s;
            normal_index = i;
        }
    }

    let radius_sum = poly.radius + circle.radius;
    if separation > radius_sum {
        return Manifold::empty();
    }

    let v1 = poly.vertices[normal_index];
    let v2 = poly.vertices[(normal_index + 1) % n];

    let (local_normal, local_point, circle_local_to_poly);
    if separation < Real::EPSILON {
        // Circle center is inside the polygon's face region.
        local_normal = poly.normals[normal_index];
        local_point = (v1 + v2) * 0.5;
        circle_local_to_poly = c;
    } else {
        let u1 = (c - v1).dot(v2 - v1);
        let u2 = (c - v2).dot(v1 - v2);
        if u1 <= 0.0 {
            if (c - v1).length_squared() > radius_sum * radius_sum {
                return Manifold::empty();
            }
            local_normal = (c - v1).normalized();
            local_point = v1;
        } else if u2 <= 0.0 {
            if (c - v2).length_squared() > radius_sum * radius_sum {
                return Manifold::empty();
            }
            local_normal = (c - v2).normalized();
            local_point = v2;
        } else {
            if separation > radius_sum {
                return Manifold::empty();
            }
            local_normal = poly.normals[normal_index];
            local_point = (v1 + v2) * 0.5;
        }
        circle_local_to_poly = c;
    }

    let sep = (circle_local_to_poly - local_point).dot(local_normal) - radius_sum;

    let mut points = SmallVec::new();
    // Store the circle's anchor in its *own* local frame (circle.center),
    // matching the `local_anchor_b`/`local_anchor_a` contract used by
    // `WorldManifold` regardless of which side the circle is on.
    let point = if poly_is_a {
        ManifoldPoint {
            local_anchor_a: local_point,
            local_anchor_b: circle.center,
            separation: sep,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            max_normal_impulse: 0.0,
            id: ContactFeature::default(),
        }
    } else {
        ManifoldPoint {
            local_anchor_a: circle.center,
            local_anchor_b: local_point,
            separation: sep,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            max_normal_impulse: 0.0,
            id: ContactFeature::default(),
        }
    };
    points.push(point);

    Manifold {
        kind: if poly_is_a { ManifoldType::FaceA } else { ManifoldType::FaceB },
        local_normal,
        local_point,
        points,
    }
}

fn find_max_separation(a: &PolyView, xf_a: Transform, b: &PolyView, xf_b: Transform) -> (Real, usize) {
    let xf = xf_b.inv_mul(xf_a);
    let mut best_separation = Real::MIN;
    let mut best_index = 0;
    for i in 0..a.vertices.len() {
        let n = xf.q.rotate_vec(a.normals[i]);
        let v1 = xf.transform_point(a.vertices[i]);

        let mut si = Real::MAX;
        for &vb in &b.vertices {
            let s = n.dot(vb - v1);
            if s < si {
                si = s;
            }
        }
        if si > best_separation {
            best_separation = si;
            best_index = i;
        }
    }
    (best_separation, best_index)
}

fn find_incident_edge(ref_poly: &PolyView, xf_ref: Transform, edge: usize, inc_poly: &PolyView, xf_inc: Transform) -> usize {
    let normal_world = xf_ref.q.rotate_vec(ref_poly.normals[edge]);
    let normal_in_inc = xf_inc.q.inv_rotate_vec(normal_world);

    let mut best_index = 0;
    let mut min_dot = Real::MAX;
    for (i, &n) in inc_poly.normals.iter().enumerate() {
        let d = normal_in_inc.dot(n);
        if d < min_dot {
            min_dot = d;
            best_index = i;
        }
    }
    best_index
}

fn collide_polygons(a: &PolyView, xf_a: Transform, b: &PolyView, xf_b: Transform) -> Manifold {
    let total_radius = a.radius + b.radius;

    let (separation_a, edge_a) = find_max_separation(a, xf_a, b, xf_b);
    if separation_a > total_radius {
        return Manifold::empty();
    }

    let (separation_b, edge_b) = find_max_separation(b, xf_b, a, xf_a);
    if separation_b > total_radius {
        return Manifold::empty();
    }

    let (ref_poly, xf_ref, edge_ref, inc_poly, xf_inc, flip) = if separation_b > separation_a + 0.1 * 0.005 {
        (b, xf_b, edge_b, a, xf_a, true)
    } else {
        (a, xf_a, edge_a, b, xf_b, false)
    };

    let incident_edge = find_incident_edge(ref_poly, xf_ref, edge_ref, inc_poly, xf_inc);
    let i1 = incident_edge;
    let i2 = (incident_edge + 1) % inc_poly.vertices.len();

    let mut v_inc = [
        xf_ref.inv_mul(xf_inc).transform_point(inc_poly.vertices[i1]),
        xf_ref.inv_mul(xf_inc).transform_point(inc_poly.vertices[i2]),
    ];
    let mut ids = [(i1 as u8, i2 as u8); 2];

    let n = ref_poly.vertices.len();
    let v1 = ref_poly.vertices[edge_ref];
    let v2 = ref_poly.vertices[(edge_ref + 1) % n];
    let tangent = (v2 - v1).normalized();
    let normal = tangent.right_perp();

    // Clip incident edge to the reference edge's two side planes.
    let side1_offset = -tangent.dot(v1);
    let side2_offset = tangent.dot(v2);

    if !clip_segment(&mut v_inc, &mut ids, -tangent, side1_offset) {
        return Manifold::empty();
    }
    if !clip_segment(&mut v_inc, &mut ids, tangent, side2_offset) {
        return Manifold::empty();
    }

    let mut points = SmallVec::new();
    for k in 0..2 {
        let separation = normal.dot(v_inc[k] - v1) - total_radius;
        if separation <= 0.005 {
            // Anchors are reported in the reference/incident local frames;
            // the dispatcher transforms these into actual A/B local
            // frames using `flip`.
            let (anchor_ref, anchor_inc) = (v_inc[k], xf_inc.inv_mul(xf_ref).transform_point(v_inc[k]));
            let (local_anchor_a, local_anchor_b) = if flip {
                (anchor_inc, anchor_ref)
            } else {
                (anchor_ref, anchor_inc)
            };
            points.push(ManifoldPoint {
                local_anchor_a,
                local_anchor_b,
                separation,
                normal_impulse: 0.0,
                tangent_impulse: 0.0,
                max_normal_impulse: 0.0,
                id: ContactFeature {
                    index_a: if flip { ids[k].1 } else { edge_ref as u8 },
                    index_b: if flip { edge_ref as u8 } else { ids[k].1 },
                    type_a: 0,
                    type_b: 0,
                },
            });
        }
    }

    if points.is_empty() {
        return Manifold::empty();
    }

    Manifold {
        kind: if flip { ManifoldType::FaceB } else { ManifoldType::FaceA },
        local_normal: normal,
        local_point: (v1 + v2) * 0.5,
        points,
    }
}

/// Sutherland-Hodgman clip of a two-point segment against the half-plane
/// `dot(p, normal) <= offset`. Returns false if both points are clipped
/// away entirely.
fn clip_segment(v: &mut [Vec2; 2], ids: &mut [(u8, u8); 2], normal: Vec2, offset: Real) -> bool {
    let d0 = normal.dot(v[0]) - offset;
    let d1 = normal.dot(v[1]) - offset;

    let mut out = *v;
    let mut out_ids = *ids;
    let mut count = 0;

    if d0 <= 0.0 {
        out[count] = v[0];
        out_ids[count] = ids[0];
        count += 1;
    }
    if d1 <= 0.0 {
        out[count] = v[1];
        out_ids[count] = ids[1];
        count += 1;
    }

    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out[count] = v[0] + (v[1] - v[0]) * t;
        out_ids[count] = ids[if d0 > 0.0 { 0 } else { 1 }];
        count += 1;
    }

    if count < 2 {
        return false;
    }

    *v = out;
    *ids = out_ids;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{box_polygon, circle};

    #[test]
    fn touching_circles_produce_one_point() {
        let a = circle(Vec2::ZERO, 1.0);
        let b = circle(Vec2::ZERO, 1.0);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::from_pos_angle(Vec2::new(1.5, 0.0), 0.0);
        let m = collide_shapes(&Shape::Circle(a), xf_a, &Shape::Circle(b), xf_b);
        assert_eq!(m.point_count(), 1);
        assert!(m.points[0].separation < 0.0);
    }

    #[test]
    fn distant_circles_produce_no_manifold() {
        let a = circle(Vec2::ZERO, 1.0);
        let b = circle(Vec2::ZERO, 1.0);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::from_pos_angle(Vec2::new(10.0, 0.0), 0.0);
        let m = collide_shapes(&Shape::Circle(a), xf_a, &Shape::Circle(b), xf_b);
        assert_eq!(m.point_count(), 0);
    }

    #[test]
    fn overlapping_boxes_produce_two_points() {
        let box_a = box_polygon(1.0, 1.0);
        let box_b = box_polygon(1.0, 1.0);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::from_pos_angle(Vec2::new(1.5, 0.0), 0.0);
        let m = collide_shapes(&Shape::Polygon(box_a), xf_a, &Shape::Polygon(box_b), xf_b);
        assert_eq!(m.point_count(), 2);
    }

    #[test]
    fn box_resting_on_circle_produces_manifold() {
        let box_a = box_polygon(1.0, 1.0);
        let c = circle(Vec2::ZERO, 0.5);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::from_pos_angle(Vec2::new(0.0, -1.4), 0.0);
        let m = collide_shapes(&Shape::Polygon(box_a), xf_a, &Shape::Circle(c), xf_b);
        assert_eq!(m.point_count(), 1);
    }
}
