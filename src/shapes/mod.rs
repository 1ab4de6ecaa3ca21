//! Shapes: polymorphic convex (or convex-child) geometry bound to bodies
//! through fixtures.
//!
//! Every variant exposes, per child, a *distance proxy* — vertices plus a
//! vertex radius — which is all the broad/narrow phase and GJK/TOI code
//! needs to know about a shape.

pub mod chain;
pub mod helpers;

use smallvec::SmallVec;

use crate::filter::Filter;
use crate::types::{Real, Vec2};

/// Maximum vertices accepted by a convex polygon.
pub const MAX_POLY_VERTS: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: Real,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub point1: Vec2,
    pub point2: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Capsule {
    pub center1: Vec2,
    pub center2: Vec2,
    pub radius: Real,
}

/// A convex polygon, CCW-wound, with a cached centroid and a uniform
/// vertex radius (nonzero radius makes it a "rounded polygon").
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: SmallVec<[Vec2; MAX_POLY_VERTS]>,
    pub normals: SmallVec<[Vec2; MAX_POLY_VERTS]>,
    pub centroid: Vec2,
    pub radius: Real,
}

impl Polygon {
    pub fn count(&self) -> usize {
        self.vertices.len()
    }
}

/// Vertices + per-vertex uniform radius for one child of a shape — the
/// only view the broad/narrow phase and GJK/TOI code operate on.
#[derive(Clone, Debug)]
pub struct DistanceProxy {
    pub vertices: SmallVec<[Vec2; MAX_POLY_VERTS]>,
    pub radius: Real,
}

impl DistanceProxy {
    pub fn single(v: Vec2, radius: Real) -> Self {
        let mut vertices = SmallVec::new();
        vertices.push(v);
        Self { vertices, radius }
    }

    pub fn segment(p1: Vec2, p2: Vec2, radius: Real) -> Self {
        let mut vertices = SmallVec::new();
        vertices.push(p1);
        vertices.push(p2);
        Self { vertices, radius }
    }

    pub fn polygon(poly: &Polygon) -> Self {
        Self {
            vertices: poly.vertices.clone(),
            radius: poly.radius,
        }
    }

    /// The support vertex index in the given direction.
    pub fn support(&self, d: Vec2) -> usize {
        let mut best_index = 0;
        let mut best_value = self.vertices[0].dot(d);
        for (i, v) in self.vertices.iter().enumerate().skip(1) {
            let value = v.dot(d);
            if value > best_value {
                best_value = value;
                best_index = i;
            }
        }
        best_index
    }
}

/// Mass properties contributed by one shape, about the shape's own local
/// origin (not yet recentered to the body's center of mass).
#[derive(Copy, Clone, Debug, Default)]
pub struct MassData {
    pub mass: Real,
    pub center: Vec2,
    /// Rotational inertia about the local origin.
    pub rotational_inertia: Real,
}

/// Polymorphic shape value. `Chain` is represented separately
/// (`chain::ChainShape`) because it is multi-child by construction and is
/// attached to a body as a set of fixtures, one per edge, rather than as
/// a single fixture — see `chain.rs`.
#[derive(Clone, Debug)]
pub enum Shape {
    Circle(Circle),
    Segment(Segment),
    Capsule(Capsule),
    Polygon(Polygon),
}

impl Shape {
    pub fn child_count(&self) -> usize {
        1
    }

    pub fn radius(&self) -> Real {
        match self {
            Shape::Circle(c) => c.radius,
            Shape::Segment(_) => 0.0,
            Shape::Capsule(c) => c.radius,
            Shape::Polygon(p) => p.radius,
        }
    }

    pub fn distance_proxy(&self, _child: usize) -> DistanceProxy {
        match self {
            Shape::Circle(c) => DistanceProxy::single(c.center, c.radius),
            Shape::Segment(s) => DistanceProxy::segment(s.point1, s.point2, 0.0),
            Shape::Capsule(c) => DistanceProxy::segment(c.center1, c.center2, c.radius),
            Shape::Polygon(p) => DistanceProxy::polygon(p),
        }
    }

    pub fn compute_aabb(&self, xf: crate::core::Transform, _child: usize) -> crate::collision::aabb::Aabb {
        let proxy = self.distance_proxy(0);
        let mut lower = xf.transform_point(proxy.vertices[0]);
        let mut upper = lower;
        for &v in proxy.vertices.iter().skip(1) {
            let p = xf.transform_point(v);
            lower = lower.min(p);
            upper = upper.max(p);
        }
        let r = Vec2::new(proxy.radius, proxy.radius);
        crate::collision::aabb::Aabb {
            lower: lower - r,
            upper: upper + r,
        }
    }

    /// Mass properties about this shape's own local origin. Segments and
    /// plain chains have no area and contribute zero mass.
    pub fn compute_mass(&self, density: Real) -> MassData {
        match self {
            Shape::Circle(c) => {
                let mass = density * std::f32::consts::PI * c.radius * c.radius;
                let i = mass * (0.5 * c.radius * c.radius + c.center.dot(c.center));
                MassData {
                    mass,
                    center: c.center,
                    rotational_inertia: i,
                }
            }
            Shape::Segment(_) => MassData::default(),
            Shape::Capsule(c) => compute_capsule_mass(c, density),
            Shape::Polygon(p) => compute_polygon_mass(p, density),
        }
    }

    /// Casts a segment `p1 -> p2` (world space) against this shape placed
    /// at `xf`, following Box2D's per-shape `RayCast` overloads. Returns
    /// the hit fraction in `[0, max_fraction]` and the outward world
    /// normal at the hit point.
    pub fn ray_cast(&self, xf: crate::core::Transform, p1: Vec2, p2: Vec2, max_fraction: Real) -> Option<RayCastOutput> {
        match self {
            Shape::Circle(c) => ray_cast_circle(xf.transform_point(c.center), c.radius, p1, p2, max_fraction),
            Shape::Segment(s) => ray_cast_segment(xf, s.point1, s.point2, p1, p2, max_fraction),
            Shape::Capsule(c) => ray_cast_capsule(xf, c, p1, p2, max_fraction),
            Shape::Polygon(poly) => ray_cast_polygon(xf, poly, p1, p2, max_fraction),
        }
    }
}

/// Result of a shape ray cast: the hit fraction along `p1 -> p2` and the
/// outward-facing world-space surface normal at the hit point.
#[derive(Copy, Clone, Debug)]
pub struct RayCastOutput {
    pub fraction: Real,
    pub normal: Vec2,
}

fn ray_cast_circle(center_world: Vec2, radius: Real, p1: Vec2, p2: Vec2, max_fraction: Real) -> Option<RayCastOutput> {
    let s = p1 - center_world;
    let b = s.dot(s) - radius * radius;
    let r = p2 - p1;
    let rr = r.dot(r);
    if rr < Real::EPSILON {
        return None;
    }
    let c = s.dot(r);
    let sigma = c * c - rr * b;
    if sigma < 0.0 {
        return None;
    }
    let t = -(c + sigma.sqrt());
    if t < 0.0 || t > max_fraction * rr {
        return None;
    }
    let t = t / rr;
    let normal = (s + r * t).normalized();
    Some(RayCastOutput { fraction: t, normal })
}

/// Ray vs. a single segment (no radius), working entirely in world space
/// with a precomputed world-space endpoint pair.
fn ray_cast_bare_segment(v1: Vec2, v2: Vec2, p1: Vec2, p2: Vec2, max_fraction: Real) -> Option<RayCastOutput> {
    let d = p2 - p1;
    let e = v2 - v1;
    let len = e.length();
    if len < Real::EPSILON {
        return None;
    }
    let mut normal = e.right_perp().normalized();

    let denominator = d.dot(normal);
    if denominator.abs() < Real::EPSILON {
        return None;
    }
    let numerator = normal.dot(v1 - p1);
    let t = numerator / denominator;
    if t < 0.0 || t > max_fraction {
        return None;
    }

    let q = p1 + d * t;
    let s = (q - v1).dot(e) / (len * len);
    if s < 0.0 || s > 1.0 {
        return None;
    }

    if numerator > 0.0 {
        normal = -normal;
    }
    Some(RayCastOutput { fraction: t, normal })
}

fn ray_cast_segment(xf: crate::core::Transform, point1: Vec2, point2: Vec2, p1: Vec2, p2: Vec2, max_fraction: Real) -> Option<RayCastOutput> {
    let v1 = xf.transform_point(point1);
    let v2 = xf.transform_point(point2);
    ray_cast_bare_segment(v1, v2, p1, p2, max_fraction)
}

/// Capsule ray cast: minimum-fraction hit among the two end caps and the
/// two side rails offset by `radius` from the spine, since there is no
/// single closed form the way there is for a bare circle or polygon.
fn ray_cast_capsule(xf: crate::core::Transform, c: &Capsule, p1: Vec2, p2: Vec2, max_fraction: Real) -> Option<RayCastOutput> {
    let center1 = xf.transform_point(c.center1);
    let center2 = xf.transform_point(c.center2);

    let mut best: Option<RayCastOutput> = None;
    let mut consider = |candidate: Option<RayCastOutput>| {
        if let Some(hit) = candidate {
            if best.is_none_or(|b| hit.fraction < b.fraction) {
                best = Some(hit);
            }
        }
    };

    consider(ray_cast_circle(center1, c.radius, p1, p2, max_fraction));
    consider(ray_cast_circle(center2, c.radius, p1, p2, max_fraction));

    let axis = center2 - center1;
    if axis.length_squared() > Real::EPSILON {
        let side = axis.normalized().right_perp();
        for sign in [1.0, -1.0] {
            let offset = side * (c.radius * sign);
            let hit = ray_cast_bare_segment(center1 + offset, center2 + offset, p1, p2, max_fraction);
            consider(hit.map(|h| RayCastOutput {
                fraction: h.fraction,
                normal: if h.normal.dot(offset) < 0.0 { -h.normal } else { h.normal },
            }));
        }
    }

    best
}

fn ray_cast_polygon(xf: crate::core::Transform, poly: &Polygon, p1_world: Vec2, p2_world: Vec2, max_fraction: Real) -> Option<RayCastOutput> {
    let p1 = xf.inv_transform_point(p1_world);
    let d = xf.q.inv_rotate_vec(p2_world - p1_world);

    let mut lower: Real = 0.0;
    let mut upper: Real = max_fraction;
    let mut index: Option<usize> = None;

    for i in 0..poly.count() {
        let numerator = poly.normals[i].dot(poly.vertices[i] - p1);
        let denominator = poly.normals[i].dot(d);

        if denominator == 0.0 {
            if numerator < 0.0 {
                return None;
            }
        } else {
            if denominator < 0.0 && numerator < lower * denominator {
                lower = numerator / denominator;
                index = Some(i);
            } else if denominator > 0.0 && numerator < upper * denominator {
                upper = numerator / denominator;
            }
        }

        if upper < lower {
            return None;
        }
    }

    index.map(|i| RayCastOutput {
        fraction: lower,
        normal: xf.q.rotate_vec(poly.normals[i]),
    })
}

fn compute_capsule_mass(c: &Capsule, density: Real) -> MassData {
    let radius = c.radius;
    let rr = radius * radius;
    let p1 = c.center1;
    let p2 = c.center2;
    let length = (p2 - p1).length();
    let ll = length * length;

    let circle_mass = density * std::f32::consts::PI * rr;
    let box_mass = density * 2.0 * radius * length;
    let mass = circle_mass + box_mass;

    let center = (p1 + p2) * 0.5;

    // Two offset half circles, both halves add up to full circle and each
    // half is offset by half length; approximate via Box2D's closed form.
    let lc = 4.0 * radius / (3.0 * std::f32::consts::PI);
    let h = 0.5 * length;
    let circle_inertia =
        circle_mass * (0.5 * rr + h * h + 2.0 * h * lc);
    let box_inertia = box_mass * (4.0 * rr + ll) / 12.0;
    let rotational_inertia = circle_inertia + box_inertia + mass * center.dot(center);

    MassData {
        mass,
        center,
        rotational_inertia,
    }
}

fn compute_polygon_mass(poly: &Polygon, density: Real) -> MassData {
    let n = poly.count();
    debug_assert!(n >= 3);

    // Reference point for triangulation: use vertex 0 to reduce roundoff
    // when the polygon's centroid is far from the local origin.
    let r = poly.vertices[0];

    let mut area = 0.0f32;
    let mut center = Vec2::ZERO;
    let mut rotational_inertia = 0.0f32;

    let inv3 = 1.0 / 3.0;
    for i in 1..n - 1 {
        let e1 = poly.vertices[i] - r;
        let e2 = poly.vertices[i + 1] - r;

        let d = e1.cross(e2);
        let triangle_area = 0.5 * d;
        area += triangle_area;

        center += (e1 + e2) * (triangle_area * inv3);

        let intx2 = e1.x * e1.x + e1.x * e2.x + e2.x * e2.x;
        let inty2 = e1.y * e1.y + e1.y * e2.y + e2.y * e2.y;
        rotational_inertia += (0.25 * inv3 * d) * (intx2 + inty2);
    }

    let mass = density * area;
    let local_centroid = if area > Real::EPSILON {
        center * (1.0 / area)
    } else {
        Vec2::ZERO
    };

    // `rotational_inertia` so far is about `r`; shift to the centroid,
    // then out to the shape's local origin (parallel-axis theorem twice).
    let i_about_ref = density * rotational_inertia;
    let i_centroid = i_about_ref - mass * local_centroid.dot(local_centroid);
    let true_centroid = local_centroid + r;
    let i_origin = i_centroid + mass * true_centroid.dot(true_centroid);

    MassData {
        mass,
        center: true_centroid,
        rotational_inertia: i_origin,
    }
}

/// Shape surface material (friction/restitution defaults and per-shape
/// overrides).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMaterial {
    pub friction: Real,
    pub restitution: Real,
    pub tangent_speed: Real,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            friction: 0.6,
            restitution: 0.0,
            tangent_speed: 0.0,
        }
    }
}

/// Definition used to create a fixture: material + density + filter +
/// event flags.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeDef {
    pub material: SurfaceMaterial,
    pub density: Real,
    pub filter: Filter,
    pub is_sensor: bool,
    pub enable_sensor_events: bool,
    pub enable_contact_events: bool,
    pub enable_pre_solve_events: bool,
    pub enable_custom_filtering: bool,
}

impl Default for ShapeDef {
    fn default() -> Self {
        Self {
            material: SurfaceMaterial::default(),
            density: 1.0,
            filter: Filter::default(),
            is_sensor: false,
            enable_sensor_events: true,
            enable_contact_events: true,
            enable_pre_solve_events: false,
            enable_custom_filtering: false,
        }
    }
}

impl ShapeDef {
    pub fn builder() -> ShapeDefBuilder {
        ShapeDefBuilder {
            def: Self::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShapeDefBuilder {
    def: ShapeDef,
}

impl ShapeDefBuilder {
    pub fn material(mut self, mat: SurfaceMaterial) -> Self {
        self.def.material = mat;
        self
    }
    pub fn density(mut self, v: Real) -> Self {
        self.def.density = v;
        self
    }
    pub fn friction(mut self, v: Real) -> Self {
        self.def.material.friction = v;
        self
    }
    pub fn restitution(mut self, v: Real) -> Self {
        self.def.material.restitution = v;
        self
    }
    pub fn filter(mut self, f: Filter) -> Self {
        self.def.filter = f;
        self
    }
    pub fn sensor(mut self, flag: bool) -> Self {
        self.def.is_sensor = flag;
        self
    }
    pub fn enable_sensor_events(mut self, flag: bool) -> Self {
        self.def.enable_sensor_events = flag;
        self
    }
    pub fn enable_contact_events(mut self, flag: bool) -> Self {
        self.def.enable_contact_events = flag;
        self
    }
    pub fn enable_pre_solve_events(mut self, flag: bool) -> Self {
        self.def.enable_pre_solve_events = flag;
        self
    }
    pub fn enable_custom_filtering(mut self, flag: bool) -> Self {
        self.def.enable_custom_filtering = flag;
        self
    }
    #[must_use]
    pub fn build(self) -> ShapeDef {
        self.def
    }
}

/// Circle primitive helper.
#[inline]
pub fn circle<V: Into<Vec2>>(center: V, radius: Real) -> Circle {
    Circle {
        center: center.into(),
        radius,
    }
}

/// Segment primitive helper.
#[inline]
pub fn segment<V: Into<Vec2>>(p1: V, p2: V) -> Segment {
    Segment {
        point1: p1.into(),
        point2: p2.into(),
    }
}

/// Capsule primitive helper.
#[inline]
pub fn capsule<V: Into<Vec2>>(c1: V, c2: V, radius: Real) -> Capsule {
    Capsule {
        center1: c1.into(),
        center2: c2.into(),
        radius,
    }
}

/// Axis-aligned box polygon centered on the local origin.
pub fn box_polygon(half_width: Real, half_height: Real) -> Polygon {
    let mut vertices = SmallVec::new();
    vertices.push(Vec2::new(-half_width, -half_height));
    vertices.push(Vec2::new(half_width, -half_height));
    vertices.push(Vec2::new(half_width, half_height));
    vertices.push(Vec2::new(-half_width, half_height));
    let mut normals = SmallVec::new();
    normals.push(Vec2::new(0.0, -1.0));
    normals.push(Vec2::new(1.0, 0.0));
    normals.push(Vec2::new(0.0, 1.0));
    normals.push(Vec2::new(-1.0, 0.0));
    Polygon {
        vertices,
        normals,
        centroid: Vec2::ZERO,
        radius: 0.0,
    }
}

/// Builds a convex polygon from an already-convex, CCW point set (via
/// `helpers::compute_hull` for arbitrary input).
pub fn polygon_from_points<I, P>(points: I, radius: Real) -> Option<Polygon>
where
    I: IntoIterator<Item = P>,
    P: Into<Vec2>,
{
    let pts: Vec<Vec2> = points.into_iter().map(Into::into).collect();
    if pts.len() < 3 {
        return None;
    }
    let hull = helpers::compute_hull(&pts)?;
    Some(helpers::make_polygon(&hull, radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_polygon_mass_matches_analytic() {
        let poly = box_polygon(1.0, 0.5);
        let md = compute_polygon_mass(&poly, 2.0);
        // area = 2*1*2*0.5 = 2; mass = density*area = 4
        assert!((md.mass - 4.0).abs() < 1e-4, "mass={}", md.mass);
        assert!(md.center.length() < 1e-5);
    }

    #[test]
    fn circle_mass_matches_analytic() {
        let c = circle(Vec2::ZERO, 2.0);
        let md = Shape::Circle(c).compute_mass(1.0);
        let expected = std::f32::consts::PI * 4.0;
        assert!((md.mass - expected).abs() < 1e-4);
    }

    #[test]
    fn segment_distance_proxy_has_two_vertices() {
        let s = segment(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let shape = Shape::Segment(s);
        let proxy = shape.distance_proxy(0);
        assert_eq!(proxy.vertices.len(), 2);
        assert_eq!(proxy.radius, 0.0);
    }
}
