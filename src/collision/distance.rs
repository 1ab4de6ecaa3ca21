//! GJK closest-point/distance query between two convex proxies, with a
//! simplex cache for warm-starting across steps (following Box2D's
//! `b2Distance` / `b2SimplexCache`).

use smallvec::SmallVec;

use crate::core::Transform;
use crate::shapes::DistanceProxy;
use crate::types::{Real, Vec2};

/// Warm-start hint: the simplex vertex indices used on the previous call.
#[derive(Clone, Debug, Default)]
pub struct SimplexCache {
    pub count: u8,
    pub index_a: [u8; 3],
    pub index_b: [u8; 3],
    pub metric: Real,
}

pub struct DistanceInput<'a> {
    pub proxy_a: &'a DistanceProxy,
    pub proxy_b: &'a DistanceProxy,
    pub transform_a: Transform,
    pub transform_b: Transform,
    pub use_radii: bool,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceOutput {
    pub point_a: Vec2,
    pub point_b: Vec2,
    pub distance: Real,
    pub iterations: u32,
}

#[derive(Copy, Clone, Debug)]
struct SimplexVertex {
    w_a: Vec2,
    w_b: Vec2,
    w: Vec2,
    a: Real,
    index_a: u8,
    index_b: u8,
}

struct Simplex {
    vertices: SmallVec<[SimplexVertex; 3]>,
}

impl Simplex {
    fn from_cache(cache: &SimplexCache, proxy_a: &DistanceProxy, xf_a: Transform, proxy_b: &DistanceProxy, xf_b: Transform) -> Self {
        let mut vertices = SmallVec::new();
        let count = cache.count as usize;
        if count == 0 {
            let ia = 0u8;
            let ib = 0u8;
            let w_a = xf_a.transform_point(proxy_a.vertices[ia as usize]);
            let w_b = xf_b.transform_point(proxy_b.vertices[ib as usize]);
            vertices.push(SimplexVertex {
                w_a,
                w_b,
                w: w_b - w_a,
                a: 1.0,
                index_a: ia,
                index_b: ib,
            });
        } else {
            for i in 0..count {
                let ia = cache.index_a[i];
                let ib = cache.index_b[i];
                let w_a = xf_a.transform_point(proxy_a.vertices[ia as usize]);
                let w_b = xf_b.transform_point(proxy_b.vertices[ib as usize]);
                vertices.push(SimplexVertex {
                    w_a,
                    w_b,
                    w: w_b - w_a,
                    a: 0.0,
                    index_a: ia,
                    index_b: ib,
                });
            }
        }
        Simplex { vertices }
    }

    fn to_cache(&self, cache: &mut SimplexCache) {
        cache.count = self.vertices.len() as u8;
        for (i, v) in self.vertices.iter().enumerate() {
            cache.index_a[i] = v.index_a;
            cache.index_b[i] = v.index_b;
        }
    }

    fn search_direction(&self) -> Vec2 {
        match self.vertices.len() {
            1 => -self.vertices[0].w,
            2 => {
                let e = self.vertices[1].w - self.vertices[0].w;
                let sgn = e.cross(-self.vertices[0].w);
                if sgn > 0.0 {
                    e.left_perp()
                } else {
                    e.right_perp()
                }
            }
            _ => Vec2::ZERO,
        }
    }

    fn witness_points(&self) -> (Vec2, Vec2) {
        match self.vertices.len() {
            1 => (self.vertices[0].w_a, self.vertices[0].w_b),
            2 => {
                let a = self.vertices[0].w_a * self.vertices[0].a + self.vertices[1].w_a * self.vertices[1].a;
                let b = self.vertices[0].w_b * self.vertices[0].a + self.vertices[1].w_b * self.vertices[1].a;
                (a, b)
            }
            3 => {
                let a = self.vertices[0].w_a * self.vertices[0].a
                    + self.vertices[1].w_a * self.vertices[1].a
                    + self.vertices[2].w_a * self.vertices[2].a;
                (a, a)
            }
            _ => unreachable!(),
        }
    }

    fn solve2(&mut self) {
        let w1 = self.vertices[0].w;
        let w2 = self.vertices[1].w;
        let e12 = w2 - w1;

        let d12_2 = -w1.dot(e12);
        if d12_2 <= 0.0 {
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
            return;
        }

        let d12_1 = w2.dot(e12);
        if d12_1 <= 0.0 {
            self.vertices[0] = self.vertices[1];
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
            return;
        }

        let inv_d12 = 1.0 / (d12_1 + d12_2);
        self.vertices[0].a = d12_1 * inv_d12;
        self.vertices[1].a = d12_2 * inv_d12;
    }

    fn solve3(&mut self) {
        let w1 = self.vertices[0].w;
        let w2 = self.vertices[1].w;
        let w3 = self.vertices[2].w;

        let e12 = w2 - w1;
        let w1e12 = w1.dot(e12);
        let w2e12 = w2.dot(e12);
        let d12_1 = w2e12;
        let d12_2 = -w1e12;

        let e13 = w3 - w1;
        let w1e13 = w1.dot(e13);
        let w3e13 = w3.dot(e13);
        let d13_1 = w3e13;
        let d13_2 = -w1e13;

        let e23 = w3 - w2;
        let w2e23 = w2.dot(e23);
        let w3e23 = w3.dot(e23);
        let d23_1 = w3e23;
        let d23_2 = -w2e23;

        let n123 = e12.cross(e13);
        let d123_1 = n123 * w2.cross(w3);
        let d123_2 = n123 * w3.cross(w1);
        let d123_3 = n123 * w1.cross(w2);

        if d12_2 <= 0.0 && d13_2 <= 0.0 {
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
            return;
        }

        if d12_1 > 0.0 && d12_2 > 0.0 && d123_3 <= 0.0 {
            let inv = 1.0 / (d12_1 + d12_2);
            self.vertices[0].a = d12_1 * inv;
            self.vertices[1].a = d12_2 * inv;
            self.vertices.truncate(2);
            return;
        }

        if d13_1 > 0.0 && d13_2 > 0.0 && d123_2 <= 0.0 {
            let inv = 1.0 / (d13_1 + d13_2);
            self.vertices[0].a = d13_1 * inv;
            self.vertices[2].a = d13_2 * inv;
            self.vertices[1] = self.vertices[2];
            self.vertices.truncate(2);
            return;
        }

        if d12_1 <= 0.0 && d23_2 <= 0.0 {
            self.vertices[0] = self.vertices[1];
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
            return;
        }

        if d13_1 <= 0.0 && d23_1 <= 0.0 {
            self.vertices[0] = self.vertices[2];
            self.vertices[0].a = 1.0;
            self.vertices.truncate(1);
            return;
        }

        if d23_1 > 0.0 && d23_2 > 0.0 && d123_1 <= 0.0 {
            let inv = 1.0 / (d23_1 + d23_2);
            self.vertices[1].a = d23_1 * inv;
            self.vertices[2].a = d23_2 * inv;
            self.vertices[0] = self.vertices[2];
            self.vertices.truncate(2);
            return;
        }

        let inv = 1.0 / (d123_1 + d123_2 + d123_3);
        self.vertices[0].a = d123_1 * inv;
        self.vertices[1].a = d123_2 * inv;
        self.vertices[2].a = d123_3 * inv;
    }

    fn solve(&mut self) {
        match self.vertices.len() {
            1 => {}
            2 => self.solve2(),
            3 => self.solve3(),
            _ => unreachable!(),
        }
    }
}

/// GJK distance between two convex proxies. If `use_radii` is set, the
/// result is the distance between the core shapes less their vertex
/// radii (clamped to zero on overlap).
pub fn distance(input: &DistanceInput, cache: &mut SimplexCache, max_iters: u32) -> DistanceOutput {
    let proxy_a = input.proxy_a;
    let proxy_b = input.proxy_b;
    let xf_a = input.transform_a;
    let xf_b = input.transform_b;

    let mut simplex = Simplex::from_cache(cache, proxy_a, xf_a, proxy_b, xf_b);

    let mut save_a = [0u8; 3];
    let mut save_b = [0u8; 3];
    let mut iterations = 0u32;

    loop {
        let save_count = simplex.vertices.len();
        for i in 0..save_count {
            save_a[i] = simplex.vertices[i].index_a;
            save_b[i] = simplex.vertices[i].index_b;
        }

        simplex.solve();

        if simplex.vertices.len() == 3 {
            break;
        }

        let d = simplex.search_direction();
        if d.length_squared() < Real::EPSILON * Real::EPSILON {
            break;
        }

        let index_a = proxy_a.support(xf_a.q.inv_rotate_vec(-d));
        let index_b = proxy_b.support(xf_b.q.inv_rotate_vec(d));

        iterations += 1;
        if iterations > max_iters {
            break;
        }

        let duplicate = (0..save_count).any(|i| save_a[i] == index_a as u8 && save_b[i] == index_b as u8);
        if duplicate {
            break;
        }

        let w_a = xf_a.transform_point(proxy_a.vertices[index_a]);
        let w_b = xf_b.transform_point(proxy_b.vertices[index_b]);
        simplex.vertices.push(SimplexVertex {
            w_a,
            w_b,
            w: w_b - w_a,
            a: 0.0,
            index_a: index_a as u8,
            index_b: index_b as u8,
        });
    }

    let (mut point_a, mut point_b) = simplex.witness_points();
    let mut dist = (point_a - point_b).length();
    simplex.to_cache(cache);

    if input.use_radii {
        if dist < Real::EPSILON {
            let p = (point_a + point_b) * 0.5;
            point_a = p;
            point_b = p;
            dist = 0.0;
        } else {
            let normal = (point_b - point_a).normalized();
            point_a += normal * proxy_a.radius;
            point_b -= normal * proxy_b.radius;
            dist = (dist - proxy_a.radius - proxy_b.radius).max(0.0);
        }
    }

    DistanceOutput {
        point_a,
        point_b,
        distance: dist,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::DistanceProxy;

    #[test]
    fn distance_between_separated_circles() {
        let a = DistanceProxy::single(Vec2::ZERO, 0.5);
        let b = DistanceProxy::single(Vec2::ZERO, 0.5);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::from_pos_angle(Vec2::new(5.0, 0.0), 0.0);

        let input = DistanceInput {
            proxy_a: &a,
            proxy_b: &b,
            transform_a: xf_a,
            transform_b: xf_b,
            use_radii: true,
        };
        let mut cache = SimplexCache::default();
        let out = distance(&input, &mut cache, 20);
        assert!((out.distance - 4.0).abs() < 1e-3, "distance={}", out.distance);
    }

    #[test]
    fn overlapping_circles_have_zero_clamped_distance() {
        let a = DistanceProxy::single(Vec2::ZERO, 1.0);
        let b = DistanceProxy::single(Vec2::ZERO, 1.0);
        let xf_a = Transform::IDENTITY;
        let xf_b = Transform::from_pos_angle(Vec2::new(0.5, 0.0), 0.0);
        let input = DistanceInput {
            proxy_a: &a,
            proxy_b: &b,
            transform_a: xf_a,
            transform_b: xf_b,
            use_radii: true,
        };
        let mut cache = SimplexCache::default();
        let out = distance(&input, &mut cache, 20);
        assert_eq!(out.distance, 0.0);
    }
}
