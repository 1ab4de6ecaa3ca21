//! Time-of-impact root finding for continuous collision, following
//! Box2D's `b2TimeOfImpact`: a conservative-advancement search that
//! alternates GJK distance queries with a bisection/secant root find on
//! a per-pair separation function.

use crate::core::Sweep;
use crate::shapes::DistanceProxy;
use crate::types::{Real, Vec2};

use super::distance::{distance, DistanceInput, SimplexCache};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToiState {
    Unknown,
    Failed,
    Overlapped,
    Hit,
    Separated,
}

pub struct ToiInput<'a> {
    pub proxy_a: &'a DistanceProxy,
    pub proxy_b: &'a DistanceProxy,
    pub sweep_a: Sweep,
    pub sweep_b: Sweep,
    /// Stop searching once the proxies are within this target separation
    /// (a small positive margin, not exact touching).
    pub target: Real,
    pub tolerance: Real,
}

#[derive(Copy, Clone, Debug)]
pub struct ToiOutput {
    pub state: ToiState,
    pub t: Real,
}

enum SeparationKind {
    Points,
    FaceA,
    FaceB,
}

struct SeparationFunction<'a> {
    proxy_a: &'a DistanceProxy,
    proxy_b: &'a DistanceProxy,
    sweep_a: Sweep,
    sweep_b: Sweep,
    local_point: Vec2,
    axis: Vec2,
    kind: SeparationKind,
    index_a: usize,
    index_b: usize,
}

impl<'a> SeparationFunction<'a> {
    fn new(
        cache: &SimplexCache,
        proxy_a: &'a DistanceProxy,
        sweep_a: Sweep,
        proxy_b: &'a DistanceProxy,
        sweep_b: Sweep,
        t1: Real,
    ) -> Self {
        let xf_a = sweep_a.get_transform(t1);
        let xf_b = sweep_b.get_transform(t1);

        let count = cache.count as usize;
        debug_assert!(count > 0 && count < 3);

        if count == 1 {
            let index_a = cache.index_a[0] as usize;
            let index_b = cache.index_b[0] as usize;
            let local_point_a = proxy_a.vertices[index_a];
            let local_point_b = proxy_b.vertices[index_b];
            let point_a = xf_a.transform_point(local_point_a);
            let point_b = xf_b.transform_point(local_point_b);
            let axis = (point_b - point_a).normalized();
            Self {
                proxy_a,
                proxy_b,
                sweep_a,
                sweep_b,
                local_point: Vec2::ZERO,
                axis,
                kind: SeparationKind::Points,
                index_a,
                index_b,
            }
        } else if cache.index_a[0] == cache.index_a[1] {
            // Two points on B map to the same point on A: A provides the face.
            let i1b = cache.index_b[0] as usize;
            let i2b = cache.index_b[1] as usize;
            let local_point_b1 = proxy_b.vertices[i1b];
            let local_point_b2 = proxy_b.vertices[i2b];
            let mut axis = (local_point_b2 - local_point_b1).right_perp().normalized();
            let local_point = (local_point_b1 + local_point_b2) * 0.5;

            let normal = xf_b.q.rotate_vec(axis);
            let index_a = cache.index_a[0] as usize;
            let point_a = xf_a.transform_point(proxy_a.vertices[index_a]);
            let point_b = xf_b.transform_point(local_point);
            if (point_a - point_b).dot(normal) < 0.0 {
                axis = -axis;
            }

            Self {
                proxy_a,
                proxy_b,
                sweep_a,
                sweep_b,
                local_point,
                axis,
                kind: SeparationKind::FaceB,
                index_a,
                index_b: i1b,
            }
        } else {
            let i1a = cache.index_a[0] as usize;
            let i2a = cache.index_a[1] as usize;
            let local_point_a1 = proxy_a.vertices[i1a];
            let local_point_a2 = proxy_a.vertices[i2a];
            let mut axis = (local_point_a2 - local_point_a1).right_perp().normalized();
            let local_point = (local_point_a1 + local_point_a2) * 0.5;

            let normal = xf_a.q.rotate_vec(axis);
            let index_b = cache.index_b[0] as usize;
            let point_b = xf_b.transform_point(proxy_b.vertices[index_b]);
            let point_a = xf_a.transform_point(local_point);
            if (point_b - point_a).dot(normal) < 0.0 {
                axis = -axis;
            }

            Self {
                proxy_a,
                proxy_b,
                sweep_a,
                sweep_b,
                local_point,
                axis,
                kind: SeparationKind::FaceA,
                index_a: i1a,
                index_b,
            }
        }
    }

    fn find_min_separation(&self, t: Real) -> (Real, usize, usize) {
        let xf_a = self.sweep_a.get_transform(t);
        let xf_b = self.sweep_b.get_transform(t);

        match self.kind {
            SeparationKind::Points => {
                let axis_a = xf_a.q.inv_rotate_vec(self.axis);
                let axis_b = xf_b.q.inv_rotate_vec(-self.axis);
                let index_a = self.proxy_a.support(axis_a);
                let index_b = self.proxy_b.support(axis_b);
                let point_a = xf_a.transform_point(self.proxy_a.vertices[index_a]);
                let point_b = xf_b.transform_point(self.proxy_b.vertices[index_b]);
                ((point_b - point_a).dot(self.axis), index_a, index_b)
            }
            SeparationKind::FaceA => {
                let normal = xf_a.q.rotate_vec(self.axis);
                let point_a = xf_a.transform_point(self.local_point);
                let axis_b = xf_b.q.inv_rotate_vec(-normal);
                let index_b = self.proxy_b.support(axis_b);
                let point_b = xf_b.transform_point(self.proxy_b.vertices[index_b]);
                ((point_b - point_a).dot(normal), self.index_a, index_b)
            }
            SeparationKind::FaceB => {
                let normal = xf_b.q.rotate_vec(self.axis);
                let point_b = xf_b.transform_point(self.local_point);
                let axis_a = xf_a.q.inv_rotate_vec(-normal);
                let index_a = self.proxy_a.support(axis_a);
                let point_a = xf_a.transform_point(self.proxy_a.vertices[index_a]);
                ((point_a - point_b).dot(normal), index_a, self.index_b)
            }
        }
    }

    fn evaluate(&self, index_a: usize, index_b: usize, t: Real) -> Real {
        let xf_a = self.sweep_a.get_transform(t);
        let xf_b = self.sweep_b.get_transform(t);

        match self.kind {
            SeparationKind::Points => {
                let point_a = xf_a.transform_point(self.proxy_a.vertices[index_a]);
                let point_b = xf_b.transform_point(self.proxy_b.vertices[index_b]);
                (point_b - point_a).dot(self.axis)
            }
            SeparationKind::FaceA => {
                let normal = xf_a.q.rotate_vec(self.axis);
                let point_a = xf_a.transform_point(self.local_point);
                let point_b = xf_b.transform_point(self.proxy_b.vertices[index_b]);
                (point_b - point_a).dot(normal)
            }
            SeparationKind::FaceB => {
                let normal = xf_b.q.rotate_vec(self.axis);
                let point_b = xf_b.transform_point(self.local_point);
                let point_a = xf_a.transform_point(self.proxy_a.vertices[index_a]);
                (point_a - point_b).dot(normal)
            }
        }
    }
}

/// Finds the first time in `[0, 1]` at which the two swept proxies come
/// within `target` of each other, or reports that they start overlapped,
/// never touch, or that the search failed to converge.
pub fn time_of_impact(input: &ToiInput, max_root_iters: u32, max_iters: u32) -> ToiOutput {
    let mut output = ToiOutput {
        state: ToiState::Unknown,
        t: input.sweep_a.alpha0.max(input.sweep_b.alpha0).max(0.0),
    };
    let t_max = 1.0;

    let mut sweep_a = input.sweep_a;
    let mut sweep_b = input.sweep_b;
    sweep_a.normalize();
    sweep_b.normalize();

    let total_radius = input.proxy_a.radius + input.proxy_b.radius;
    let target = (input.target).max(total_radius - input.tolerance.max(0.0));
    let tolerance = 0.25 * input.tolerance;

    let mut t1 = output.t;
    let mut cache = SimplexCache::default();

    for _ in 0..max_iters {
        let xf_a = sweep_a.get_transform(t1);
        let xf_b = sweep_b.get_transform(t1);

        let dist_input = DistanceInput {
            proxy_a: input.proxy_a,
            proxy_b: input.proxy_b,
            transform_a: xf_a,
            transform_b: xf_b,
            use_radii: false,
        };
        let dist_out = distance(&dist_input, &mut cache, 20);

        if dist_out.distance <= 0.0 {
            output.state = ToiState::Overlapped;
            output.t = 0.0;
            break;
        }

        if dist_out.distance < target + tolerance {
            output.state = ToiState::Hit;
            output.t = t1;
            break;
        }

        let fcn = SeparationFunction::new(&cache, input.proxy_a, sweep_a, input.proxy_b, sweep_b, t1);

        let mut done = false;
        let mut t2 = t_max;
        let mut root_iter = 0;
        let (mut s2, index_a, index_b) = fcn.find_min_separation(t2);
        if s2 > target + tolerance {
            output.state = ToiState::Separated;
            output.t = t_max;
            done = true;
        } else if s2 <= target - tolerance {
            // Already touching at t2, advance t1 there and keep iterating.
        } else {
            let mut s1 = fcn.evaluate(index_a, index_b, t1);
            let mut a1 = t1;
            let mut a2 = t2;
            loop {
                let t = if root_iter & 1 == 1 {
                    a1 + (target - s1) * (a2 - a1) / (s2 - s1)
                } else {
                    0.5 * (a1 + a2)
                };
                root_iter += 1;

                let s = fcn.evaluate(index_a, index_b, t);
                if (s - target).abs() < tolerance {
                    t2 = t;
                    break;
                }
                if s > target {
                    a1 = t;
                    s1 = s;
                } else {
                    a2 = t;
                    s2 = s;
                }
                if root_iter == max_root_iters {
                    t2 = t;
                    break;
                }
            }
        }

        if done {
            break;
        }

        t1 = t2;
        if t1 >= t_max {
            output.state = ToiState::Separated;
            output.t = t_max;
            break;
        }
    }

    if output.state == ToiState::Unknown {
        output.state = ToiState::Failed;
        output.t = t1;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Sweep, Transform};

    #[test]
    fn approaching_circles_report_hit() {
        let proxy_a = DistanceProxy::single(Vec2::ZERO, 0.5);
        let proxy_b = DistanceProxy::single(Vec2::ZERO, 0.5);

        let sweep_a = Sweep {
            c0: Vec2::new(0.0, 0.0),
            a0: 0.0,
            c: Vec2::new(0.0, 0.0),
            a: 0.0,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        };
        let sweep_b = Sweep {
            c0: Vec2::new(10.0, 0.0),
            a0: 0.0,
            c: Vec2::new(0.0, 0.0),
            a: 0.0,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        };

        let input = ToiInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            sweep_a,
            sweep_b,
            target: 0.01,
            tolerance: 0.001,
        };
        let out = time_of_impact(&input, 50, 50);
        assert_eq!(out.state, ToiState::Hit);
        assert!(out.t > 0.0 && out.t < 1.0, "t={}", out.t);
        let _ = Transform::IDENTITY;
    }

    #[test]
    fn never_touching_circles_report_separated() {
        let proxy_a = DistanceProxy::single(Vec2::ZERO, 0.5);
        let proxy_b = DistanceProxy::single(Vec2::ZERO, 0.5);

        let sweep_a = Sweep {
            c0: Vec2::new(0.0, 0.0),
            a0: 0.0,
            c: Vec2::new(0.0, 1.0),
            a: 0.0,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        };
        let sweep_b = Sweep {
            c0: Vec2::new(10.0, 0.0),
            a0: 0.0,
            c: Vec2::new(10.0, 1.0),
            a: 0.0,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        };

        let input = ToiInput {
            proxy_a: &proxy_a,
            proxy_b: &proxy_b,
            sweep_a,
            sweep_b,
            target: 0.01,
            tolerance: 0.001,
        };
        let out = time_of_impact(&input, 50, 50);
        assert_eq!(out.state, ToiState::Separated);
    }
}
