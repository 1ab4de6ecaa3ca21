//! Rotations, transforms, small matrices, and body sweeps.

use crate::types::{Real, Vec2};

/// A unit-length rotation, stored as cached `(cos, sin)` rather than an
/// angle so repeated rotations don't accumulate trig calls.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rot {
    pub c: Real,
    pub s: Real,
}

impl Rot {
    pub const IDENTITY: Self = Self { c: 1.0, s: 0.0 };

    #[inline]
    pub fn from_radians(rad: Real) -> Self {
        let (s, c) = rad.sin_cos();
        Self { c, s }
    }

    #[inline]
    pub fn from_degrees(deg: Real) -> Self {
        Self::from_radians(deg.to_radians())
    }

    #[inline]
    pub fn angle(self) -> Real {
        self.s.atan2(self.c)
    }

    #[inline]
    pub fn rotate_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    #[inline]
    pub fn inv_rotate_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Relative rotation: `q_b` expressed in the frame of `self`.
    #[inline]
    pub fn inv_mul(self, q: Rot) -> Rot {
        Rot {
            c: self.c * q.c + self.s * q.s,
            s: self.c * q.s - self.s * q.c,
        }
    }

    #[inline]
    pub fn mul(self, q: Rot) -> Rot {
        Rot {
            c: self.c * q.c - self.s * q.s,
            s: self.s * q.c + self.c * q.s,
        }
    }

    #[inline]
    pub fn normalized(self) -> Rot {
        let mag = (self.c * self.c + self.s * self.s).sqrt();
        let inv = if mag > 0.0 { 1.0 / mag } else { 0.0 };
        Rot {
            c: self.c * inv,
            s: self.s * inv,
        }
    }
}

/// A rigid transform: rotate then translate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub p: Vec2,
    pub q: Rot,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        p: Vec2::ZERO,
        q: Rot::IDENTITY,
    };

    #[inline]
    pub fn from_pos_angle<V: Into<Vec2>>(p: V, angle_radians: Real) -> Self {
        Self {
            p: p.into(),
            q: Rot::from_radians(angle_radians),
        }
    }

    #[inline]
    pub fn transform_point(self, v: Vec2) -> Vec2 {
        self.q.rotate_vec(v) + self.p
    }

    #[inline]
    pub fn inv_transform_point(self, v: Vec2) -> Vec2 {
        self.q.inv_rotate_vec(v - self.p)
    }

    /// Composes two transforms: apply `self` after `other`.
    #[inline]
    pub fn mul(self, other: Transform) -> Transform {
        Transform {
            q: self.q.mul(other.q),
            p: self.q.rotate_vec(other.p) + self.p,
        }
    }

    /// `inv(self) * other`, i.e. `other` expressed relative to `self`.
    #[inline]
    pub fn inv_mul(self, other: Transform) -> Transform {
        Transform {
            q: self.q.inv_mul(other.q),
            p: self.q.inv_rotate_vec(other.p - self.p),
        }
    }
}

pub fn world_to_local_point(xf: Transform, world: Vec2) -> Vec2 {
    xf.inv_transform_point(world)
}

pub fn world_axis_to_local_rot(xf: Transform, axis_world: Vec2) -> Rot {
    let local_axis = xf.q.inv_rotate_vec(axis_world).normalized();
    Rot {
        c: local_axis.x,
        s: local_axis.y,
    }
}

/// A 2x2 matrix, column-major (`ex`, `ey` are the columns).
#[derive(Copy, Clone, Debug, Default)]
pub struct Mat22 {
    pub ex: Vec2,
    pub ey: Vec2,
}

impl Mat22 {
    #[inline]
    pub fn new(ex: Vec2, ey: Vec2) -> Self {
        Self { ex, ey }
    }

    #[inline]
    pub fn mul_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.ex.x * v.x + self.ey.x * v.y,
            self.ex.y * v.x + self.ey.y * v.y,
        )
    }

    /// Inverts the matrix, returning a zero matrix if singular.
    #[inline]
    pub fn inverse(self) -> Mat22 {
        let a = self.ex.x;
        let b = self.ey.x;
        let c = self.ex.y;
        let d = self.ey.y;
        let mut det = a * d - b * c;
        if det != 0.0 {
            det = 1.0 / det;
        }
        Mat22 {
            ex: Vec2::new(det * d, -det * c),
            ey: Vec2::new(-det * b, det * a),
        }
    }

    #[inline]
    pub fn solve(self, b: Vec2) -> Vec2 {
        self.inverse().mul_vec(b)
    }
}

/// Position: a center-of-mass position plus an orientation angle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    pub center: Vec2,
    pub angle: Real,
}

/// Velocity: linear + angular.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec2,
    pub angular: Real,
}

/// Per-body motion record used by the TOI pipeline.
///
/// Invariant: `0 <= alpha0 < 1`.
#[derive(Copy, Clone, Debug)]
pub struct Sweep {
    /// Position at time `alpha0` of the current step.
    pub c0: Vec2,
    pub a0: Real,
    /// Target position at time 1 of the current step.
    pub c: Vec2,
    pub a: Real,
    /// Local center of mass, used to recover the body transform.
    pub local_center: Vec2,
    pub alpha0: Real,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            c0: Vec2::ZERO,
            a0: 0.0,
            c: Vec2::ZERO,
            a: 0.0,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        }
    }
}

impl Sweep {
    /// Interpolates the sweep to the fraction `beta` of the step, i.e.
    /// `alpha0 + beta * (1 - alpha0)`.
    pub fn get_transform(&self, beta: Real) -> Transform {
        let c = self.c0 * (1.0 - beta) + self.c * beta;
        let a = self.a0 * (1.0 - beta) + self.a * beta;
        let q = Rot::from_radians(a);
        // `c` is the world center of mass; recover the body origin.
        let p = c - q.rotate_vec(self.local_center);
        Transform { p, q }
    }

    /// Advances `alpha0` forward to `alpha`, holding the later pose fixed.
    pub fn advance(&mut self, alpha: Real) {
        debug_assert!(self.alpha0 < 1.0);
        let beta = (alpha - self.alpha0) / (1.0 - self.alpha0);
        self.c0 = self.c0 * (1.0 - beta) + self.c * beta;
        self.a0 = self.a0 * (1.0 - beta) + self.a * beta;
        self.alpha0 = alpha;
    }

    pub fn normalize(&mut self) {
        let two_pi = std::f32::consts::TAU;
        let d = two_pi * (self.a0 / two_pi).floor();
        self.a0 -= d;
        self.a -= d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rot_round_trip() {
        let r = Rot::from_radians(0.73);
        let v = Vec2::new(1.5, -2.25);
        let rotated = r.rotate_vec(v);
        let back = r.inv_rotate_vec(rotated);
        assert!((back.x - v.x).abs() < 1e-5);
        assert!((back.y - v.y).abs() < 1e-5);
    }

    #[test]
    fn transform_round_trip() {
        let xf = Transform::from_pos_angle(Vec2::new(3.0, 4.0), 0.4);
        let v = Vec2::new(-1.0, 2.0);
        let world = xf.transform_point(v);
        let local = xf.inv_transform_point(world);
        assert!((local.x - v.x).abs() < 1e-5);
        assert!((local.y - v.y).abs() < 1e-5);
    }

    #[test]
    fn mat22_solve_identity() {
        let m = Mat22::new(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        let v = Vec2::new(5.0, -3.0);
        let solved = m.solve(v);
        assert!((solved.x - v.x).abs() < 1e-6);
        assert!((solved.y - v.y).abs() < 1e-6);
    }

    #[test]
    fn sweep_get_transform_interpolates() {
        let mut sweep = Sweep {
            c0: Vec2::new(0.0, 0.0),
            a0: 0.0,
            c: Vec2::new(2.0, 0.0),
            a: 0.0,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        };
        let mid = sweep.get_transform(0.5);
        assert!((mid.p.x - 1.0).abs() < 1e-6);
        sweep.advance(0.5);
        assert!((sweep.c0.x - 1.0).abs() < 1e-6);
        assert_eq!(sweep.alpha0, 0.5);
    }
}
