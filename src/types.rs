//! Core scalar, vector, and handle types.

use slotmap::new_key_type;

/// The single configurable real-number type used throughout the crate.
///
/// Kept as a bare `f32` alias rather than a dimensioned/unit-checked
/// wrapper (see DESIGN.md, Open Questions), matching ordinary `f32` math
/// used by every 2D physics example in the reference corpus.
pub type Real = f32;

/// A simple 2D vector.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: Real,
    pub y: Real,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, o: Vec2) -> Real {
        self.x * o.x + self.y * o.y
    }

    /// 2D "cross product": scalar z-component of `self x o`.
    #[inline]
    pub fn cross(self, o: Vec2) -> Real {
        self.x * o.y - self.y * o.x
    }

    /// Cross of a scalar (angular velocity) with a vector: `s x v`.
    #[inline]
    pub fn cross_sv(s: Real, v: Vec2) -> Vec2 {
        Vec2::new(-s * v.y, s * v.x)
    }

    #[inline]
    pub fn length(self) -> Real {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn length_squared(self) -> Real {
        self.dot(self)
    }

    #[inline]
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len < Real::EPSILON {
            Vec2::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Left (counter-clockwise) perpendicular: rotate +90 degrees.
    #[inline]
    pub fn left_perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Right (clockwise) perpendicular: rotate -90 degrees. This is the
    /// convention used for "forward perpendicular" face normals in the
    /// narrow phase (`GetFwdPerpendicular` in the original source).
    #[inline]
    pub fn right_perp(self) -> Vec2 {
        Vec2::new(self.y, -self.x)
    }

    #[inline]
    pub fn min(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x.min(o.x), self.y.min(o.y))
    }

    #[inline]
    pub fn max(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x.max(o.x), self.y.max(o.y))
    }

    #[inline]
    pub fn abs(self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}
impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}
impl std::ops::Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}
impl std::ops::Mul<Real> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, s: Real) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}
impl std::ops::AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}
impl std::ops::SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, o: Vec2) {
        self.x -= o.x;
        self.y -= o.y;
    }
}
impl std::ops::MulAssign<Real> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, s: Real) {
        self.x *= s;
        self.y *= s;
    }
}

impl From<[Real; 2]> for Vec2 {
    #[inline]
    fn from(a: [Real; 2]) -> Self {
        Self { x: a[0], y: a[1] }
    }
}
impl From<(Real, Real)> for Vec2 {
    #[inline]
    fn from(t: (Real, Real)) -> Self {
        Self { x: t.0, y: t.1 }
    }
}
impl From<mint::Vector2<Real>> for Vec2 {
    #[inline]
    fn from(v: mint::Vector2<Real>) -> Self {
        Self { x: v.x, y: v.y }
    }
}
impl From<Vec2> for mint::Vector2<Real> {
    #[inline]
    fn from(v: Vec2) -> Self {
        mint::Vector2 { x: v.x, y: v.y }
    }
}

#[cfg(feature = "cgmath")]
impl From<cgmath::Vector2<Real>> for Vec2 {
    #[inline]
    fn from(v: cgmath::Vector2<Real>) -> Self {
        Self { x: v.x, y: v.y }
    }
}
#[cfg(feature = "cgmath")]
impl From<Vec2> for cgmath::Vector2<Real> {
    #[inline]
    fn from(v: Vec2) -> Self {
        cgmath::Vector2 { x: v.x, y: v.y }
    }
}
#[cfg(feature = "nalgebra")]
impl From<nalgebra::Vector2<Real>> for Vec2 {
    #[inline]
    fn from(v: nalgebra::Vector2<Real>) -> Self {
        Self { x: v.x, y: v.y }
    }
}
#[cfg(feature = "nalgebra")]
impl From<Vec2> for nalgebra::Vector2<Real> {
    #[inline]
    fn from(v: Vec2) -> Self {
        nalgebra::Vector2::new(v.x, v.y)
    }
}
#[cfg(feature = "glam")]
impl From<glam::Vec2> for Vec2 {
    #[inline]
    fn from(v: glam::Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}
#[cfg(feature = "glam")]
impl From<Vec2> for glam::Vec2 {
    #[inline]
    fn from(v: Vec2) -> Self {
        glam::Vec2::new(v.x, v.y)
    }
}

new_key_type! {
    /// Stable handle to a body, valid for the body's lifetime in a `World`.
    pub struct BodyId;
    /// Stable handle to a fixture (shape instance bound to a body).
    pub struct ShapeId;
    /// Stable handle to a joint.
    pub struct JointId;
    /// Stable handle to a contact (edge between two specific fixtures).
    pub struct ContactId;
}
