//! Rigid bodies: definition, builder, internal per-body state, and the
//! RAII `Body<'w>` handle returned by `World::body_mut`.

use smallvec::SmallVec;

use crate::core::{Position, Sweep, Transform, Velocity};
use crate::types::{BodyId, Real, ShapeId, Vec2};
use crate::world::World;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BodyType {
    Static,
    Kinematic,
    Dynamic,
}

/// Definition used to create a body: plain data struct plus a fluent
/// builder.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: Real,
    pub linear_velocity: Vec2,
    pub angular_velocity: Real,
    pub linear_damping: Real,
    pub angular_damping: Real,
    pub gravity_scale: Real,
    pub enable_sleep: bool,
    pub awake: bool,
    pub bullet: bool,
    pub enabled: bool,
    pub fixed_rotation: bool,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            enable_sleep: true,
            awake: true,
            bullet: false,
            enabled: true,
            fixed_rotation: false,
        }
    }
}

impl BodyDef {
    pub fn builder() -> BodyBuilder {
        BodyBuilder::new()
    }
}

#[derive(Clone, Debug)]
pub struct BodyBuilder {
    def: BodyDef,
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self {
            def: BodyDef::default(),
        }
    }

    pub fn body_type(mut self, t: BodyType) -> Self {
        self.def.body_type = t;
        self
    }
    pub fn position<V: Into<Vec2>>(mut self, p: V) -> Self {
        self.def.position = p.into();
        self
    }
    pub fn angle(mut self, radians: Real) -> Self {
        self.def.angle = radians;
        self
    }
    pub fn linear_velocity<V: Into<Vec2>>(mut self, v: V) -> Self {
        self.def.linear_velocity = v.into();
        self
    }
    pub fn angular_velocity(mut self, v: Real) -> Self {
        self.def.angular_velocity = v;
        self
    }
    pub fn linear_damping(mut self, v: Real) -> Self {
        self.def.linear_damping = v;
        self
    }
    pub fn angular_damping(mut self, v: Real) -> Self {
        self.def.angular_damping = v;
        self
    }
    pub fn gravity_scale(mut self, v: Real) -> Self {
        self.def.gravity_scale = v;
        self
    }
    pub fn enable_sleep(mut self, flag: bool) -> Self {
        self.def.enable_sleep = flag;
        self
    }
    pub fn awake(mut self, flag: bool) -> Self {
        self.def.awake = flag;
        self
    }
    pub fn bullet(mut self, flag: bool) -> Self {
        self.def.bullet = flag;
        self
    }
    pub fn enabled(mut self, flag: bool) -> Self {
        self.def.enabled = flag;
        self
    }
    pub fn fixed_rotation(mut self, flag: bool) -> Self {
        self.def.fixed_rotation = flag;
        self
    }

    #[must_use]
    pub fn build(self) -> BodyDef {
        self.def
    }
}

/// Internal per-body state, owned by `World`'s body arena.
pub struct BodyData {
    pub body_type: BodyType,
    pub sweep: Sweep,
    pub transform: Transform,
    pub velocity: Velocity,
    pub linear_damping: Real,
    pub angular_damping: Real,
    pub gravity_scale: Real,
    pub mass: Real,
    pub inv_mass: Real,
    pub inertia: Real,
    pub inv_inertia: Real,
    pub force: Vec2,
    pub torque: Real,
    pub enable_sleep: bool,
    pub awake: bool,
    pub sleep_time: Real,
    pub bullet: bool,
    pub enabled: bool,
    pub fixed_rotation: bool,
    pub shapes: SmallVec<[ShapeId; 4]>,
    pub island_index: Option<u32>,
}

impl BodyData {
    pub fn from_def(def: &BodyDef) -> Self {
        let transform = Transform::from_pos_angle(def.position, def.angle);
        let sweep = Sweep {
            c0: def.position,
            a0: def.angle,
            c: def.position,
            a: def.angle,
            local_center: Vec2::ZERO,
            alpha0: 0.0,
        };
        let awake = if def.body_type == BodyType::Static {
            false
        } else {
            def.awake
        };
        Self {
            body_type: def.body_type,
            sweep,
            transform,
            velocity: Velocity {
                linear: def.linear_velocity,
                angular: def.angular_velocity,
            },
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            gravity_scale: def.gravity_scale,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            enable_sleep: def.enable_sleep,
            awake,
            sleep_time: 0.0,
            bullet: def.bullet,
            enabled: def.enabled,
            fixed_rotation: def.fixed_rotation,
            shapes: SmallVec::new(),
            island_index: None,
        }
    }

    /// Recomputes mass, inertia (about the center of mass), and the
    /// sweep's local center from the attached shapes' mass data, then
    /// resets the sweep's world center to match the new local center.
    pub fn reset_mass_data(&mut self, shape_mass: impl Iterator<Item = (Real, Vec2, Real)>) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;

        if self.body_type != BodyType::Dynamic {
            self.sweep.local_center = Vec2::ZERO;
            return;
        }

        let mut local_center = Vec2::ZERO;
        let mut total_mass = 0.0;
        let mut total_i = 0.0;

        for (mass, center, rotational_inertia) in shape_mass {
            total_mass += mass;
            local_center += center * mass;
            total_i += rotational_inertia;
        }

        if total_mass > 0.0 {
            self.mass = total_mass;
            self.inv_mass = 1.0 / total_mass;
            local_center *= self.inv_mass;
        } else {
            // Dynamic bodies with no shape mass still need unit mass so
            // the solver doesn't divide by zero.
            self.mass = 1.0;
            self.inv_mass = 1.0;
        }

        if total_i > 0.0 && !self.fixed_rotation {
            // Shift inertia from the origin to the center of mass.
            let i = total_i - self.mass * local_center.dot(local_center);
            debug_assert!(i > 0.0);
            self.inertia = i;
            self.inv_inertia = 1.0 / i;
        }

        let old_center = self.sweep.c;
        self.sweep.local_center = local_center;
        self.sweep.c = self.transform.transform_point(local_center);
        self.sweep.c0 = self.sweep.c;
        self.sweep.a0 = self.sweep.a;

        // Preserve velocity consistency at the new center of mass.
        let delta = self.sweep.c - old_center;
        self.velocity.linear += Vec2::cross_sv(self.velocity.angular, delta);
    }

    pub fn position(&self) -> Position {
        Position {
            center: self.sweep.c,
            angle: self.sweep.a,
        }
    }

    pub fn synchronize_transform(&mut self) {
        self.transform = self.sweep.get_transform(1.0);
    }
}

/// An RAII handle to a body, borrowing the world mutably for the
/// lifetime of the handle so every method can read or mutate body state
/// without re-looking up the id.
pub struct Body<'w> {
    pub(crate) world: &'w mut World,
    pub(crate) id: BodyId,
}

impl<'w> Body<'w> {
    pub(crate) fn new(world: &'w mut World, id: BodyId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn body_type(&self) -> BodyType {
        self.world.body_type(self.id)
    }

    pub fn position(&self) -> Vec2 {
        self.world.body_position(self.id)
    }

    pub fn angle(&self) -> Real {
        self.world.body_angle(self.id)
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.world.body_linear_velocity(self.id)
    }

    pub fn angular_velocity(&self) -> Real {
        self.world.body_angular_velocity(self.id)
    }

    pub fn set_linear_velocity<V: Into<Vec2>>(&mut self, v: V) {
        self.world.set_body_linear_velocity(self.id, v.into());
    }

    pub fn set_angular_velocity(&mut self, v: Real) {
        self.world.set_body_angular_velocity(self.id, v);
    }

    pub fn set_transform<V: Into<Vec2>>(&mut self, position: V, angle: Real) {
        self.world.set_body_transform(self.id, position.into(), angle);
    }

    pub fn apply_force_to_center<V: Into<Vec2>>(&mut self, force: V, wake: bool) {
        self.world.apply_force_to_center(self.id, force.into(), wake);
    }

    pub fn apply_force<V: Into<Vec2>>(&mut self, force: V, point: V, wake: bool) {
        self.world.apply_force(self.id, force.into(), point.into(), wake);
    }

    pub fn apply_torque(&mut self, torque: Real, wake: bool) {
        self.world.apply_torque(self.id, torque, wake);
    }

    pub fn apply_linear_impulse<V: Into<Vec2>>(&mut self, impulse: V, point: V, wake: bool) {
        self.world.apply_linear_impulse(self.id, impulse.into(), point.into(), wake);
    }

    pub fn apply_linear_impulse_to_center<V: Into<Vec2>>(&mut self, impulse: V, wake: bool) {
        self.world.apply_linear_impulse_to_center(self.id, impulse.into(), wake);
    }

    pub fn apply_angular_impulse(&mut self, impulse: Real, wake: bool) {
        self.world.apply_angular_impulse(self.id, impulse, wake);
    }

    pub fn is_awake(&self) -> bool {
        self.world.is_body_awake(self.id)
    }

    pub fn set_awake(&mut self, flag: bool) {
        self.world.set_body_awake(self.id, flag);
    }

    pub fn mass(&self) -> Real {
        self.world.body_mass(self.id)
    }

    pub fn create_shape(
        &mut self,
        shape: crate::shapes::Shape,
        def: &crate::shapes::ShapeDef,
    ) -> crate::error::PhysicsResult<crate::fixture::ShapeHandle<'_>> {
        self.world.create_shape(self.id, shape, def)
    }

    pub fn create_shape_id(
        &mut self,
        shape: crate::shapes::Shape,
        def: &crate::shapes::ShapeDef,
    ) -> crate::error::PhysicsResult<ShapeId> {
        self.world.create_shape_id(self.id, shape, def)
    }
}
