//! Fixtures: a shape instance bound to a body, with its broad-phase
//! proxy id(s), filter, and material.

use smallvec::SmallVec;

use crate::collision::Aabb;
use crate::filter::Filter;
use crate::shapes::{Shape, ShapeDef, SurfaceMaterial};
use crate::types::{BodyId, Real, ShapeId};
use crate::world::World;

/// Internal per-fixture state, owned by `World`'s shape arena.
pub struct FixtureData {
    pub body: BodyId,
    pub shape: Shape,
    pub material: SurfaceMaterial,
    pub density: Real,
    pub filter: Filter,
    pub is_sensor: bool,
    pub enable_sensor_events: bool,
    pub enable_contact_events: bool,
    pub enable_pre_solve_events: bool,
    pub enable_custom_filtering: bool,
    /// One broad-phase proxy id per shape child (a chain-expanded fixture
    /// has more than one; everything else has exactly one).
    pub proxies: SmallVec<[i32; 1]>,
    pub aabb: Aabb,
}

impl FixtureData {
    pub fn new(body: BodyId, shape: Shape, def: &ShapeDef) -> Self {
        Self {
            body,
            shape,
            material: def.material,
            density: def.density,
            filter: def.filter,
            is_sensor: def.is_sensor,
            enable_sensor_events: def.enable_sensor_events,
            enable_contact_events: def.enable_contact_events,
            enable_pre_solve_events: def.enable_pre_solve_events,
            enable_custom_filtering: def.enable_custom_filtering,
            proxies: SmallVec::new(),
            aabb: Aabb::EMPTY,
        }
    }
}

/// An RAII handle to a fixture, borrowing the world mutably.
pub struct ShapeHandle<'w> {
    pub(crate) world: &'w mut World,
    pub(crate) id: ShapeId,
}

impl<'w> ShapeHandle<'w> {
    pub(crate) fn new(world: &'w mut World, id: ShapeId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn body(&self) -> BodyId {
        self.world.shape_body(self.id)
    }

    pub fn is_sensor(&self) -> bool {
        self.world.shape_is_sensor(self.id)
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.world.set_shape_filter(self.id, filter);
    }

    pub fn set_density(&mut self, density: Real, update_body_mass: bool) {
        self.world.set_shape_density(self.id, density, update_body_mass);
    }

    pub fn set_friction(&mut self, friction: Real) {
        self.world.set_shape_friction(self.id, friction);
    }

    pub fn set_restitution(&mut self, restitution: Real) {
        self.world.set_shape_restitution(self.id, restitution);
    }
}
