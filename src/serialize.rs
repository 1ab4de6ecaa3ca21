//! Config and body-definition snapshotting, gated behind the `serialize`
//! feature. Reduced from a full scene graph: shapes and joints are not
//! captured, only what reproduces a world's tuning and its bodies'
//! current definitions.

#![cfg(feature = "serialize")]

use serde::{Deserialize, Serialize};

use crate::body::{BodyData, BodyDef};
use crate::tuning::WorldConfig;
use crate::types::BodyId;
use crate::world::World;

fn body_def_from_data(b: &BodyData) -> BodyDef {
    BodyDef {
        body_type: b.body_type,
        position: b.sweep.c,
        angle: b.sweep.a,
        linear_velocity: b.velocity.linear,
        angular_velocity: b.velocity.angular,
        linear_damping: b.linear_damping,
        angular_damping: b.angular_damping,
        gravity_scale: b.gravity_scale,
        enable_sleep: b.enable_sleep,
        awake: b.awake,
        bullet: b.bullet,
        enabled: b.enabled,
        fixed_rotation: b.fixed_rotation,
    }
}

/// A restorable snapshot of a world's tuning config and its bodies'
/// current definitions (not their shapes, contacts, or joints).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub config: WorldConfig,
    pub bodies: Vec<(BodyId, BodyDef)>,
}

impl WorldSnapshot {
    /// Captures `world`'s tuning config and every live body's current
    /// definition.
    pub fn take(world: &World) -> Self {
        Self {
            config: *world.config(),
            bodies: world.bodies().iter().map(|(id, b)| (id, body_def_from_data(b))).collect(),
        }
    }

    /// Applies this snapshot's config to `world` and resets every body
    /// it still has a matching id for back to its captured definition.
    /// Bodies created after the snapshot was taken, or removed since,
    /// are left untouched.
    pub fn apply(&self, world: &mut World) {
        world.set_gravity(self.config.gravity);
        for (id, def) in &self.bodies {
            if world.bodies().contains_key(*id) {
                world.set_body_transform(*id, def.position, def.angle);
                world.set_body_linear_velocity(*id, def.linear_velocity);
                world.set_body_angular_velocity(*id, def.angular_velocity);
                world.set_body_awake(*id, def.awake);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyType;
    use crate::shapes::{self, Shape};
    use crate::shapes::ShapeDef;

    #[test]
    fn round_trips_body_position_through_json() {
        let mut world = World::default();
        let def = BodyDef::builder().body_type(BodyType::Dynamic).position((1.0, 5.0)).build();
        let body = world.create_body_id(&def).unwrap();
        world.create_shape_id(body, Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

        let snapshot = WorldSnapshot::take(&world);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: WorldSnapshot = serde_json::from_str(&json).unwrap();

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        restored.apply(&mut world);

        assert!((world.body_position(body).x - 1.0).abs() < 1e-5);
        assert!((world.body_position(body).y - 5.0).abs() < 1e-5);
    }
}
