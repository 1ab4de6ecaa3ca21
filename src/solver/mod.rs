//! Per-island velocity/position solving, following Box2D's
//! `b2Island::Solve`: prepare contact constraints, warm-start, run
//! velocity iterations, integrate positions, then run position
//! iterations to remove leftover overlap.

pub mod position;
pub mod velocity;

use slotmap::SlotMap;

use crate::body::BodyData;
use crate::contact::Contact;
use crate::island::Island;
use crate::joints::JointDyn;
use crate::tuning::WorldConfig;
use crate::types::{BodyId, ContactId, JointId, Real, ShapeId, Vec2};

#[allow(clippy::too_many_arguments)]
pub fn solve_island(
    island: &Island,
    bodies: &mut SlotMap<BodyId, BodyData>,
    contacts: &mut SlotMap<ContactId, Contact>,
    joints: &mut SlotMap<JointId, Box<dyn JointDyn>>,
    radius_of: impl Fn(ShapeId) -> Real,
    gravity: Vec2,
    dt: Real,
    config: &WorldConfig,
) {
    if dt <= 0.0 {
        return;
    }
    let inv_dt = 1.0 / dt;

    apply_forces_and_integrate_velocities(island, bodies, gravity, dt);

    let mut velocity_constraints = velocity::prepare(contacts, &island.contacts, bodies, config.velocity_threshold, &radius_of);

    for &jid in &island.joints {
        if let Some(joint) = joints.get_mut(jid) {
            joint.init_velocity_constraints(bodies, dt);
        }
    }

    if config.do_warm_start {
        velocity::warm_start(&velocity_constraints, bodies);
        for &jid in &island.joints {
            if let Some(joint) = joints.get_mut(jid) {
                joint.warm_start(bodies);
            }
        }
    }

    for _ in 0..config.velocity_iterations {
        for &jid in &island.joints {
            if let Some(joint) = joints.get_mut(jid) {
                joint.solve_velocity_constraints(bodies, inv_dt);
            }
        }
        velocity::solve(&mut velocity_constraints, bodies);
    }

    integrate_positions(island, bodies, dt, config.max_translation, config.max_rotation);

    let position_constraints = position::prepare(contacts, &island.contacts, &radius_of);
    for _ in 0..config.position_iterations {
        let mut joints_ok = true;
        for &jid in &island.joints {
            if let Some(joint) = joints.get_mut(jid) {
                joints_ok &= joint.solve_position_constraints(bodies);
            }
        }
        let contacts_ok = position::solve(&position_constraints, contacts, bodies, config.linear_slop, config.max_linear_correction);
        if joints_ok && contacts_ok {
            break;
        }
    }

    velocity::store_impulses(&velocity_constraints, contacts);

    update_sleep_state(island, bodies, config, dt);
}

fn apply_forces_and_integrate_velocities(island: &Island, bodies: &mut SlotMap<BodyId, BodyData>, gravity: Vec2, dt: Real) {
    for &id in &island.bodies {
        let b = &mut bodies[id];
        if b.body_type != crate::body::BodyType::Dynamic {
            continue;
        }
        b.sweep.c0 = b.sweep.c;
        b.sweep.a0 = b.sweep.a;

        let linear_accel = gravity * b.gravity_scale + b.force * b.inv_mass;
        b.velocity.linear += linear_accel * dt;
        b.velocity.angular += dt * b.inv_inertia * b.torque;

        b.velocity.linear *= 1.0 / (1.0 + dt * b.linear_damping);
        b.velocity.angular *= 1.0 / (1.0 + dt * b.angular_damping);
    }
}

fn integrate_positions(island: &Island, bodies: &mut SlotMap<BodyId, BodyData>, dt: Real, max_translation: Real, max_rotation: Real) {
    for &id in &island.bodies {
        let b = &mut bodies[id];
        if b.body_type == crate::body::BodyType::Static {
            continue;
        }

        let mut translation = b.velocity.linear * dt;
        if translation.dot(translation) > max_translation * max_translation {
            let ratio = max_translation / translation.length();
            translation *= ratio;
            b.velocity.linear *= ratio;
        }

        let mut rotation = b.velocity.angular * dt;
        if rotation * rotation > max_rotation * max_rotation {
            let ratio = max_rotation / rotation.abs();
            rotation *= ratio;
            b.velocity.angular *= ratio;
        }

        b.sweep.c += translation;
        b.sweep.a += rotation;
        b.synchronize_transform();
    }
}

fn update_sleep_state(island: &Island, bodies: &mut SlotMap<BodyId, BodyData>, config: &WorldConfig, dt: Real) {
    if !config.allow_sleep {
        for &id in &island.bodies {
            bodies[id].sleep_time = 0.0;
        }
        return;
    }

    let lin_tol2 = config.linear_sleep_tolerance * config.linear_sleep_tolerance;
    let ang_tol2 = config.angular_sleep_tolerance * config.angular_sleep_tolerance;

    for &id in &island.bodies {
        let b = &mut bodies[id];
        if b.body_type == crate::body::BodyType::Static {
            continue;
        }
        if !b.enable_sleep
            || b.velocity.angular * b.velocity.angular > ang_tol2
            || b.velocity.linear.dot(b.velocity.linear) > lin_tol2
        {
            b.sleep_time = 0.0;
        } else {
            b.sleep_time += dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::body::{BodyDef, BodyType};
    use crate::shapes::{self, Shape, ShapeDef};
    use crate::world::World;

    /// A stack of three boxes settles reproducibly close to its analytic
    /// resting height under the sequential-impulse solver. Run twice to
    /// confirm the settled height doesn't depend on anything but the
    /// deterministic inputs.
    fn settle_three_box_stack() -> f32 {
        let mut world = World::default();
        let ground = world.create_body_id(&BodyDef::builder().position((0.0, -10.0)).build()).unwrap();
        world
            .create_shape_id(
                ground,
                Shape::Polygon(shapes::box_polygon(50.0, 10.0)),
                &ShapeDef::builder().density(0.0).build(),
            )
            .unwrap();

        let sdef = ShapeDef::builder().density(1.0).friction(0.3).build();
        let mut top = None;
        for i in 0..3 {
            let y = 0.5 + i as f32;
            let body = world
                .create_body_id(&BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, y)).build())
                .unwrap();
            world.create_shape_id(body, Shape::Polygon(shapes::box_polygon(0.5, 0.5)), &sdef).unwrap();
            top = Some(body);
        }

        for _ in 0..300 {
            world.step(1.0 / 60.0);
        }

        world.body_mut(top.unwrap()).position().y
    }

    #[test]
    fn three_box_stack_settles_near_analytic_height_reproducibly() {
        let y1 = settle_three_box_stack();
        let y2 = settle_three_box_stack();
        assert!((y1 - 2.5).abs() < 0.05, "top box should settle near y=2.5, got {y1}");
        assert!((y1 - y2).abs() < 1e-5, "settled height should be reproducible across runs, got {y1} and {y2}");
    }
}
