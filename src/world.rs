//! The simulation world: owns every body, shape, contact, and joint, and
//! drives the per-step pipeline (broad phase, narrow phase, island
//! solve, continuous collision), following Box2D's `b2World`.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};
use smallvec::SmallVec;

use crate::body::{Body, BodyData, BodyDef, BodyType};
use crate::collision::dynamic_tree::DynamicTree;
use crate::collision::{time_of_impact, Aabb, Manifold, ToiInput, ToiState};
use crate::contact::Contact;
use crate::error::{PhysicsError, PhysicsResult};
use crate::events::{
    BodyMoveEvent, ContactBeginTouchEvent, ContactEndTouchEvent, SensorBeginTouchEvent, SensorEndTouchEvent, StepEvents,
};
use crate::filter::should_collide;
use crate::fixture::{FixtureData, ShapeHandle};
use crate::island;
use crate::joints::distance::{DistanceJoint, DistanceJointDef};
use crate::joints::filter::{FilterJoint, FilterJointDef};
use crate::joints::prismatic::{PrismaticJoint, PrismaticJointDef};
use crate::joints::revolute::{RevoluteJoint, RevoluteJointDef};
use crate::joints::weld::{WeldJoint, WeldJointDef};
use crate::joints::{Joint, JointDyn};
use crate::shapes::{Shape, ShapeDef};
use crate::solver;
use crate::tuning::WorldConfig;
use crate::types::{BodyId, ContactId, JointId, Real, ShapeId, Vec2};

fn pair_key(a: ShapeId, b: ShapeId) -> (ShapeId, ShapeId) {
    use slotmap::Key;
    if a.data().as_ffi() <= b.data().as_ffi() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Overrides the built-in category/mask/group filter for a single pair,
/// mirroring Box2D's `b2ContactFilter::ShouldCollide`. Checked only when
/// the built-in filter already allows the pair.
pub trait ContactFilter {
    fn should_collide(&mut self, shape_a: ShapeId, shape_b: ShapeId) -> bool;
}

/// Begin/end-touch and post-solve notifications, mirroring Box2D's
/// `b2ContactListener`. All methods are no-ops by default so callers
/// only override what they need.
pub trait ContactListener {
    fn begin_contact(&mut self, _shape_a: ShapeId, _shape_b: ShapeId) {}
    fn end_contact(&mut self, _shape_a: ShapeId, _shape_b: ShapeId) {}
    fn post_solve(&mut self, _shape_a: ShapeId, _shape_b: ShapeId, _impulse: &ContactImpulse) {}
}

/// Notified right before a shape or joint is actually removed, so a
/// caller can drop its own side tables without a dangling id surviving
/// past the removal (Box2D's `b2DestructionListener`).
pub trait Goodbye {
    fn say_goodbye_shape(&mut self, _shape: ShapeId) {}
    fn say_goodbye_joint(&mut self, _joint: JointId) {}
}

/// Per-contact-point impulses reported to `ContactListener::post_solve`
/// after the velocity solver has run for the step.
#[derive(Clone, Debug, Default)]
pub struct ContactImpulse {
    pub normal_impulses: SmallVec<[Real; 2]>,
    pub tangent_impulses: SmallVec<[Real; 2]>,
}

pub struct World {
    config: WorldConfig,
    bodies: SlotMap<BodyId, BodyData>,
    shapes: SlotMap<ShapeId, FixtureData>,
    contacts: SlotMap<ContactId, Contact>,
    joints: SlotMap<JointId, Box<dyn JointDyn>>,

    body_joints: SecondaryMap<BodyId, Vec<JointId>>,

    tree: DynamicTree<ShapeId>,
    contact_lookup: HashMap<(ShapeId, ShapeId), ContactId>,

    events: StepEvents,
    locked: bool,

    contact_filter: Option<Box<dyn ContactFilter>>,
    contact_listener: Option<Box<dyn ContactListener>>,
    pre_solve: Option<Box<dyn FnMut(ShapeId, ShapeId, &Manifold) -> bool>>,
    goodbye: Option<Box<dyn Goodbye>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: SlotMap::with_key(),
            shapes: SlotMap::with_key(),
            contacts: SlotMap::with_key(),
            joints: SlotMap::with_key(),
            body_joints: SecondaryMap::new(),
            tree: DynamicTree::new(),
            contact_lookup: HashMap::new(),
            events: StepEvents::default(),
            locked: false,
            contact_filter: None,
            contact_listener: None,
            pre_solve: None,
            goodbye: None,
        }
    }

    /// Installs a custom filter consulted after the built-in category/
    /// mask/group filter already allows a pair.
    pub fn set_custom_filter(&mut self, filter: Box<dyn ContactFilter>) {
        self.contact_filter = Some(filter);
    }

    /// Installs the begin/end-touch and post-solve listener.
    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.contact_listener = Some(listener);
    }

    /// Installs a pre-solve hook run once per touching, non-sensor
    /// contact each step, right after the narrow phase updates its
    /// manifold. Returning `false` disables the contact for this step
    /// and every step after, until something re-enables it.
    pub fn set_pre_solve(&mut self, f: impl FnMut(ShapeId, ShapeId, &Manifold) -> bool + 'static) {
        self.pre_solve = Some(Box::new(f));
    }

    /// Installs the destruction listener, notified right before a shape
    /// or joint is actually removed.
    pub fn set_goodbye_listener(&mut self, goodbye: Box<dyn Goodbye>) {
        self.goodbye = Some(goodbye);
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn set_gravity<V: Into<Vec2>>(&mut self, g: V) {
        self.config.gravity = g.into();
    }

    /// Rejects structural mutation while a step is in progress, without
    /// side effects, instead of panicking (`b2World::IsLocked`).
    fn check_unlocked(&self) -> PhysicsResult<()> {
        if self.locked {
            log::warn!("structural mutation rejected: world is locked inside World::step");
            Err(PhysicsError::WrongState)
        } else {
            Ok(())
        }
    }

    // ---- bodies ----------------------------------------------------

    pub fn create_body(&mut self, def: &BodyDef) -> PhysicsResult<Body<'_>> {
        let id = self.create_body_id(def)?;
        Ok(Body::new(self, id))
    }

    pub fn create_body_id(&mut self, def: &BodyDef) -> PhysicsResult<BodyId> {
        self.check_unlocked()?;
        let id = self.bodies.insert(BodyData::from_def(def));
        self.body_joints.insert(id, Vec::new());
        Ok(id)
    }

    pub fn destroy_body(&mut self, id: BodyId) -> PhysicsResult<()> {
        self.check_unlocked()?;
        let Some(body) = self.bodies.get(id) else { return Ok(()) };
        let shape_ids: SmallVec<[ShapeId; 4]> = body.shapes.clone();
        for sid in shape_ids {
            self.destroy_shape(sid)?;
        }
        let joint_ids: Vec<JointId> = self.body_joints.get(id).cloned().unwrap_or_default();
        for jid in joint_ids {
            self.destroy_joint(jid)?;
        }
        self.body_joints.remove(id);
        self.bodies.remove(id);
        Ok(())
    }

    pub fn body_mut(&mut self, id: BodyId) -> Body<'_> {
        Body::new(self, id)
    }

    pub(crate) fn body_type(&self, id: BodyId) -> BodyType {
        self.bodies[id].body_type
    }
    pub(crate) fn body_position(&self, id: BodyId) -> Vec2 {
        self.bodies[id].sweep.c
    }
    pub(crate) fn body_angle(&self, id: BodyId) -> Real {
        self.bodies[id].sweep.a
    }
    pub(crate) fn body_linear_velocity(&self, id: BodyId) -> Vec2 {
        self.bodies[id].velocity.linear
    }
    pub(crate) fn body_angular_velocity(&self, id: BodyId) -> Real {
        self.bodies[id].velocity.angular
    }
    pub(crate) fn set_body_linear_velocity(&mut self, id: BodyId, v: Vec2) {
        self.bodies[id].velocity.linear = v;
    }
    pub(crate) fn set_body_angular_velocity(&mut self, id: BodyId, v: Real) {
        self.bodies[id].velocity.angular = v;
    }
    pub(crate) fn set_body_transform(&mut self, id: BodyId, position: Vec2, angle: Real) {
        let b = &mut self.bodies[id];
        b.transform = crate::core::Transform::from_pos_angle(position, angle);
        b.sweep.c0 = b.transform.transform_point(b.sweep.local_center);
        b.sweep.c = b.sweep.c0;
        b.sweep.a0 = angle;
        b.sweep.a = angle;
        self.synchronize_body_shapes(id, Vec2::ZERO);
    }

    fn wake_body(&mut self, id: BodyId, wake: bool) {
        if !wake {
            return;
        }
        let b = &mut self.bodies[id];
        if b.body_type != BodyType::Static {
            b.awake = true;
            b.sleep_time = 0.0;
        }
    }

    pub(crate) fn apply_force_to_center(&mut self, id: BodyId, force: Vec2, wake: bool) {
        self.wake_body(id, wake);
        let b = &mut self.bodies[id];
        if b.body_type == BodyType::Dynamic && b.awake {
            b.force += force;
        }
    }
    pub(crate) fn apply_force(&mut self, id: BodyId, force: Vec2, point: Vec2, wake: bool) {
        self.wake_body(id, wake);
        let b = &mut self.bodies[id];
        if b.body_type == BodyType::Dynamic && b.awake {
            b.force += force;
            b.torque += (point - b.sweep.c).cross(force);
        }
    }
    pub(crate) fn apply_torque(&mut self, id: BodyId, torque: Real, wake: bool) {
        self.wake_body(id, wake);
        let b = &mut self.bodies[id];
        if b.body_type == BodyType::Dynamic && b.awake {
            b.torque += torque;
        }
    }
    pub(crate) fn apply_linear_impulse(&mut self, id: BodyId, impulse: Vec2, point: Vec2, wake: bool) {
        self.wake_body(id, wake);
        let b = &mut self.bodies[id];
        if b.body_type == BodyType::Dynamic && b.awake {
            b.velocity.linear += impulse * b.inv_mass;
            b.velocity.angular += b.inv_inertia * (point - b.sweep.c).cross(impulse);
        }
    }
    pub(crate) fn apply_linear_impulse_to_center(&mut self, id: BodyId, impulse: Vec2, wake: bool) {
        self.wake_body(id, wake);
        let b = &mut self.bodies[id];
        if b.body_type == BodyType::Dynamic && b.awake {
            b.velocity.linear += impulse * b.inv_mass;
        }
    }
    pub(crate) fn apply_angular_impulse(&mut self, id: BodyId, impulse: Real, wake: bool) {
        self.wake_body(id, wake);
        let b = &mut self.bodies[id];
        if b.body_type == BodyType::Dynamic && b.awake {
            b.velocity.angular += b.inv_inertia * impulse;
        }
    }
    pub(crate) fn is_body_awake(&self, id: BodyId) -> bool {
        self.bodies[id].awake
    }
    pub(crate) fn set_body_awake(&mut self, id: BodyId, flag: bool) {
        let b = &mut self.bodies[id];
        if flag {
            b.awake = true;
            b.sleep_time = 0.0;
        } else {
            b.awake = false;
            b.sleep_time = 0.0;
            b.velocity.linear = Vec2::ZERO;
            b.velocity.angular = 0.0;
        }
    }
    pub(crate) fn body_mass(&self, id: BodyId) -> Real {
        self.bodies[id].mass
    }

    // ---- shapes ------------------------------------------------------

    pub fn create_shape(&mut self, body: BodyId, shape: Shape, def: &ShapeDef) -> PhysicsResult<ShapeHandle<'_>> {
        let id = self.create_shape_id(body, shape, def)?;
        Ok(ShapeHandle::new(self, id))
    }

    pub fn create_shape_id(&mut self, body: BodyId, shape: Shape, def: &ShapeDef) -> PhysicsResult<ShapeId> {
        self.check_unlocked()?;
        let xf = self.bodies[body].transform;
        let aabb = shape.compute_aabb(xf, 0);
        let mut fixture = FixtureData::new(body, shape, def);
        fixture.aabb = aabb;
        let id = self.shapes.insert(fixture);

        let proxy = self.tree.create_proxy(aabb, self.config.aabb_extension, id);
        self.shapes[id].proxies.push(proxy);

        self.bodies[body].shapes.push(id);
        self.reset_body_mass(body);
        Ok(id)
    }

    pub fn destroy_shape(&mut self, id: ShapeId) -> PhysicsResult<()> {
        self.check_unlocked()?;
        let Some(fixture) = self.shapes.get(id) else { return Ok(()) };
        let body = fixture.body;
        if let Some(goodbye) = self.goodbye.as_mut() {
            goodbye.say_goodbye_shape(id);
        }
        for &proxy in &fixture.proxies {
            self.tree.destroy_proxy(proxy);
        }

        let to_remove: Vec<ContactId> = self
            .contacts
            .iter()
            .filter(|(_, c)| c.shape_a == id || c.shape_b == id)
            .map(|(cid, _)| cid)
            .collect();
        for cid in to_remove {
            self.destroy_contact(cid, true);
        }

        if let Some(b) = self.bodies.get_mut(body) {
            b.shapes.retain(|&s| s != id);
        }
        self.shapes.remove(id);
        self.reset_body_mass(body);
        Ok(())
    }

    pub(crate) fn shape_body(&self, id: ShapeId) -> BodyId {
        self.shapes[id].body
    }
    pub(crate) fn shape_is_sensor(&self, id: ShapeId) -> bool {
        self.shapes[id].is_sensor
    }
    pub(crate) fn set_shape_filter(&mut self, id: ShapeId, filter: crate::filter::Filter) {
        self.shapes[id].filter = filter;
    }
    pub(crate) fn set_shape_density(&mut self, id: ShapeId, density: Real, update_body_mass: bool) {
        let body = self.shapes[id].body;
        self.shapes[id].density = density;
        if update_body_mass {
            self.reset_body_mass(body);
        }
    }
    pub(crate) fn set_shape_friction(&mut self, id: ShapeId, friction: Real) {
        self.shapes[id].material.friction = friction;
    }
    pub(crate) fn set_shape_restitution(&mut self, id: ShapeId, restitution: Real) {
        self.shapes[id].material.restitution = restitution;
    }

    fn reset_body_mass(&mut self, body: BodyId) {
        let Some(b) = self.bodies.get(body) else { return };
        if b.body_type != BodyType::Dynamic {
            return;
        }
        let shape_ids = b.shapes.clone();
        let mass_data: Vec<(Real, Vec2, Real)> = shape_ids
            .iter()
            .map(|&sid| {
                let f = &self.shapes[sid];
                let md = f.shape.compute_mass(f.density);
                (md.mass, md.center, md.rotational_inertia)
            })
            .collect();
        self.bodies[body].reset_mass_data(mass_data.into_iter());
    }

    // ---- joints --------------------------------------------------------

    fn register_joint(&mut self, id: JointId, body_a: BodyId, body_b: BodyId) {
        self.body_joints.entry(body_a).unwrap().or_default().push(id);
        self.body_joints.entry(body_b).unwrap().or_default().push(id);
    }

    pub fn create_distance_joint(&mut self, def: DistanceJointDef) -> PhysicsResult<Joint<'_>> {
        self.check_unlocked()?;
        let (a, b) = (def.base.body_a, def.base.body_b);
        let id = self.joints.insert(Box::new(DistanceJoint::new(def)));
        self.register_joint(id, a, b);
        Ok(Joint::new(self, id))
    }

    pub fn create_revolute_joint(&mut self, def: RevoluteJointDef) -> PhysicsResult<Joint<'_>> {
        self.check_unlocked()?;
        let (a, b) = (def.base.body_a, def.base.body_b);
        let id = self.joints.insert(Box::new(RevoluteJoint::new(def)));
        self.register_joint(id, a, b);
        Ok(Joint::new(self, id))
    }

    pub fn create_weld_joint(&mut self, def: WeldJointDef) -> PhysicsResult<Joint<'_>> {
        self.check_unlocked()?;
        let (a, b) = (def.base.body_a, def.base.body_b);
        let reference_angle = self.bodies[b].sweep.a - self.bodies[a].sweep.a;
        let id = self.joints.insert(Box::new(WeldJoint::new(def, reference_angle)));
        self.register_joint(id, a, b);
        Ok(Joint::new(self, id))
    }

    pub fn create_prismatic_joint(&mut self, def: PrismaticJointDef) -> PhysicsResult<Joint<'_>> {
        self.check_unlocked()?;
        let (a, b) = (def.base.body_a, def.base.body_b);
        let reference_angle = self.bodies[b].sweep.a - self.bodies[a].sweep.a;
        let id = self.joints.insert(Box::new(PrismaticJoint::new(def, reference_angle)));
        self.register_joint(id, a, b);
        Ok(Joint::new(self, id))
    }

    pub fn create_filter_joint(&mut self, def: FilterJointDef) -> PhysicsResult<Joint<'_>> {
        self.check_unlocked()?;
        let (a, b) = (def.base.body_a, def.base.body_b);
        let id = self.joints.insert(Box::new(FilterJoint::new(def)));
        self.register_joint(id, a, b);
        Ok(Joint::new(self, id))
    }

    pub fn destroy_joint(&mut self, id: JointId) -> PhysicsResult<()> {
        self.check_unlocked()?;
        let Some(joint) = self.joints.remove(id) else { return Ok(()) };
        if let Some(goodbye) = self.goodbye.as_mut() {
            goodbye.say_goodbye_joint(id);
        }
        let a = joint.body_a();
        let b = joint.body_b();
        if let Some(list) = self.body_joints.get_mut(a) {
            list.retain(|&j| j != id);
        }
        if let Some(list) = self.body_joints.get_mut(b) {
            list.retain(|&j| j != id);
        }
        self.wake_body(a, true);
        self.wake_body(b, true);
        Ok(())
    }

    pub(crate) fn joint_body_a(&self, id: JointId) -> BodyId {
        self.joints[id].body_a()
    }
    pub(crate) fn joint_body_b(&self, id: JointId) -> BodyId {
        self.joints[id].body_b()
    }
    pub(crate) fn joint_reaction_force(&self, id: JointId) -> Vec2 {
        let inv_dt = 1.0; // reaction forces are reported in impulse-per-second units of the last solve
        self.joints[id].reaction_force(inv_dt)
    }
    pub(crate) fn joint_reaction_torque(&self, id: JointId) -> Real {
        self.joints[id].reaction_torque(1.0)
    }

    fn joint_forbids_collision(&self, a: BodyId, b: BodyId) -> bool {
        let Some(list) = self.body_joints.get(a) else { return false };
        list.iter().any(|&jid| {
            let j = &self.joints[jid];
            !j.collide_connected() && ((j.body_a() == a && j.body_b() == b) || (j.body_a() == b && j.body_b() == a))
        })
    }

    // ---- events --------------------------------------------------------

    pub fn step_events(&self) -> &StepEvents {
        &self.events
    }

    // ---- stepping --------------------------------------------------------

    /// Runs one fixed-size step of broad phase, narrow phase, solve, and
    /// (if enabled) continuous collision. `World` is locked for the
    /// duration, including every listener callback it invokes, so
    /// listeners cannot create or destroy bodies/shapes/joints from
    /// inside a step; the lock is released even if a listener panics.
    pub fn step(&mut self, dt: Real) {
        if dt <= 0.0 {
            return;
        }
        self.events = StepEvents::default();
        self.locked = true;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.update_broad_phase();
            self.update_contacts();
            self.solve(dt);
            self.integrate_kinematic_bodies(dt);
            if self.contact_listener.is_some() {
                self.dispatch_post_solve();
            }
            if self.config.continuous_physics {
                self.solve_continuous(dt);
            }
            if self.config.auto_clear_forces {
                for (_, b) in self.bodies.iter_mut() {
                    b.force = Vec2::ZERO;
                    b.torque = 0.0;
                }
            }
        }));

        self.locked = false;
        if let Err(payload) = result {
            std::panic::resume_unwind(payload);
        }
    }

    fn synchronize_body_shapes(&mut self, body: BodyId, displacement: Vec2) {
        let shape_ids = self.bodies[body].shapes.clone();
        let xf = self.bodies[body].transform;
        for sid in shape_ids {
            let aabb = self.shapes[sid].shape.compute_aabb(xf, 0);
            self.shapes[sid].aabb = aabb;
            let proxy = self.shapes[sid].proxies[0];
            self.tree.move_proxy(proxy, aabb, self.config.aabb_extension, displacement);
        }
    }

    fn update_broad_phase(&mut self) {
        let body_ids: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.awake && b.enabled && b.body_type != BodyType::Static)
            .map(|(id, _)| id)
            .collect();

        let mut moved = Vec::new();
        for id in body_ids {
            let displacement = self.bodies[id].velocity.linear * self.config.aabb_displacement_multiplier;
            let shape_ids = self.bodies[id].shapes.clone();
            let xf = self.bodies[id].transform;
            for sid in shape_ids {
                let aabb = self.shapes[sid].shape.compute_aabb(xf, 0);
                self.shapes[sid].aabb = aabb;
                let proxy = self.shapes[sid].proxies[0];
                if self.tree.move_proxy(proxy, aabb, self.config.aabb_extension, displacement) {
                    moved.push(proxy);
                }
            }
        }

        for &proxy in &moved {
            let Some(shape_id) = self.tree.user_data(proxy) else { continue };
            let fat = self.tree.fat_aabb(proxy);
            let mut candidates = Vec::new();
            self.tree.query(&fat, |other_proxy| {
                candidates.push(other_proxy);
                true
            });
            for other_proxy in candidates {
                if other_proxy == proxy {
                    continue;
                }
                let Some(other_shape) = self.tree.user_data(other_proxy) else { continue };
                self.try_create_contact(shape_id, other_shape);
            }
        }

        let stale: Vec<ContactId> = self
            .contacts
            .iter()
            .filter(|(_, c)| {
                let fa = self.shapes.get(c.shape_a).map(|f| self.tree.fat_aabb(f.proxies[0]));
                let fb = self.shapes.get(c.shape_b).map(|f| self.tree.fat_aabb(f.proxies[0]));
                match (fa, fb) {
                    (Some(a), Some(b)) => !a.overlaps(&b),
                    _ => true,
                }
            })
            .map(|(cid, _)| cid)
            .collect();
        for cid in stale {
            self.destroy_contact(cid, true);
        }
    }

    fn try_create_contact(&mut self, a: ShapeId, b: ShapeId) {
        if a == b {
            return;
        }
        let Some(fa) = self.shapes.get(a) else { return };
        let Some(fb) = self.shapes.get(b) else { return };
        if fa.body == fb.body {
            return;
        }
        let key = pair_key(a, b);
        if self.contact_lookup.contains_key(&key) {
            return;
        }
        let both_non_dynamic = self.bodies[fa.body].body_type != BodyType::Dynamic && self.bodies[fb.body].body_type != BodyType::Dynamic;
        if both_non_dynamic {
            return;
        }
        if !should_collide(&fa.filter, &fb.filter) {
            return;
        }
        if self.joint_forbids_collision(fa.body, fb.body) {
            return;
        }
        if (fa.enable_custom_filtering || fb.enable_custom_filtering) && self.contact_filter.is_some() {
            if !self.contact_filter.as_mut().unwrap().should_collide(a, b) {
                return;
            }
        }

        let is_sensor = fa.is_sensor || fb.is_sensor;
        let contact = Contact::new(a, fa.body, b, fb.body, is_sensor);
        let cid = self.contacts.insert(contact);
        self.contact_lookup.insert(key, cid);
    }

    fn destroy_contact(&mut self, cid: ContactId, emit_end_event: bool) {
        let Some(contact) = self.contacts.remove(cid) else { return };
        self.contact_lookup.remove(&pair_key(contact.shape_a, contact.shape_b));
        if emit_end_event && contact.is_touching {
            self.emit_end_touch(&contact);
        }
    }

    fn emit_end_touch(&mut self, contact: &Contact) {
        if contact.is_sensor {
            let (sensor, visitor) = if self.shapes.get(contact.shape_a).is_some_and(|f| f.is_sensor) {
                (contact.shape_a, contact.shape_b)
            } else {
                (contact.shape_b, contact.shape_a)
            };
            self.events.sensor_end.push(SensorEndTouchEvent { sensor_shape: sensor, visitor_shape: visitor });
        } else {
            self.events.contact_end.push(ContactEndTouchEvent { shape_a: contact.shape_a, shape_b: contact.shape_b });
        }
    }

    fn update_contacts(&mut self) {
        let ids: Vec<ContactId> = self.contacts.keys().collect();
        for cid in ids {
            let (shape_a, shape_b, xf_a, xf_b, is_sensor, contact_events_enabled, pre_solve_enabled) = {
                let c = &self.contacts[cid];
                let fa = &self.shapes[c.shape_a];
                let fb = &self.shapes[c.shape_b];
                (
                    c.shape_a,
                    c.shape_b,
                    self.bodies[fa.body].transform,
                    self.bodies[fb.body].transform,
                    c.is_sensor,
                    fa.enable_contact_events && fb.enable_contact_events,
                    fa.enable_pre_solve_events && fb.enable_pre_solve_events,
                )
            };

            let (shape_a_data, shape_b_data, friction, restitution) = {
                let fa = &self.shapes[shape_a];
                let fb = &self.shapes[shape_b];
                (fa.shape.clone(), fb.shape.clone(), (fa.material.friction * fb.material.friction).sqrt(), fa.material.restitution.max(fb.material.restitution))
            };

            let c = &mut self.contacts[cid];
            c.friction = friction;
            c.restitution = restitution;
            c.update(&shape_a_data, xf_a, &shape_b_data, xf_b);

            if c.is_touching && !is_sensor && pre_solve_enabled {
                if let Some(pre_solve) = self.pre_solve.as_mut() {
                    if !pre_solve(shape_a, shape_b, &c.manifold) {
                        c.enabled = false;
                    }
                }
            }

            let c = &self.contacts[cid];
            if c.is_touching == c.was_touching {
                continue;
            }
            if c.is_touching {
                if is_sensor {
                    let (sensor, visitor) = if self.shapes[shape_a].is_sensor { (shape_a, shape_b) } else { (shape_b, shape_a) };
                    if self.shapes[sensor].enable_sensor_events {
                        self.events.sensor_begin.push(SensorBeginTouchEvent { sensor_shape: sensor, visitor_shape: visitor });
                    }
                } else if contact_events_enabled {
                    self.events.contact_begin.push(ContactBeginTouchEvent { shape_a, shape_b });
                    if let Some(listener) = self.contact_listener.as_mut() {
                        listener.begin_contact(shape_a, shape_b);
                    }
                }
            } else if is_sensor {
                let (sensor, visitor) = if self.shapes[shape_a].is_sensor { (shape_a, shape_b) } else { (shape_b, shape_a) };
                if self.shapes[sensor].enable_sensor_events {
                    self.events.sensor_end.push(SensorEndTouchEvent { sensor_shape: sensor, visitor_shape: visitor });
                }
            } else if contact_events_enabled {
                self.events.contact_end.push(ContactEndTouchEvent { shape_a, shape_b });
                if let Some(listener) = self.contact_listener.as_mut() {
                    listener.end_contact(shape_a, shape_b);
                }
            }
        }
    }

    fn dispatch_post_solve(&mut self) {
        let ids: Vec<ContactId> = self
            .contacts
            .iter()
            .filter(|(_, c)| {
                c.is_touching
                    && !c.is_sensor
                    && c.enabled
                    && self.shapes.get(c.shape_a).is_some_and(|f| f.enable_contact_events)
                    && self.shapes.get(c.shape_b).is_some_and(|f| f.enable_contact_events)
            })
            .map(|(cid, _)| cid)
            .collect();
        for cid in ids {
            let (shape_a, shape_b, impulse) = {
                let c = &self.contacts[cid];
                let normal_impulses = c.manifold.points.iter().map(|p| p.normal_impulse).collect();
                let tangent_impulses = c.manifold.points.iter().map(|p| p.tangent_impulse).collect();
                (c.shape_a, c.shape_b, ContactImpulse { normal_impulses, tangent_impulses })
            };
            self.contact_listener.as_mut().unwrap().post_solve(shape_a, shape_b, &impulse);
        }
    }

    fn solve(&mut self, dt: Real) {
        let islands = island::build_islands(&self.bodies, &self.contacts, &self.body_contacts_by_body(), &self.body_joints, &self.joint_bodies_snapshot());

        let gravity = self.config.gravity;
        let config = self.config;
        for island in &islands {
            let radius_of = |sid: ShapeId| self.shapes.get(sid).map(|f| f.shape.radius()).unwrap_or(0.0);
            solver::solve_island(island, &mut self.bodies, &mut self.contacts, &mut self.joints, radius_of, gravity, dt, &config);
        }

        for island in &islands {
            if !config.allow_sleep || !island::island_can_sleep(island, &self.bodies, config.min_still_time_to_sleep) {
                continue;
            }
            for &id in &island.bodies {
                let b = &mut self.bodies[id];
                if b.awake {
                    b.awake = false;
                    b.velocity.linear = Vec2::ZERO;
                    b.velocity.angular = 0.0;
                    self.events.body_moved.push(BodyMoveEvent { body: id, transform: b.transform, fell_asleep: true });
                }
            }
        }
    }

    /// Advances every awake kinematic body by its prescribed velocity.
    /// Kinematic bodies are never seeded into an island (islands only
    /// start from awake dynamic bodies), so their motion is integrated
    /// here unconditionally, independent of contacts or joints.
    fn integrate_kinematic_bodies(&mut self, dt: Real) {
        for (_, b) in self.bodies.iter_mut() {
            if b.body_type != BodyType::Kinematic || !b.awake || !b.enabled {
                continue;
            }
            b.sweep.c0 = b.sweep.c;
            b.sweep.a0 = b.sweep.a;
            b.sweep.c += b.velocity.linear * dt;
            b.sweep.a += b.velocity.angular * dt;
            b.synchronize_transform();
        }
    }

    fn body_contacts_by_body(&self) -> SecondaryMap<BodyId, Vec<ContactId>> {
        let mut map: SecondaryMap<BodyId, Vec<ContactId>> = SecondaryMap::new();
        for (cid, c) in self.contacts.iter() {
            if !c.is_touching || c.is_sensor || !c.enabled {
                continue;
            }
            map.entry(c.body_a).unwrap().or_default().push(cid);
            map.entry(c.body_b).unwrap().or_default().push(cid);
        }
        map
    }

    fn joint_bodies_snapshot(&self) -> SecondaryMap<JointId, (BodyId, BodyId)> {
        let mut map = SecondaryMap::new();
        for (jid, j) in self.joints.iter() {
            map.insert(jid, (j.body_a(), j.body_b()));
        }
        map
    }

    /// Simplified continuous-collision pass: for each fast-moving dynamic
    /// body, finds the earliest time of impact against nearby shapes this
    /// step and clamps its sweep to just before the impact. Unlike
    /// upstream's mini-island TOI solver, this does not re-run the
    /// velocity solver at the clamped time; see DESIGN.md.
    fn solve_continuous(&mut self, _dt: Real) {
        let candidates: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.body_type == BodyType::Dynamic && b.awake && (b.bullet || self.is_fast(b)))
            .map(|(id, _)| id)
            .collect();

        for body_id in candidates {
            let mut min_alpha: Real = 1.0;

            let body_sweep = self.bodies[body_id].sweep;
            let body_shapes = self.bodies[body_id].shapes.clone();

            let search_aabb = {
                let xf0 = body_sweep.get_transform(0.0);
                let xf1 = body_sweep.get_transform(1.0);
                let mut aabb = Aabb::EMPTY;
                for &sid in &body_shapes {
                    let a0 = self.shapes[sid].shape.compute_aabb(xf0, 0);
                    let a1 = self.shapes[sid].shape.compute_aabb(xf1, 0);
                    aabb = if aabb.valid() { Aabb::union(&aabb, &a0) } else { a0 };
                    aabb = Aabb::union(&aabb, &a1);
                }
                aabb.fattened(self.config.aabb_extension)
            };

            let mut others = Vec::new();
            self.tree.query(&search_aabb, |proxy| {
                if let Some(sid) = self.tree.user_data(proxy) {
                    others.push(sid);
                }
                true
            });

            for other_sid in others {
                let Some(other_fixture) = self.shapes.get(other_sid) else { continue };
                if other_fixture.body == body_id || other_fixture.is_sensor {
                    continue;
                }
                if self.bodies[other_fixture.body].body_type == BodyType::Dynamic && self.bodies[other_fixture.body].bullet {
                    continue;
                }

                for &own_sid in &body_shapes {
                    if self.shapes[own_sid].is_sensor {
                        continue;
                    }
                    let proxy_a = self.shapes[own_sid].shape.distance_proxy(0);
                    let proxy_b = other_fixture.shape.distance_proxy(0);
                    let input = ToiInput {
                        proxy_a: &proxy_a,
                        proxy_b: &proxy_b,
                        sweep_a: body_sweep,
                        sweep_b: self.bodies[other_fixture.body].sweep,
                        target: self.config.linear_slop,
                        tolerance: 0.25 * self.config.linear_slop,
                    };
                    let output = time_of_impact(&input, self.config.max_toi_root_iters as u32, self.config.max_toi_iters as u32);
                    if output.state == ToiState::Hit && output.t < min_alpha {
                        min_alpha = output.t;
                    }
                }
            }

            if min_alpha < 1.0 {
                let b = &mut self.bodies[body_id];
                b.sweep.advance(min_alpha);
                // `advance` only moves the start-of-step pose (c0/a0) up
                // to the impact time; `c`/`a` still hold the original,
                // unclamped end-of-step target. Collapse the sweep to the
                // clamped pose so the body actually stops there for the
                // rest of this step, and so the next step's
                // `sweep.c0 = sweep.c` reset starts from the clamped
                // position instead of snapping back to the tunneled one.
                b.sweep.c = b.sweep.c0;
                b.sweep.a = b.sweep.a0;
                b.sweep.alpha0 = 0.0;
                b.transform = b.sweep.get_transform(0.0);
            }
        }
    }

    fn is_fast(&self, b: &BodyData) -> bool {
        b.velocity.linear.length_squared() > (self.config.max_translation * self.config.max_translation) * 0.25
    }

    /// Re-centers the simulation on `new_origin`, translating every body,
    /// shape AABB, broad-phase node, and joint by `-new_origin`, so world
    /// positions stay close to the origin even after the simulation has
    /// drifted a long way from it (`b2World::ShiftOrigin`).
    pub fn shift_origin(&mut self, new_origin: Vec2) -> PhysicsResult<()> {
        self.check_unlocked()?;
        for (_, b) in self.bodies.iter_mut() {
            b.sweep.c -= new_origin;
            b.sweep.c0 -= new_origin;
            b.transform.p -= new_origin;
        }
        for (_, f) in self.shapes.iter_mut() {
            f.aabb.lower -= new_origin;
            f.aabb.upper -= new_origin;
        }
        self.tree.shift_origin(new_origin);
        for (_, j) in self.joints.iter_mut() {
            j.shift_origin(new_origin);
        }
        Ok(())
    }

    // ---- broad phase access for query.rs --------------------------------

    pub(crate) fn tree(&self) -> &DynamicTree<ShapeId> {
        &self.tree
    }
    pub(crate) fn shapes(&self) -> &SlotMap<ShapeId, FixtureData> {
        &self.shapes
    }
    pub(crate) fn bodies(&self) -> &SlotMap<BodyId, BodyData> {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn ball_falls_under_gravity() {
        let mut world = World::default();
        let body_def = BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 10.0)).build();
        let body = world.create_body_id(&body_def).unwrap();
        let circle = shapes::circle((0.0, 0.0), 0.5);
        world.create_shape_id(body, Shape::Circle(circle), &ShapeDef::default()).unwrap();

        let start_y = world.body_position(body).y;
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert!(world.body_position(body).y < start_y);
    }

    #[test]
    fn ball_rests_on_static_ground() {
        let mut world = World::default();
        let ground_def = BodyDef::builder().body_type(BodyType::Static).position((0.0, 0.0)).build();
        let ground = world.create_body_id(&ground_def).unwrap();
        world.create_shape_id(ground, Shape::Polygon(shapes::box_polygon(10.0, 0.5)), &ShapeDef::default()).unwrap();

        let body_def = BodyDef::builder().body_type(BodyType::Dynamic).position((0.0, 2.0)).build();
        let body = world.create_body_id(&body_def).unwrap();
        world.create_shape_id(body, Shape::Circle(shapes::circle((0.0, 0.0), 0.5)), &ShapeDef::default()).unwrap();

        for _ in 0..180 {
            world.step(1.0 / 60.0);
        }
        let y = world.body_position(body).y;
        assert!((y - 1.0).abs() < 0.05, "expected resting near y=1.0, got {y}");
    }
}
