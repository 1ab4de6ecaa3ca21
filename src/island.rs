//! Island construction: partitions the set of awake dynamic bodies into
//! connected components via contacts and joints, so the solver and the
//! sleep heuristic each operate per-island rather than on the whole
//! world (following Box2D's `b2Island`/`b2World::Solve` DFS).

use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::body::{BodyData, BodyType};
use crate::contact::Contact;
use crate::types::{BodyId, ContactId, JointId};

pub struct Island {
    pub bodies: Vec<BodyId>,
    pub contacts: Vec<ContactId>,
    pub joints: Vec<JointId>,
}

/// Walks the contact/joint graph starting from every awake dynamic body
/// not yet visited, stopping traversal at static bodies (a static body
/// can belong to many islands at once and never merges them).
pub fn build_islands(
    bodies: &slotmap::SlotMap<BodyId, BodyData>,
    contacts: &slotmap::SlotMap<ContactId, Contact>,
    body_contacts: &SecondaryMap<BodyId, Vec<ContactId>>,
    body_joints: &SecondaryMap<BodyId, Vec<JointId>>,
    joint_bodies: &SecondaryMap<JointId, (BodyId, BodyId)>,
) -> Vec<Island> {
    let mut visited: HashSet<BodyId> = HashSet::new();
    let mut islands = Vec::new();

    for (seed_id, seed) in bodies.iter() {
        if seed.body_type != BodyType::Dynamic || !seed.awake || !seed.enabled {
            continue;
        }
        if visited.contains(&seed_id) {
            continue;
        }

        let mut stack = vec![seed_id];
        let mut island_bodies = Vec::new();
        let mut island_contacts = Vec::new();
        let mut island_joints = Vec::new();
        let mut seen_contacts: HashSet<ContactId> = HashSet::new();
        let mut seen_joints: HashSet<JointId> = HashSet::new();

        while let Some(body_id) = stack.pop() {
            if visited.contains(&body_id) {
                continue;
            }
            visited.insert(body_id);
            island_bodies.push(body_id);

            if let Some(cids) = body_contacts.get(body_id) {
                for &cid in cids {
                    let Some(contact) = contacts.get(cid) else { continue };
                    if !contact.is_touching || contact.is_sensor || !contact.enabled {
                        continue;
                    }
                    if seen_contacts.insert(cid) {
                        island_contacts.push(cid);
                    }
                    let other = if contact.body_a == body_id { contact.body_b } else { contact.body_a };
                    if let Some(other_body) = bodies.get(other) {
                        if other_body.body_type == BodyType::Dynamic && !visited.contains(&other) {
                            stack.push(other);
                        }
                    }
                }
            }

            if let Some(jids) = body_joints.get(body_id) {
                for &jid in jids {
                    let Some(&(ja, jb)) = joint_bodies.get(jid) else { continue };
                    if seen_joints.insert(jid) {
                        island_joints.push(jid);
                    }
                    let other = if ja == body_id { jb } else { ja };
                    if let Some(other_body) = bodies.get(other) {
                        if other_body.body_type == BodyType::Dynamic && !visited.contains(&other) {
                            stack.push(other);
                        }
                    }
                }
            }
        }

        islands.push(Island {
            bodies: island_bodies,
            contacts: island_contacts,
            joints: island_joints,
        });
    }

    islands
}

/// Whether every dynamic body in the island has been below the sleep
/// velocity thresholds long enough to put the whole island to sleep.
pub fn island_can_sleep(
    island: &Island,
    bodies: &slotmap::SlotMap<BodyId, BodyData>,
    min_still_time: f32,
) -> bool {
    for &id in &island.bodies {
        let Some(b) = bodies.get(id) else { continue };
        if !b.enable_sleep || b.sleep_time < min_still_time {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyDef;
    use slotmap::SlotMap;

    #[test]
    fn disjoint_dynamic_bodies_form_separate_islands() {
        let mut bodies: SlotMap<BodyId, BodyData> = SlotMap::with_key();
        let def = BodyDef {
            body_type: BodyType::Dynamic,
            ..BodyDef::default()
        };
        let a = bodies.insert(BodyData::from_def(&def));
        let b = bodies.insert(BodyData::from_def(&def));

        let contacts: SlotMap<ContactId, Contact> = SlotMap::with_key();
        let body_contacts: SecondaryMap<BodyId, Vec<ContactId>> = SecondaryMap::new();
        let body_joints: SecondaryMap<BodyId, Vec<JointId>> = SecondaryMap::new();
        let joint_bodies: SecondaryMap<JointId, (BodyId, BodyId)> = SecondaryMap::new();

        let islands = build_islands(&bodies, &contacts, &body_contacts, &body_joints, &joint_bodies);
        assert_eq!(islands.len(), 2);
        let _ = (a, b);
    }
}
