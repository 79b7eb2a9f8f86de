//! Actor persistence.
//!
//! The record carries every piece of actor state under a stable named key,
//! including the transform, which the collision backend owns at runtime.
//! Where the record goes (file, network, save slot) is the caller's
//! business; serde gives it whatever structured format the host wants.
//!
//! Loading into an actor already in the terminal `Removed` state is
//! silently ignored.

use serde::{Deserialize, Serialize};
use shared::{CollisionBackend, Liquid, Quat, Transform, Vec3, WaterState};

use crate::actor::{Actor, SpawnFlags};
use crate::path::{PathLoop, WaypointSource};
use crate::state::{ActorHooks, ActorState, StateCtx};
use crate::think::ThinkRoutine;

/// Full snapshot of one actor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorRecord {
    // State and scripting
    pub spawn_flags: u32,
    pub current_state: ActorState,
    pub previous_state: ActorState,
    pub state_timer: f32,
    pub think: Option<ThinkRoutine>,
    pub next_think: f32,
    pub age: f32,
    // Navigation
    pub origin: [f32; 3],
    pub rotation: [f32; 4],
    pub velocity: [f32; 3],
    pub grav_dir: [f32; 3],
    pub grav_vector: [f32; 3],
    pub flying: bool,
    pub move_input: [f32; 3],
    pub on_floor: bool,
    pub jumping: bool,
    pub bottom_supported: bool,
    pub friction_delay: f32,
    pub water_level: u8,
    pub water_kind: u8,
    pub max_speed: f32,
    // Health
    pub health: i32,
    pub health_max: i32,
    pub gibbed: bool,
    pub weight: f32,
    pub damaged: f32,
    pub teleport_delay: f32,
    pub grabbed_by: Option<u32>,
    // AI
    pub mad: bool,
    pub stationary: bool,
    pub last_enemy_pos: [f32; 3],
    pub hunt_time: f32,
    pub path_group: String,
    pub path_cursor: usize,
    pub path_loop: PathLoop,
    pub spawn_variant: Option<i32>,
    pub trigger_target: Option<String>,
}

fn pack3(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

fn unpack3(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

fn pack_rot(q: Quat) -> [f32; 4] {
    let c = q.coords;
    [c.x, c.y, c.z, c.w]
}

fn unpack_rot(a: [f32; 4]) -> Quat {
    Quat::from_quaternion(nalgebra::Quaternion::new(a[3], a[0], a[1], a[2]))
}

/// Snapshot `actor`, reading its transform from the backend.
pub fn save_actor<B: CollisionBackend + ?Sized>(actor: &Actor, backend: &B) -> ActorRecord {
    let transform = backend.transform(actor.body).unwrap_or_default();
    let (think, next_think) = match actor.think.pending() {
        Some((routine, due)) => (Some(routine), due),
        None => (None, 0.0),
    };
    ActorRecord {
        spawn_flags: actor.spawn_flags.bits(),
        current_state: actor.state,
        previous_state: actor.previous_state,
        state_timer: actor.state_timer,
        think,
        next_think,
        age: actor.age,
        origin: pack3(transform.translation),
        rotation: pack_rot(transform.rotation),
        velocity: pack3(actor.motion.velocity),
        grav_dir: pack3(actor.motion.gravity.dir),
        grav_vector: pack3(actor.motion.gravity.fall),
        flying: actor.motion.flying,
        move_input: pack3(actor.move_input),
        on_floor: actor.motion.on_floor,
        jumping: actor.motion.jumping,
        bottom_supported: actor.motion.bottom_supported,
        friction_delay: actor.motion.friction_delay,
        water_level: actor.motion.water.level,
        water_kind: actor.motion.water.kind.index(),
        max_speed: actor.motion.max_speed,
        health: actor.health,
        health_max: actor.health_max,
        gibbed: actor.gibbed,
        weight: actor.weight,
        damaged: actor.damaged,
        teleport_delay: actor.teleport_delay,
        grabbed_by: actor.grabbed_by.map(|b| b.0),
        mad: actor.mad,
        stationary: actor.stationary,
        last_enemy_pos: pack3(actor.last_enemy_pos),
        hunt_time: actor.hunt_time,
        path_group: actor.path_group.clone(),
        path_cursor: actor.path.cursor,
        path_loop: actor.path.loop_mode,
        spawn_variant: actor.spawn_variant,
        trigger_target: actor.trigger_target.clone(),
    }
}

/// Restore `actor` from a record.
///
/// The transform is pushed back into the backend, and a pathing actor
/// re-acquires its waypoint group before the saved cursor is restored.
/// A no-op when the actor is already `Removed`.
pub fn load_actor<B: CollisionBackend + ?Sized>(
    actor: &mut Actor,
    backend: &mut B,
    record: &ActorRecord,
    hooks: &mut dyn ActorHooks,
    waypoints: &dyn WaypointSource,
) {
    if actor.state == ActorState::Removed {
        log::debug!("ignoring actor load: actor is removed");
        return;
    }
    actor.spawn_flags = SpawnFlags::from_bits_truncate(record.spawn_flags);
    actor.state = record.current_state;
    actor.previous_state = record.previous_state;
    actor.state_timer = record.state_timer;
    actor.think.clear();
    if let Some(routine) = record.think {
        actor.think.schedule(routine, record.next_think);
    }
    actor.age = record.age;

    let origin = unpack3(record.origin);
    backend.set_transform(
        actor.body,
        Transform::new(origin, unpack_rot(record.rotation)),
    );
    actor.motion.velocity = unpack3(record.velocity);
    actor.motion.gravity.dir = unpack3(record.grav_dir);
    actor.motion.gravity.fall = unpack3(record.grav_vector);
    actor.motion.flying = record.flying;
    actor.move_input = unpack3(record.move_input);
    actor.motion.on_floor = record.on_floor;
    actor.motion.jumping = record.jumping;
    actor.motion.bottom_supported = record.bottom_supported;
    actor.motion.friction_delay = record.friction_delay;
    actor.motion.water = WaterState {
        level: record.water_level,
        kind: Liquid::from_index(record.water_kind),
    };
    actor.motion.max_speed = record.max_speed;

    actor.health = record.health;
    actor.health_max = record.health_max;
    actor.gibbed = record.gibbed;
    actor.weight = record.weight;
    actor.damaged = record.damaged;
    actor.teleport_delay = record.teleport_delay;
    actor.grabbed_by = record.grabbed_by.map(shared::BodyId);

    actor.mad = record.mad;
    actor.stationary = record.stationary;
    actor.last_enemy_pos = unpack3(record.last_enemy_pos);
    actor.hunt_time = record.hunt_time;
    actor.path_group = record.path_group.clone();
    actor.path.loop_mode = record.path_loop;
    actor.spawn_variant = record.spawn_variant;
    actor.trigger_target = record.trigger_target.clone();

    // A pathing actor needs its waypoint snapshot back before the cursor
    // can mean anything.
    if actor.state == ActorState::Pathing {
        let mut ctx = StateCtx {
            hooks,
            waypoints,
            origin,
        };
        actor.state_enter(&mut ctx);
        if actor.state == ActorState::Pathing {
            actor.path.cursor = record.path_cursor.min(actor.path.points.len().saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Waypoint;
    use crate::state::NullHooks;
    use shared::collision::planes::PlaneWorld;
    use shared::{BodyId, CapsuleSpec};

    struct Patrol;

    impl WaypointSource for Patrol {
        fn waypoints_in_group(&self, _group: &str) -> Vec<Waypoint> {
            vec![
                Waypoint {
                    index: 0,
                    position: Vec3::new(0.0, 1.0, 0.0),
                },
                Waypoint {
                    index: 1,
                    position: Vec3::new(8.0, 1.0, 0.0),
                },
                Waypoint {
                    index: 2,
                    position: Vec3::new(8.0, 1.0, 8.0),
                },
            ]
        }
    }

    fn world_and_actor() -> (PlaneWorld, Actor) {
        let mut world = PlaneWorld::flat_floor(0.0);
        let body = world.spawn_body(
            Transform::new(Vec3::new(2.0, 1.0, 3.0), Quat::identity()),
            CapsuleSpec {
                radius: 0.5,
                half_height: 0.5,
            },
        );
        (
            world,
            Actor::new(
                body,
                CapsuleSpec {
                    radius: 0.5,
                    half_height: 0.5,
                },
                23,
            ),
        )
    }

    #[test]
    fn record_round_trips_through_json() {
        let (world, mut actor) = world_and_actor();
        actor.state = ActorState::Pathing;
        actor.path_group = "patrol".to_owned();
        actor.motion.velocity = Vec3::new(1.0, 2.0, 3.0);
        actor.motion.gravity.dir = Vec3::new(1.0, 0.0, 0.0);
        actor.health = 37;
        actor.mad = true;
        {
            let mut hooks = NullHooks;
            let mut ctx = StateCtx {
                hooks: &mut hooks,
                waypoints: &Patrol,
                origin: Vec3::new(2.0, 1.0, 3.0),
            };
            actor.state_enter(&mut ctx);
        }
        actor.path.cursor = 2;

        let record = save_actor(&actor, &world);
        let json = serde_json::to_string(&record).expect("record serializes");
        let parsed: ActorRecord = serde_json::from_str(&json).expect("record parses");

        let (mut world2, mut restored) = world_and_actor();
        restored.state = ActorState::Idle;
        let mut hooks = NullHooks;
        load_actor(&mut restored, &mut world2, &parsed, &mut hooks, &Patrol);

        assert_eq!(restored.state, ActorState::Pathing);
        assert_eq!(restored.health, 37);
        assert!(restored.mad);
        assert_eq!(restored.path.cursor, 2);
        assert_eq!(restored.path.points.len(), 3);
        assert_eq!(restored.motion.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(restored.motion.gravity.dir, Vec3::new(1.0, 0.0, 0.0));
        let t = world2.transform(restored.body).unwrap();
        assert_eq!(t.translation, world.transform(actor.body).unwrap().translation);
    }

    #[test]
    fn load_into_removed_actor_is_ignored() {
        let (mut world, mut actor) = world_and_actor();
        let record = save_actor(&actor, &world);
        let mut hooks = NullHooks;
        actor.remove(&mut hooks);
        load_actor(&mut actor, &mut world, &record, &mut hooks, &Patrol);
        assert_eq!(actor.state, ActorState::Removed);
    }

    #[test]
    fn every_motion_field_survives_the_trip() {
        let (world, mut actor) = world_and_actor();
        actor.motion.on_floor = false;
        actor.motion.jumping = true;
        actor.motion.bottom_supported = false;
        actor.motion.friction_delay = 0.07;
        actor.motion.flying = true;
        actor.motion.water = WaterState {
            level: 2,
            kind: Liquid::Slime,
        };
        actor.motion.gravity.fall = Vec3::new(0.0, -3.0, 0.0);
        actor.weight = 2.5;
        actor.grabbed_by = Some(BodyId(9));

        let record = save_actor(&actor, &world);
        let (mut world2, mut restored) = world_and_actor();
        let mut hooks = NullHooks;
        load_actor(&mut restored, &mut world2, &record, &mut hooks, &Patrol);

        assert!(!restored.motion.on_floor);
        assert!(restored.motion.jumping);
        assert!(!restored.motion.bottom_supported);
        assert_eq!(restored.motion.friction_delay, 0.07);
        assert!(restored.motion.flying);
        assert_eq!(restored.motion.water.level, 2);
        assert_eq!(restored.motion.water.kind, Liquid::Slime);
        assert_eq!(restored.motion.gravity.fall, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(restored.weight, 2.5);
        assert_eq!(restored.grabbed_by, Some(BodyId(9)));
    }
}
