//! The actor data model: movement state, health, AI memory, and spawn
//! configuration for one kinematic body.
//!
//! Actors own everything except their position and orientation; those live
//! in the collision backend, and this crate only ever computes deltas
//! against them.

use std::collections::VecDeque;

use bitflags::bitflags;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::constants::{WATER_ENTRY_DAMP, WATER_EXIT_DAMP};
use shared::{
    BodyId, CapsuleSpec, CollisionBackend, FloorContact, MotionState, MoveTunables, Transform,
    Vec3, WaterState,
};

use crate::path::PathWalker;
use crate::state::{ActorHooks, ActorState, SoundChannel, SoundCue};
use crate::think::ThinkSchedule;

bitflags! {
    /// Spawn-time behavior flags, dispatched by the `start` think routine.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SpawnFlags: u32 {
        /// Hold still and silent until disturbed.
        const AMBUSH = 1 << 0;
        /// Walk a waypoint group from spawn; loop mode comes from the
        /// spawn variant (0 once, 1 loop, 2 ping-pong).
        const PATHING = 1 << 1;
        /// Spawn dormant; materialize when triggered.
        const TELESPAWN = 1 << 2;
        /// Never self-propel (turrets, worshippers).
        const STATIONARY = 1 << 3;
        /// Spawn already dead, skipping death sounds.
        const DEAD = 1 << 4;
        /// Spawn gibbed after a delay given by the spawn variant.
        const GIB = 1 << 5;
        /// Ignore enemies until triggered.
        const DOCILE = 1 << 6;
    }
}

/// One simulated actor.
pub struct Actor {
    /// Handle of this actor's body in the collision backend.
    pub body: BodyId,
    /// Player-controlled actors take speed caps from their control policy
    /// instead of the alert/calm selection, and can never be removed.
    pub is_player: bool,
    pub capsule: CapsuleSpec,
    pub tunables: MoveTunables,
    pub motion: MotionState,
    /// This tick's movement intent in the actor's local frame
    /// (x strafe, y vertical, z forward/back). Not retained across ticks.
    pub move_input: Vec3,
    /// Mass proxy for knockback scaling.
    pub weight: f32,
    /// Latest floor-probe result.
    pub floor_contact: Option<FloorContact>,

    // State machine
    pub state: ActorState,
    pub previous_state: ActorState,
    pub state_timer: f32,
    /// Counts down after taking damage; pathing/ambush break off while set.
    pub damaged: f32,
    /// Cooldown preventing immediate re-teleports.
    pub teleport_delay: f32,
    /// Some while held by another entity; held actors coast and do not fall.
    pub grabbed_by: Option<BodyId>,

    // Health
    pub health: i32,
    pub health_max: i32,
    pub gibbed: bool,

    // AI memory
    /// Alerted: an enemy is known and alive.
    pub mad: bool,
    pub stationary: bool,
    pub last_enemy_pos: Vec3,
    /// While positive, chase movement keeps its current objective instead of
    /// re-evaluating visibility.
    pub hunt_time: f32,
    /// Recent positions, newest last, for pursuers to follow.
    pub chase_trail: VecDeque<Vec3>,
    pub path: PathWalker,
    /// Named waypoint group walked while pathing.
    pub path_group: String,

    // Spawn configuration
    pub spawn_flags: SpawnFlags,
    /// Free-form spawn parameter: death animation variant, gib delay,
    /// or path loop mode depending on the spawn flags.
    pub spawn_variant: Option<i32>,
    /// Fired once on first death.
    pub trigger_target: Option<String>,

    // Scripting
    pub think: ThinkSchedule,
    /// Actor-local clock, advanced every tick (s).
    pub age: f32,

    // Effect variant pools, picked from at random.
    pub pain_variants: Vec<String>,
    pub death_variants: Vec<String>,

    pub(crate) rng: StdRng,
}

impl Actor {
    /// Spawn an AI actor with the stock movement profile. `seed` fixes the
    /// variant/wander RNG so runs are reproducible.
    pub fn new(body: BodyId, capsule: CapsuleSpec, seed: u64) -> Self {
        let tunables = MoveTunables::default();
        let mut actor = Self {
            body,
            is_player: false,
            capsule,
            motion: MotionState {
                max_speed: tunables.walk_speed,
                ..MotionState::default()
            },
            tunables,
            move_input: Vec3::zeros(),
            weight: 1.0,
            floor_contact: None,
            state: ActorState::Start,
            previous_state: ActorState::Start,
            state_timer: 0.0,
            damaged: 0.0,
            teleport_delay: 0.0,
            grabbed_by: None,
            health: 100,
            health_max: 100,
            gibbed: false,
            mad: false,
            stationary: false,
            last_enemy_pos: Vec3::zeros(),
            hunt_time: 0.0,
            chase_trail: VecDeque::new(),
            path: PathWalker::default(),
            path_group: String::new(),
            spawn_flags: SpawnFlags::empty(),
            spawn_variant: None,
            trigger_target: None,
            think: ThinkSchedule::default(),
            age: 0.0,
            pain_variants: vec!["pain".to_owned()],
            death_variants: vec!["die".to_owned()],
            rng: StdRng::seed_from_u64(seed),
        };
        actor.set_think(crate::think::ThinkRoutine::Start, 0.01);
        actor
    }

    /// Spawn a player-controlled actor.
    pub fn new_player(body: BodyId, capsule: CapsuleSpec, seed: u64) -> Self {
        let mut actor = Self::new(body, capsule, seed);
        actor.is_player = true;
        actor
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.health > 0
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health;
    }

    /// Heal up to `health_max`. Returns false if already full or the amount
    /// is not positive.
    pub fn add_health(&mut self, amount: i32) -> bool {
        if amount > 0 && self.health < self.health_max {
            self.health = (self.health + amount).min(self.health_max);
            return true;
        }
        false
    }

    /// Record that damage landed this tick; pathing/ambush will break off.
    pub fn note_damage(&mut self) {
        self.damaged = 0.02;
    }

    /// Directional impulse, scaled down by this actor's weight.
    pub fn knockback(&mut self, dir: Vec3, power: f32) {
        let weight = self.weight;
        self.motion.knockback(dir, power, weight);
    }

    /// Launch off the ground opposite gravity, scaled down by weight.
    pub fn popup(&mut self, power: f32) {
        let weight = self.weight;
        self.motion.popup(power, weight);
    }

    /// Apply a sampled immersion state, running entry/exit transitions.
    pub fn apply_water(&mut self, sampled: WaterState, hooks: &mut dyn ActorHooks) {
        let was = self.motion.water;
        if sampled.level >= 1 && was.level < 1 {
            // Plunging in kills momentum and any accumulated fall.
            self.motion.velocity *= WATER_ENTRY_DAMP;
            self.motion.gravity.clear_fall();
            hooks.play_sound(SoundChannel::Body, SoundCue::WaterEnter);
        } else if sampled.level < 1 && was.level >= 1 {
            self.motion.velocity *= WATER_EXIT_DAMP;
            hooks.play_sound(SoundChannel::Body, SoundCue::WaterExit);
        }
        self.motion.water = sampled;
    }

    /// Relocate to `dest`, realigning motion with the destination frame:
    /// velocity is redirected along the destination facing with its planar
    /// magnitude preserved, gravity comes from the destination's down axis,
    /// and the accumulated fall keeps its magnitude along the new gravity.
    pub fn teleport<B: CollisionBackend + ?Sized>(&mut self, backend: &mut B, dest: Transform) {
        let planar = (self.motion.velocity - self.motion.gravity.fall).norm();
        let fall_len = self.motion.gravity.fall.norm();
        let fwd = -(dest.rotation * Vec3::z());
        self.motion.gravity.dir = -(dest.rotation * Vec3::y());
        self.motion.gravity.fall = self.motion.gravity.dir * fall_len;
        self.motion.velocity = fwd * planar + self.motion.gravity.fall;
        backend.set_transform(self.body, dest);
    }
}
