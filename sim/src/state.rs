//! The locomotion state machine.
//!
//! Transitions are explicit and atomic: `change_state` records the previous
//! state, swaps in the new one, then runs exit and enter effects
//! back-to-back, so other components never observe a half-applied transition.
//! `Removed` is terminal; once entered, further transitions are ignored.
//!
//! Animation, sound and trigger side effects go through [`ActorHooks`] so
//! the machine can run against stub collaborators in tests. A missing
//! variant or an empty waypoint group degrades to a logged no-op, never an
//! error.

use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::Vec3;

use crate::actor::Actor;
use crate::path::WaypointSource;
use crate::think::ThinkRoutine;

/// Locomotion states. Combat states layered on by game code should map onto
/// `Chase`/`Ambush` or drive the actor directly between transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    /// Pre-spawn: waiting for the `start` think routine.
    Start,
    Idle,
    Pain,
    Dead,
    /// Holding still and silent until disturbed.
    Ambush,
    /// Pursuing a remembered enemy position.
    Chase,
    /// Walking a waypoint group.
    Pathing,
    /// Spawn-dead entry: forces health to zero and falls through to `Dead`
    /// without the death voice line.
    DeadStart,
    /// Spawn-gibbed entry: schedules a silent gib.
    GibStart,
    /// Dormant until triggered into the world.
    Telespawn,
    /// Terminal. Only lifecycle teardown may set it; transitions out are
    /// ignored.
    Removed,
}

/// Sound effect channels, mirroring the four per-actor emitters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundChannel {
    Voice,
    Weapon,
    Item,
    Body,
}

/// Abstract sound cues; the host maps them to actual samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Pain,
    Die,
    Gib,
    WaterEnter,
    WaterExit,
}

/// Side-effect sink for state transitions and movement events.
///
/// All methods default to no-ops so tests and headless hosts can implement
/// only what they observe.
pub trait ActorHooks {
    /// Play a named animation variant on the actor's rig.
    fn play_animation(&mut self, name: &str) {
        let _ = name;
    }

    fn play_sound(&mut self, channel: SoundChannel, cue: SoundCue) {
        let _ = (channel, cue);
    }

    /// Fire a named trigger target (doors, counters, scripted events).
    fn fire_trigger(&mut self, target: &str) {
        let _ = target;
    }

    /// The actor regained floor contact after being airborne;
    /// `impact_speed` is the fall speed at touchdown.
    fn just_landed(&mut self, impact_speed: f32) {
        let _ = impact_speed;
    }

    /// The actor entered the terminal `Removed` state.
    fn actor_removed(&mut self) {}
}

/// Hooks that ignore every effect.
pub struct NullHooks;

impl ActorHooks for NullHooks {}

/// Collaborators a state transition may need.
pub struct StateCtx<'a> {
    pub hooks: &'a mut dyn ActorHooks,
    pub waypoints: &'a dyn WaypointSource,
    /// The actor's current world position (owned by the collision backend).
    pub origin: Vec3,
}

impl Actor {
    /// Transition to `new`, running exit then enter effects.
    ///
    /// A no-op when already `Removed`. Both effect phases run even when an
    /// individual effect degrades (missing variants are logged and skipped).
    pub fn change_state(&mut self, new: ActorState, ctx: &mut StateCtx<'_>) {
        if self.state == ActorState::Removed {
            log::debug!("ignoring state change to {new:?}: actor is removed");
            return;
        }
        self.previous_state = self.state;
        self.state = new;
        self.state_exit(ctx);
        self.state_enter(ctx);
    }

    fn state_exit(&mut self, _ctx: &mut StateCtx<'_>) {
        // Waypoints are only held while pathing.
        if self.previous_state == ActorState::Pathing && self.state != ActorState::Pathing {
            self.path.clear();
        }
    }

    pub(crate) fn state_enter(&mut self, ctx: &mut StateCtx<'_>) {
        match self.state {
            ActorState::Pain => {
                self.move_input = Vec3::zeros();
                if self.pain_variants.is_empty() {
                    log::debug!("no pain animation variants");
                } else {
                    let pick = self.rng.gen_range(0..self.pain_variants.len());
                    ctx.hooks.play_animation(&self.pain_variants[pick]);
                }
                ctx.hooks.play_sound(SoundChannel::Voice, SoundCue::Pain);
            }
            ActorState::Dead => {
                if self.previous_state != ActorState::Dead {
                    if let Some(target) = self.trigger_target.take() {
                        ctx.hooks.fire_trigger(&target);
                    }
                    self.move_input = Vec3::zeros();
                    if !self.gibbed {
                        if self.death_variants.is_empty() {
                            log::debug!("no death animation variants");
                        } else {
                            let pick = self.rng.gen_range(0..self.death_variants.len());
                            ctx.hooks.play_animation(&self.death_variants[pick]);
                        }
                        if self.previous_state != ActorState::DeadStart {
                            ctx.hooks.play_sound(SoundChannel::Voice, SoundCue::Die);
                        }
                    }
                }
            }
            ActorState::Pathing => {
                let group = self.path_group.clone();
                if !self.path.acquire(ctx.waypoints, &group, ctx.origin) {
                    log::debug!("waypoint group {group:?} is empty; idling");
                    self.change_state(ActorState::Idle, ctx);
                }
            }
            ActorState::DeadStart => {
                self.health = 0;
                self.change_state(ActorState::Dead, ctx);
                if let Some(variant) = self.spawn_variant {
                    ctx.hooks.play_animation(&format!("die{variant}"));
                }
            }
            ActorState::GibStart => {
                self.set_think(ThinkRoutine::SilentGib, self.state_timer.max(0.0));
            }
            ActorState::Start
            | ActorState::Idle
            | ActorState::Ambush
            | ActorState::Chase
            | ActorState::Telespawn
            | ActorState::Removed => {}
        }
    }

    /// Per-tick state-independent rules:
    /// - non-player speed caps follow alertness while idle
    /// - damage interrupts pathing and ambushes
    /// - health at or below zero forces `Dead`
    ///
    /// `enemy_alive` comes from the external targeting collaborator and
    /// refreshes the alert flag.
    pub fn idle_rules(&mut self, enemy_alive: bool, ctx: &mut StateCtx<'_>) {
        match self.state {
            ActorState::Idle => {
                if !self.is_player {
                    self.motion.max_speed = if self.mad {
                        self.tunables.run_speed
                    } else {
                        self.tunables.walk_speed
                    };
                }
            }
            ActorState::Pathing | ActorState::Ambush => {
                if self.damaged > 0.0 {
                    self.change_state(ActorState::Idle, ctx);
                }
            }
            _ => {}
        }
        self.mad = enemy_alive;
        if self.health <= 0 && self.state != ActorState::Dead {
            self.change_state(ActorState::Dead, ctx);
        }
    }

    /// A trigger fired at this actor: wake telespawners, interrupt strolls
    /// and ambushes, and drop any docility. The dead (and players) cannot
    /// be triggered.
    pub fn trigger(&mut self, ctx: &mut StateCtx<'_>) {
        if self.is_player
            || matches!(self.state, ActorState::Dead | ActorState::Removed)
        {
            return;
        }
        if self.state == ActorState::Telespawn {
            self.change_state(ActorState::Idle, ctx);
        }
        self.spawn_flags.remove(crate::actor::SpawnFlags::DOCILE);
        if matches!(self.state, ActorState::Ambush | ActorState::Pathing) {
            self.change_state(ActorState::Idle, ctx);
        }
        self.mad = true;
    }

    /// Terminal teardown. Players are never removed.
    pub fn remove(&mut self, hooks: &mut dyn ActorHooks) {
        if self.is_player {
            return;
        }
        self.state = ActorState::Removed;
        self.think.clear();
        hooks.actor_removed();
    }
}
