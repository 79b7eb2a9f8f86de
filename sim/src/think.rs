//! Deferred scripted callbacks.
//!
//! An actor can have at most one pending "think": a named routine and a due
//! time on its local clock. Routines are an enum rather than stringly-named
//! methods, resolved at dispatch without any lookup.

use serde::{Deserialize, Serialize};
use shared::Vec3;

use crate::actor::{Actor, SpawnFlags};
use crate::path::PathLoop;
use crate::state::{ActorState, SoundChannel, SoundCue, StateCtx};

/// Routines a think can dispatch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThinkRoutine {
    /// Spawn entry point: dispatches the spawn flags into a starting state.
    Start,
    /// Gib without sound cues from other channels; used by gibbed-at-spawn.
    SilentGib,
}

/// At most one pending routine with its due time.
#[derive(Clone, Debug, Default)]
pub struct ThinkSchedule {
    pending: Option<(ThinkRoutine, f32)>,
}

impl ThinkSchedule {
    pub fn schedule(&mut self, routine: ThinkRoutine, due: f32) {
        self.pending = Some((routine, due));
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<(ThinkRoutine, f32)> {
        self.pending
    }

    /// Consume the pending routine if its time has come.
    pub fn take_due(&mut self, now: f32) -> Option<ThinkRoutine> {
        match self.pending {
            Some((routine, due)) if now > due => {
                self.pending = None;
                Some(routine)
            }
            _ => None,
        }
    }
}

impl Actor {
    /// Schedule `routine` to run `delay` seconds from now, replacing any
    /// pending think.
    pub fn set_think(&mut self, routine: ThinkRoutine, delay: f32) {
        self.think.schedule(routine, self.age + delay);
    }

    /// Run the pending think routine if it is due.
    pub fn run_think(&mut self, ctx: &mut StateCtx<'_>) {
        let Some(routine) = self.think.take_due(self.age) else {
            return;
        };
        match routine {
            ThinkRoutine::Start => self.start_routine(ctx),
            ThinkRoutine::SilentGib => self.silent_gib(ctx),
        }
    }

    /// Dispatch spawn flags into the actor's first real state.
    fn start_routine(&mut self, ctx: &mut StateCtx<'_>) {
        if self.spawn_flags.contains(SpawnFlags::GIB) {
            self.state_timer = self.spawn_variant.map(|v| v as f32).unwrap_or(0.0);
            self.change_state(ActorState::GibStart, ctx);
            return;
        }
        if self.spawn_flags.contains(SpawnFlags::DEAD) {
            self.change_state(ActorState::DeadStart, ctx);
            return;
        }
        self.stationary = self.spawn_flags.contains(SpawnFlags::STATIONARY);
        if self.spawn_flags.contains(SpawnFlags::TELESPAWN) {
            self.change_state(ActorState::Telespawn, ctx);
        }
        if self.spawn_flags.contains(SpawnFlags::AMBUSH) {
            self.change_state(ActorState::Ambush, ctx);
        } else if self.spawn_flags.contains(SpawnFlags::PATHING) {
            self.stationary = false;
            self.path.loop_mode = match self.spawn_variant {
                Some(1) => PathLoop::Loop,
                Some(2) => PathLoop::PingPong,
                _ => PathLoop::Once,
            };
            self.change_state(ActorState::Pathing, ctx);
        }
        if self.state == ActorState::Start {
            self.change_state(ActorState::Idle, ctx);
        }
    }

    /// Reduce to gibs without the usual fanfare: motion stops dead, health
    /// zeroes, and the state machine's health rule takes it from there.
    pub fn silent_gib(&mut self, ctx: &mut StateCtx<'_>) {
        self.health = 0;
        self.gibbed = true;
        self.motion.velocity = Vec3::zeros();
        self.motion.gravity.clear_fall();
        ctx.hooks.play_sound(SoundChannel::Body, SoundCue::Gib);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Waypoint, WaypointSource};
    use crate::state::NullHooks;
    use shared::{BodyId, CapsuleSpec};

    struct NoWaypoints;

    impl WaypointSource for NoWaypoints {
        fn waypoints_in_group(&self, _group: &str) -> Vec<Waypoint> {
            Vec::new()
        }
    }

    fn actor() -> Actor {
        Actor::new(
            BodyId(0),
            CapsuleSpec {
                radius: 0.5,
                half_height: 0.5,
            },
            3,
        )
    }

    fn run(a: &mut Actor) {
        let src = NoWaypoints;
        let mut hooks = NullHooks;
        let mut ctx = StateCtx {
            hooks: &mut hooks,
            waypoints: &src,
            origin: Vec3::zeros(),
        };
        a.run_think(&mut ctx);
    }

    #[test]
    fn think_fires_only_once_its_time_comes() {
        let mut a = actor();
        // Spawned with `Start` due at 0.01.
        run(&mut a);
        assert_eq!(a.state, ActorState::Start);
        a.age = 0.05;
        run(&mut a);
        assert_eq!(a.state, ActorState::Idle);
        assert!(a.think.pending().is_none());
    }

    #[test]
    fn start_dispatches_ambush_flag() {
        let mut a = actor();
        a.spawn_flags = SpawnFlags::AMBUSH | SpawnFlags::STATIONARY;
        a.age = 1.0;
        run(&mut a);
        assert_eq!(a.state, ActorState::Ambush);
        assert!(a.stationary);
    }

    #[test]
    fn start_dispatches_dead_flag_without_voice() {
        let mut a = actor();
        a.spawn_flags = SpawnFlags::DEAD;
        a.age = 1.0;
        run(&mut a);
        assert_eq!(a.state, ActorState::Dead);
        assert_eq!(a.health, 0);
    }

    #[test]
    fn start_dispatches_pathing_loop_mode_from_variant() {
        let mut a = actor();
        a.spawn_flags = SpawnFlags::PATHING | SpawnFlags::STATIONARY;
        a.spawn_variant = Some(2);
        a.age = 1.0;
        run(&mut a);
        // Empty waypoint group: falls back to Idle, but the loop mode and
        // the stationary override were applied on the way.
        assert_eq!(a.state, ActorState::Idle);
        assert_eq!(a.path.loop_mode, PathLoop::PingPong);
        assert!(!a.stationary);
    }

    #[test]
    fn gib_flag_schedules_a_silent_gib() {
        let mut a = actor();
        a.spawn_flags = SpawnFlags::GIB;
        a.spawn_variant = Some(2);
        a.age = 1.0;
        run(&mut a);
        assert_eq!(a.state, ActorState::GibStart);
        let (routine, due) = a.think.pending().expect("silent gib scheduled");
        assert_eq!(routine, ThinkRoutine::SilentGib);
        assert!((due - 3.0).abs() < 1.0e-5);

        a.age = 3.5;
        run(&mut a);
        assert!(a.gibbed);
        assert_eq!(a.health, 0);
    }
}
