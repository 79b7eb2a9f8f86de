//! Control policies: who decides movement intent and the speed cap.
//!
//! Instead of subclassing the actor, control is a strategy object queried
//! once per tick. The player policy maps device input; the AI policy passes
//! through whatever the steering code (pathing/chase) wrote and lets the
//! state machine pick the speed cap.

use shared::Vec3;

use crate::actor::Actor;

/// One tick's control decision.
#[derive(Clone, Copy, Debug)]
pub struct ControlFrame {
    /// Local-frame movement intent (x strafe, y vertical, z forward/back).
    pub move_input: Vec3,
    /// Speed cap override; `None` leaves the current cap alone.
    pub max_speed: Option<f32>,
    /// A ground jump was requested this tick.
    pub jump: bool,
}

/// Supplies `move_input` and the speed cap each tick.
pub trait ControlPolicy {
    fn control(&mut self, actor: &Actor) -> ControlFrame;
}

/// Digital input state for a player-controlled actor. `jump_pressed` is an
/// edge (consumed by the next control frame); the rest are held levels.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    /// Hold-to-walk modifier; released means run.
    pub walk: bool,
    pub jump_pressed: bool,
    pub jump_held: bool,
    pub crouch: bool,
}

/// Maps player input to movement intent.
///
/// Forward is -Z in the actor's local frame. A jump press on land queues a
/// ground jump; holding jump while swimming or flying rises instead, and
/// crouch on the ground forces walk speed with downward intent.
#[derive(Default)]
pub struct PlayerControlPolicy {
    pub input: PlayerInput,
}

impl ControlPolicy for PlayerControlPolicy {
    fn control(&mut self, actor: &Actor) -> ControlFrame {
        let i = self.input;
        let mut m = Vec3::zeros();
        m.z = f32::from(i.back) - f32::from(i.forward);
        m.x = f32::from(i.strafe_right) - f32::from(i.strafe_left);

        let mut speed = if i.walk {
            actor.tunables.walk_speed
        } else {
            actor.tunables.run_speed
        };
        let mut jump = false;

        if i.jump_held && actor.motion.flying {
            m.y = 1.0;
        } else if i.jump_pressed && !actor.motion.water.swimming() {
            m.y = 1.0;
            jump = true;
        } else if i.jump_held && actor.motion.water.swimming() {
            m.y = 1.0;
        } else if i.crouch && !actor.motion.water.swimming() && actor.motion.on_floor {
            m.y = -1.0;
            speed = actor.tunables.walk_speed;
        }

        self.input.jump_pressed = false;
        ControlFrame {
            move_input: m,
            max_speed: Some(speed),
            jump,
        }
    }
}

/// AI actors: steering code owns `move_input`, the state machine owns the
/// speed cap, so the policy passes both through.
#[derive(Default)]
pub struct AiControlPolicy;

impl ControlPolicy for AiControlPolicy {
    fn control(&mut self, actor: &Actor) -> ControlFrame {
        ControlFrame {
            move_input: actor.move_input,
            max_speed: None,
            jump: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BodyId, CapsuleSpec, Liquid, WaterState};

    fn actor() -> Actor {
        Actor::new(
            BodyId(0),
            CapsuleSpec {
                radius: 0.5,
                half_height: 0.5,
            },
            5,
        )
    }

    #[test]
    fn movement_axes_map_to_local_intent() {
        let a = actor();
        let mut policy = PlayerControlPolicy::default();
        policy.input.forward = true;
        policy.input.strafe_right = true;
        let frame = policy.control(&a);
        assert_eq!(frame.move_input.z, -1.0);
        assert_eq!(frame.move_input.x, 1.0);
        assert_eq!(frame.max_speed, Some(a.tunables.run_speed));
    }

    #[test]
    fn jump_press_is_an_edge() {
        let a = actor();
        let mut policy = PlayerControlPolicy::default();
        policy.input.jump_pressed = true;
        let frame = policy.control(&a);
        assert!(frame.jump);
        assert_eq!(frame.move_input.y, 1.0);

        // The press was consumed; holding does not re-jump on land.
        policy.input.jump_held = true;
        let frame = policy.control(&a);
        assert!(!frame.jump);
        assert_eq!(frame.move_input.y, 0.0);
    }

    #[test]
    fn held_jump_rises_while_swimming() {
        let mut a = actor();
        a.motion.water = WaterState {
            level: 2,
            kind: Liquid::Water,
        };
        let mut policy = PlayerControlPolicy::default();
        policy.input.jump_held = true;
        let frame = policy.control(&a);
        assert!(!frame.jump);
        assert_eq!(frame.move_input.y, 1.0);
    }

    #[test]
    fn crouch_forces_walk_speed() {
        let a = actor();
        let mut policy = PlayerControlPolicy::default();
        policy.input.crouch = true;
        let frame = policy.control(&a);
        assert_eq!(frame.move_input.y, -1.0);
        assert_eq!(frame.max_speed, Some(a.tunables.walk_speed));
    }

    #[test]
    fn ai_policy_passes_steering_intent_through() {
        let mut a = actor();
        a.move_input = Vec3::new(0.0, 0.0, -1.0);
        let mut policy = AiControlPolicy;
        let frame = policy.control(&a);
        assert_eq!(frame.move_input, a.move_input);
        assert!(frame.max_speed.is_none());
    }
}
