/*!
Velocity integration for kinematic actors.

Each fixed step the integrator applies, in this order: friction, then
ground/air/water acceleration, then this tick's gravity delta, then any
pending jump impulse. The order is not commutative (friction must see the
pre-acceleration velocity, and the friction grace window consumed by jumps
is what makes chained jumps keep their speed), so [`MotionState::integrate`]
is the only supported entry point outside of tests.

All sub-steps work on the velocity with the accumulated fall component
removed, so planar movement never fights gravity, and re-add it afterwards.
*/

use crate::collision::{Quat, Vec3};
use crate::constants::{
    ACCELERATION, AIR_ACCELERATION, AIR_WISH_FLOOR, DIST_EPS, EDGE_FRICTION_SCALE, FLOOR_STICK,
    FLY_INPUT_LIFT, FLY_SINK_RATE, FRICTION, FRICTION_GRACE, GRAVITY, JUMP_STRENGTH,
    REST_SPEED_EPS, RUN_SPEED, STOP_SPEED, SWIM_ACCEL_SCALE, WALK_SPEED, WATER_ACCELERATION,
    WATER_FRICTION,
};
use crate::gravity::{BlendBand, GravityFrame, ReorientRate};
use crate::water::WaterState;

/// Per-actor movement tunables, set at spawn and rarely touched afterwards.
///
/// The blend band and the edge-friction multiplier are empirically tuned
/// values with no derivation on record; they live here (rather than as
/// hard-coded invariants) so designers can revisit them.
#[derive(Clone, Debug)]
pub struct MoveTunables {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub stop_speed: f32,
    pub acceleration: f32,
    pub air_acceleration: f32,
    pub water_acceleration: f32,
    pub friction: f32,
    pub water_friction: f32,
    pub jump_strength: f32,
    /// Gravitational acceleration magnitude (m/s^2).
    pub gravity: f32,
    /// Friction multiplier while the actor's base is only partially supported.
    pub edge_friction_scale: f32,
    /// Acceptance band for `Blend`-mode gravity reorientation.
    pub blend_band: BlendBand,
    /// Speed-scaled basis reorientation rate.
    pub reorient_rate: ReorientRate,
}

impl Default for MoveTunables {
    fn default() -> Self {
        Self {
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            stop_speed: STOP_SPEED,
            acceleration: ACCELERATION,
            air_acceleration: AIR_ACCELERATION,
            water_acceleration: WATER_ACCELERATION,
            friction: FRICTION,
            water_friction: WATER_FRICTION,
            jump_strength: JUMP_STRENGTH,
            gravity: GRAVITY,
            edge_friction_scale: EDGE_FRICTION_SCALE,
            blend_band: BlendBand::default(),
            reorient_rate: ReorientRate::default(),
        }
    }
}

/// The mutable movement state of one actor.
#[derive(Clone, Debug)]
pub struct MotionState {
    /// Current velocity, fall component included (m/s).
    pub velocity: Vec3,
    /// Gravity direction and accumulated fall.
    pub gravity: GravityFrame,
    /// Supported by walkable ground as of the last slide move.
    pub on_floor: bool,
    /// Whether the whole base is over ground (false near ledges).
    pub bottom_supported: bool,
    /// Flying actors ignore sink-or-swim gravity shaping.
    pub flying: bool,
    /// A jump was requested and has not been consumed yet.
    pub jumping: bool,
    /// Remaining post-landing friction suspension (s).
    pub friction_delay: f32,
    /// Immersion level and liquid kind.
    pub water: WaterState,
    /// Current speed cap (m/s); `walk_speed` or `run_speed` in normal play.
    pub max_speed: f32,
    /// Unit movement intent in world space, or zero.
    pub wish_dir: Vec3,
    /// Vertical intent this tick: -1 crouch/sink, 0, +1 rise.
    pub vertical_input: f32,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            gravity: GravityFrame::default(),
            on_floor: true,
            bottom_supported: true,
            flying: false,
            jumping: false,
            friction_delay: 0.0,
            water: WaterState::default(),
            max_speed: WALK_SPEED,
            wish_dir: Vec3::zeros(),
            vertical_input: 0.0,
        }
    }
}

impl MotionState {
    /// Resolve this tick's movement intent into a world-space wish direction.
    ///
    /// `input` is expressed in the actor's local frame (x strafe, y vertical,
    /// z forward/back) and rotated by its orientation basis.
    pub fn set_wish(&mut self, orientation: &Quat, input: Vec3) {
        let world = orientation * input;
        self.wish_dir = if world.norm_squared() > DIST_EPS * DIST_EPS {
            world.normalize()
        } else {
            Vec3::zeros()
        };
        self.vertical_input = input.y;
    }

    /// Planar speed: velocity with the fall component removed.
    #[inline]
    pub fn planar_speed(&self) -> f32 {
        (self.velocity - self.gravity.fall).norm()
    }

    /// Apply friction to the planar velocity.
    ///
    /// Skipped entirely during the post-landing grace window, which is
    /// decremented here and consumed once it reaches zero.
    pub fn friction(&mut self, tun: &MoveTunables, delta: f32) {
        if self.on_floor && self.friction_delay > 0.0 {
            self.friction_delay = (self.friction_delay - delta).max(0.0);
            return;
        }
        let mut vel = self.velocity - self.gravity.fall;
        let speed = vel.norm();
        if speed < REST_SPEED_EPS {
            // Snap sub-threshold drift to pure fall.
            self.velocity = self.gravity.fall;
            return;
        }
        let mut drop = 0.0;
        if self.water.swimming() {
            drop = speed * tun.water_friction * f32::from(self.water.level) * delta;
        } else if self.on_floor || self.flying {
            drop = speed.max(tun.stop_speed) * tun.friction * delta;
            if !self.bottom_supported && !self.flying {
                drop *= tun.edge_friction_scale;
            }
        }
        if drop > 0.0 {
            vel *= (speed - drop).max(0.0) / speed;
        }
        self.velocity = vel + self.gravity.fall;
    }

    /// Ground/swim acceleration toward the wish direction, capped so one tick
    /// never pushes the along-wish speed past the wish speed.
    pub fn accelerate(&mut self, tun: &MoveTunables, delta: f32) {
        let vel = self.velocity - self.gravity.fall;
        let wish_speed = self.wish_dir.norm() * self.max_speed;
        let add_speed = wish_speed - vel.dot(&self.wish_dir);
        if add_speed <= 0.0 {
            return;
        }
        let rate = if self.water.swimming() {
            tun.water_acceleration * SWIM_ACCEL_SCALE
        } else {
            tun.acceleration
        };
        let accel = (rate * delta * wish_speed).min(add_speed);
        self.velocity = vel + self.wish_dir * accel + self.gravity.fall;
    }

    /// Airborne acceleration. A small minimum wish speed keeps a touch of
    /// air control available even with near-zero input.
    pub fn air_accelerate(&mut self, tun: &MoveTunables, delta: f32) {
        let vel = self.velocity - self.gravity.fall;
        let wish_speed = self.wish_dir.norm() * self.max_speed;
        let add_speed = wish_speed.max(AIR_WISH_FLOOR) - vel.dot(&self.wish_dir);
        if add_speed <= 0.0 {
            return;
        }
        let accel = (tun.air_acceleration * delta * wish_speed).min(add_speed);
        self.velocity = vel + self.wish_dir * accel + self.gravity.fall;
    }

    /// Apply swim strokes and pending ground jumps.
    pub fn jump(&mut self, tun: &MoveTunables) {
        if self.water.swimming() || self.flying {
            if self.vertical_input != 0.0 {
                let strength = self.water.kind.swim_jump_strength();
                self.gravity.clear_fall();
                self.velocity -= self.gravity.dir * strength * self.vertical_input;
            }
        } else if self.jumping {
            self.jumping = false;
            if self.on_floor {
                self.on_floor = false;
                self.friction_delay = FRICTION_GRACE;
                self.gravity.clear_fall();
                self.velocity -= self.gravity.dir * tun.jump_strength;
            }
        }
    }

    /// The full walking/falling integration for one tick. Held actors coast:
    /// no friction, no acceleration, no jumps.
    pub fn integrate(&mut self, tun: &MoveTunables, held: bool, delta: f32) {
        self.gravity
            .accrue(tun.gravity, delta, !self.on_floor && !held);
        if held {
            return;
        }
        self.friction(tun, delta);
        if self.on_floor || self.water.swimming() {
            self.accelerate(tun, delta);
        } else {
            self.air_accelerate(tun, delta);
        }
        self.velocity += self.gravity.accel;
        self.jump(tun);
    }

    /// Integration for flyers and swimmers: sink-or-swim gravity shaping
    /// instead of free fall, ground-style acceleration throughout, and an
    /// overall speed cap for true flyers.
    pub fn fly_integrate(&mut self, tun: &MoveTunables, held: bool, delta: f32) {
        if self.wish_dir.norm_squared() > 0.0 {
            // Active input holds depth; vertical intent adjusts it.
            self.gravity.fall = Vec3::zeros();
            self.gravity.accel = -self.gravity.dir * self.vertical_input * FLY_INPUT_LIFT * delta;
        } else if self.flying {
            self.gravity.accel = Vec3::zeros();
        } else {
            self.gravity.accel = self.gravity.dir * FLY_SINK_RATE * delta;
            if self.on_floor {
                self.gravity.fall = Vec3::zeros();
                self.gravity.accel = self.gravity.dir * FLOOR_STICK;
            }
        }
        self.gravity.fall += self.gravity.accel;
        if held {
            return;
        }
        self.friction(tun, delta);
        self.accelerate(tun, delta);
        self.velocity += self.gravity.accel;
        self.jump(tun);
        if self.flying {
            let speed = self.velocity.norm();
            if speed > self.max_speed {
                self.velocity *= self.max_speed / speed;
            }
        }
    }

    /// Directional impulse scaled down by weight.
    pub fn knockback(&mut self, dir: Vec3, power: f32, weight: f32) {
        self.velocity += dir * (power / weight.max(0.1));
    }

    /// Pop the actor off the ground: cancel the current fall and push
    /// opposite gravity, scaled down by weight.
    pub fn popup(&mut self, power: f32, weight: f32) {
        self.velocity -= self.gravity.fall + self.gravity.dir * (power / weight.max(0.1));
        self.gravity.clear_fall();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::Liquid;
    use approx::assert_relative_eq;

    const DOWN: Vec3 = Vec3::new(0.0, -1.0, 0.0);

    fn grounded() -> MotionState {
        MotionState::default()
    }

    #[test]
    fn friction_reference_scenario() {
        // friction=4.0, stop_speed=3.125, v=(5,0,0), delta=0.1:
        // drop = max(5, 3.125) * 4.0 * 0.1 = 2.0 → speed 5 → 3.
        let mut m = grounded();
        m.velocity = Vec3::new(5.0, 0.0, 0.0);
        m.friction(&MoveTunables::default(), 0.1);
        assert_relative_eq!(m.velocity, Vec3::new(3.0, 0.0, 0.0), epsilon = 1.0e-5);
    }

    #[test]
    fn friction_at_rest_is_idempotent() {
        let mut m = grounded();
        m.velocity = Vec3::new(1.0e-3, 0.0, 1.0e-3);
        m.friction(&MoveTunables::default(), 0.1);
        assert_relative_eq!(m.velocity, Vec3::zeros());
        m.friction(&MoveTunables::default(), 0.1);
        assert_relative_eq!(m.velocity, Vec3::zeros());
    }

    #[test]
    fn friction_never_reverses_direction() {
        let mut m = grounded();
        m.velocity = Vec3::new(0.5, 0.0, 0.0);
        // Enormous step: drop would exceed current speed.
        m.friction(&MoveTunables::default(), 10.0);
        assert_relative_eq!(m.velocity, Vec3::zeros());
    }

    #[test]
    fn friction_grace_window_suspends_and_decrements() {
        let mut m = grounded();
        m.velocity = Vec3::new(5.0, 0.0, 0.0);
        m.friction_delay = 0.1;
        m.friction(&MoveTunables::default(), 0.06);
        assert_relative_eq!(m.velocity, Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(m.friction_delay, 0.04, epsilon = 1.0e-6);
        m.friction(&MoveTunables::default(), 0.06);
        assert_relative_eq!(m.velocity, Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(m.friction_delay, 0.0);
        // Grace consumed; friction bites from here on.
        m.friction(&MoveTunables::default(), 0.1);
        assert!(m.velocity.norm() < 5.0);
    }

    #[test]
    fn friction_doubles_over_an_edge() {
        let tun = MoveTunables::default();
        let mut supported = grounded();
        supported.velocity = Vec3::new(5.0, 0.0, 0.0);
        supported.friction(&tun, 0.1);

        let mut hanging = grounded();
        hanging.velocity = Vec3::new(5.0, 0.0, 0.0);
        hanging.bottom_supported = false;
        hanging.friction(&tun, 0.1);

        assert_relative_eq!(supported.velocity.x, 3.0, epsilon = 1.0e-5);
        assert_relative_eq!(hanging.velocity.x, 1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn friction_preserves_fall_component() {
        let mut m = grounded();
        m.on_floor = false;
        m.flying = true; // flying actors take ground friction while airborne
        m.gravity.fall = DOWN * 2.0;
        m.velocity = Vec3::new(5.0, -2.0, 0.0);
        m.friction(&MoveTunables::default(), 0.1);
        assert_relative_eq!(m.velocity.y, -2.0, epsilon = 1.0e-5);
        assert_relative_eq!(m.velocity.x, 3.0, epsilon = 1.0e-5);
    }

    #[test]
    fn acceleration_never_overshoots_wish_speed() {
        let mut m = grounded();
        m.max_speed = 10.0;
        m.wish_dir = Vec3::new(1.0, 0.0, 0.0);
        // Huge delta makes add_speed the binding constraint.
        m.accelerate(&MoveTunables::default(), 10.0);
        assert_relative_eq!(m.velocity.dot(&m.wish_dir), 10.0, epsilon = 1.0e-4);
        // A second tick adds nothing.
        m.accelerate(&MoveTunables::default(), 10.0);
        assert_relative_eq!(m.velocity.dot(&m.wish_dir), 10.0, epsilon = 1.0e-4);
    }

    #[test]
    fn air_acceleration_keeps_minimum_control() {
        let mut m = grounded();
        m.on_floor = false;
        m.max_speed = 10.0;
        // Near-zero input still allows a little correction.
        m.wish_dir = Vec3::new(1.0, 0.0, 0.0) * 1.0e-3;
        let before = m.velocity;
        m.air_accelerate(&MoveTunables::default(), 0.1);
        assert!(m.velocity.x > before.x);
        // But the wish-speed scaling keeps it tiny.
        assert!(m.velocity.x < 0.01);
    }

    #[test]
    fn jump_reference_scenario() {
        // on_floor, jump_strength=8.4375, gravity (0,-1,0): the fall component
        // becomes +8.4375 up, on_floor clears, grace window opens.
        let mut m = grounded();
        m.jumping = true;
        m.jump(&MoveTunables::default());
        assert_relative_eq!(m.velocity, Vec3::new(0.0, 8.4375, 0.0), epsilon = 1.0e-5);
        assert!(!m.on_floor);
        assert!(!m.jumping);
        assert_relative_eq!(m.friction_delay, FRICTION_GRACE);
        assert_relative_eq!(m.gravity.fall, Vec3::zeros());
    }

    #[test]
    fn jump_in_air_is_consumed_without_effect() {
        let mut m = grounded();
        m.on_floor = false;
        m.jumping = true;
        m.jump(&MoveTunables::default());
        assert!(!m.jumping);
        assert_relative_eq!(m.velocity, Vec3::zeros());
    }

    #[test]
    fn swim_stroke_strength_depends_on_liquid() {
        for (kind, strength) in [
            (Liquid::Water, 3.125),
            (Liquid::Slime, 2.5),
            (Liquid::Lava, 1.5625),
        ] {
            let mut m = grounded();
            m.water = WaterState { level: 2, kind };
            m.vertical_input = 1.0;
            m.jump(&MoveTunables::default());
            assert_relative_eq!(m.velocity, Vec3::new(0.0, strength, 0.0), epsilon = 1.0e-5);
        }
    }

    #[test]
    fn integrate_runs_substeps_in_order() {
        // Friction must see the pre-acceleration velocity: starting above the
        // wish speed, friction bleeds speed first and acceleration then tops
        // back up toward (but not past) max_speed.
        let mut m = grounded();
        m.max_speed = 10.0;
        m.velocity = Vec3::new(12.0, 0.0, 0.0);
        m.wish_dir = Vec3::new(1.0, 0.0, 0.0);
        m.integrate(&MoveTunables::default(), false, 0.1);
        // After friction: 12 - 12*4*0.1 = 7.2; accel adds min(10*0.1*10, 2.8).
        assert_relative_eq!(m.velocity.x, 10.0, epsilon = 1.0e-4);
    }

    #[test]
    fn held_actor_coasts() {
        let mut m = grounded();
        m.on_floor = false;
        m.velocity = Vec3::new(3.0, 0.0, 0.0);
        m.wish_dir = Vec3::new(1.0, 0.0, 0.0);
        m.integrate(&MoveTunables::default(), true, 0.1);
        // Held: gravity zeroed, velocity untouched.
        assert_relative_eq!(m.gravity.fall, Vec3::zeros());
        assert_relative_eq!(m.velocity, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn fly_integrate_caps_overall_speed() {
        let mut m = grounded();
        m.flying = true;
        m.on_floor = false;
        m.max_speed = 5.0;
        m.velocity = Vec3::new(20.0, 0.0, 0.0);
        m.fly_integrate(&MoveTunables::default(), false, 0.016);
        assert!(m.velocity.norm() <= 5.0 + 1.0e-4);
    }

    #[test]
    fn popup_cancels_fall_before_pushing() {
        let mut m = grounded();
        m.on_floor = false;
        m.gravity.fall = DOWN * 4.0;
        m.velocity = DOWN * 4.0;
        m.popup(2.0, 1.0);
        assert_relative_eq!(m.velocity, Vec3::new(0.0, 2.0, 0.0), epsilon = 1.0e-5);
        assert_relative_eq!(m.gravity.fall, Vec3::zeros());
    }

    #[test]
    fn knockback_scales_by_weight() {
        let mut light = grounded();
        light.knockback(Vec3::new(1.0, 0.0, 0.0), 4.0, 0.5);
        assert_relative_eq!(light.velocity.x, 8.0);

        let mut heavy = grounded();
        heavy.knockback(Vec3::new(1.0, 0.0, 0.0), 4.0, 2.0);
        assert_relative_eq!(heavy.velocity.x, 2.0);
    }
}
