//! Fixed-step per-actor simulation tick.
//!
//! Within one actor's tick the order is fixed and load-bearing:
//! control intent, floor probe, gravity-frame reaction and reorientation,
//! state-specific steering, motion integration (friction → acceleration →
//! gravity delta → jump), slide-move resolution, support/water updates, and
//! finally the state-machine rules that may react to what just happened.
//! Across actors no ordering is guaranteed; nothing here relies on it.

use shared::constants::{DIST_EPS, FLOOR_MAX_ANGLE};
use shared::{
    bottom_supported, probe_floor, reorient, sample_water, CollisionBackend, SlideParams,
    Transform, Vec3, WaterVolume,
};

use crate::actor::Actor;
use crate::chase::{add_breadcrumb, chase_walk};
use crate::control::ControlPolicy;
use crate::path::{PathStep, WaypointSource};
use crate::state::{ActorHooks, ActorState, StateCtx};

/// Turn rate used by pathing and chasing steering (fraction of the
/// remaining angle per second).
const STEER_TURN_RATE: f32 = 10.0;

/// Breadcrumb spacing (squared meters).
const BREADCRUMB_SPACING_SQ: f32 = 1.0;

/// Per-tick collaborators.
pub struct TickCtx<'a> {
    pub hooks: &'a mut dyn ActorHooks,
    pub waypoints: &'a dyn WaypointSource,
    /// Liquid volumes the actor may be immersed in.
    pub water: &'a [WaterVolume],
    /// From the external targeting collaborator: the enemy position this
    /// actor can currently see (or a breadcrumb of theirs), if any.
    pub visible_enemy: Option<Vec3>,
    /// Whether the tracked enemy is alive, per the same collaborator.
    pub enemy_alive: bool,
}

/// Advance one actor by one fixed step.
pub fn actor_tick<B: CollisionBackend>(
    actor: &mut Actor,
    policy: &mut dyn ControlPolicy,
    backend: &mut B,
    ctx: &mut TickCtx<'_>,
    delta: f32,
) {
    if actor.state == ActorState::Removed {
        return;
    }
    actor.age += delta;
    if actor.state_timer > 0.0 {
        actor.state_timer -= delta;
    }
    if actor.damaged > 0.0 {
        actor.damaged -= delta;
    }
    if actor.teleport_delay > 0.0 {
        actor.teleport_delay -= delta;
    }

    // Control intent. The dead don't steer.
    if actor.state != ActorState::Dead {
        let frame = policy.control(actor);
        actor.move_input = frame.move_input;
        if frame.jump {
            actor.motion.jumping = true;
        }
        if actor.is_player {
            if let Some(speed) = frame.max_speed {
                actor.motion.max_speed = speed;
            }
        }
    }

    let Some(start) = backend.transform(actor.body) else {
        log::warn!("actor body {:?} missing from collision backend", actor.body);
        return;
    };

    // Floor probe.
    let reach = actor.capsule.floor_clearance() + actor.capsule.radius;
    let contact = probe_floor(backend, actor.body, actor.motion.gravity.dir, reach);
    if contact.is_some() && actor.floor_contact.is_none() {
        ctx.hooks.just_landed(actor.motion.gravity.fall.norm());
    }
    actor.floor_contact = contact;

    // Gravity reaction and basis reorientation.
    let band = actor.tunables.blend_band;
    if actor
        .motion
        .gravity
        .react_to_contact(actor.floor_contact.as_ref(), &band)
    {
        let ratio = actor.motion.planar_speed() / actor.motion.max_speed.max(DIST_EPS);
        let rotation = reorient(
            &start.rotation,
            actor.motion.gravity.dir,
            ratio,
            delta,
            &actor.tunables.reorient_rate,
        );
        backend.set_transform(actor.body, Transform::new(start.translation, rotation));
    }

    // State-specific steering.
    match actor.state {
        ActorState::Pathing => path_tick(actor, backend, ctx, delta),
        ActorState::Chase => {
            chase_walk(actor, backend, ctx.visible_enemy, STEER_TURN_RATE, delta);
        }
        _ => {}
    }

    // Movement intent in world space, from the possibly-updated basis.
    let oriented = backend.transform(actor.body).unwrap_or(start);
    actor.motion.set_wish(&oriented.rotation, actor.move_input);

    // Integrate and resolve.
    let held = actor.grabbed_by.is_some();
    if actor.motion.flying {
        actor.motion.fly_integrate(&actor.tunables, held, delta);
    } else {
        actor.motion.integrate(&actor.tunables, held, delta);
    }
    let params = SlideParams {
        up: -actor.motion.gravity.dir,
        snap_len: if actor.motion.on_floor {
            actor.capsule.floor_clearance()
        } else {
            0.0
        },
        max_slope: FLOOR_MAX_ANGLE,
    };
    let resolved = backend.slide_move(actor.body, actor.motion.velocity, &params, delta);
    actor.motion.velocity = resolved.velocity;
    actor.motion.on_floor = resolved.on_floor;

    // Base support and immersion, at the resolved position.
    actor.motion.bottom_supported = !actor.motion.on_floor
        || bottom_supported(
            backend,
            actor.body,
            actor.capsule.radius,
            actor.capsule.floor_clearance(),
            Vec3::zeros(),
        );
    let settled = backend.transform(actor.body).unwrap_or(oriented);
    let sampled = sample_water(
        ctx.water,
        settled.translation,
        -actor.motion.gravity.dir,
        &actor.capsule,
    );
    actor.apply_water(sampled, ctx.hooks);

    // State rules last, so they see this tick's outcome.
    let mut sctx = StateCtx {
        hooks: &mut *ctx.hooks,
        waypoints: ctx.waypoints,
        origin: settled.translation,
    };
    actor.idle_rules(ctx.enemy_alive, &mut sctx);
    actor.run_think(&mut sctx);

    if actor.is_player {
        add_breadcrumb(
            &mut actor.chase_trail,
            settled.translation,
            BREADCRUMB_SPACING_SQ,
        );
    }
}

fn path_tick<B: CollisionBackend>(
    actor: &mut Actor,
    backend: &mut B,
    ctx: &mut TickCtx<'_>,
    delta: f32,
) {
    let Some(t) = backend.transform(actor.body) else {
        return;
    };
    let step = actor.path.step(
        t.translation,
        actor.capsule.floor_clearance(),
        actor.motion.max_speed,
        delta,
    );
    match step {
        PathStep::Steer(target) => {
            let rotation = shared::turn_toward(
                &t.rotation,
                t.translation,
                target,
                actor.capsule.radius,
                STEER_TURN_RATE,
                delta,
            );
            backend.set_transform(actor.body, Transform::new(t.translation, rotation));
            actor.move_input.z = -1.0;
        }
        PathStep::Finished => {
            actor.move_input.z = 0.0;
            let mut sctx = StateCtx {
                hooks: &mut *ctx.hooks,
                waypoints: ctx.waypoints,
                origin: t.translation,
            };
            actor.change_state(ActorState::Idle, &mut sctx);
        }
    }
}
