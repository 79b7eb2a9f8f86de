//! Pursuit movement toward a remembered enemy position.
//!
//! Target *selection* (line of sight, hearing) is an external collaborator;
//! this module only decides where to walk given what that collaborator last
//! reported. When the trail goes cold it picks a plausible search heading
//! (bounce off the wall ahead, or swing a random multiple of 45°) and
//! commits to it for a hunt interval so the actor doesn't dither. Ledges
//! are probed before every step; unsupported headings are swept for a
//! supported one instead of walking off.

use std::collections::VecDeque;

use nalgebra as na;
use rand::Rng;
use shared::{bottom_supported, turn_toward, CollisionBackend, Quat, Transform, Vec3};

use crate::actor::Actor;

/// Breadcrumb trail cap; older entries fall off.
pub const TRAIL_LIMIT: usize = 30;

/// How long a committed search heading is held (s).
const HUNT_COMMIT: f32 = 1.0;
const HUNT_COMMIT_LEDGE: f32 = 0.5;

/// How far past an obstacle or rotation a search objective is projected,
/// in multiples of the probe vector.
const SEARCH_PROJECTION: f32 = 30.0;

/// Record `pos` on a breadcrumb trail if it has moved at least
/// `spacing_sq` (squared meters) from the newest crumb.
pub fn add_breadcrumb(trail: &mut VecDeque<Vec3>, pos: Vec3, spacing_sq: f32) {
    if trail
        .back()
        .map_or(false, |newest| (pos - newest).norm_squared() < spacing_sq)
    {
        return;
    }
    if trail.len() >= TRAIL_LIMIT {
        trail.pop_front();
    }
    trail.push_back(pos);
}

/// One tick of chase movement.
///
/// `visible_target` is the targeting collaborator's current answer: the
/// enemy position (or a breadcrumb of theirs) this actor can see, if any.
pub fn chase_walk<B: CollisionBackend + ?Sized>(
    actor: &mut Actor,
    backend: &mut B,
    visible_target: Option<Vec3>,
    turn_rate: f32,
    delta: f32,
) {
    let Some(t) = backend.transform(actor.body) else {
        return;
    };
    if actor.hunt_time > 0.0 {
        actor.hunt_time -= delta;
    }
    let fwd = -(t.rotation * Vec3::z());
    let probe = fwd * (actor.motion.max_speed * delta + actor.capsule.radius);
    let up_axis = na::Unit::new_normalize(t.rotation * Vec3::y());

    let mut objective = actor.last_enemy_pos;
    if actor.hunt_time <= 0.0 {
        match visible_target {
            Some(pos) => objective = pos,
            None => {
                // Trail is cold: bounce off whatever is ahead, or pick a
                // random swing and commit to it for a while.
                if let Some(hit) = backend.cast_ray(t.translation, t.translation + probe) {
                    let bounce = probe - hit.normal * (2.0 * probe.dot(&hit.normal));
                    objective = hit.position + bounce * SEARCH_PROJECTION;
                } else {
                    let ang = f32::from(actor.rng.gen_range(0..4u8)) * 45f32.to_radians();
                    objective =
                        t.translation + (Quat::from_axis_angle(&up_axis, ang) * probe) * SEARCH_PROJECTION;
                }
                actor.hunt_time = HUNT_COMMIT;
            }
        }
    }

    // Never walk off a ledge while hunting; sweep for a supported heading.
    let clearance = actor.capsule.floor_clearance();
    if !actor.stationary
        && !bottom_supported(backend, actor.body, actor.capsule.radius, clearance, probe)
    {
        actor.motion.velocity = actor.motion.gravity.fall;
        let clockwise = actor.rng.gen_bool(0.5);
        for i in 0..8u32 {
            let step = if clockwise { i } else { 7 - i };
            let ang = (step as f32) * 45f32.to_radians();
            let heading = Quat::from_axis_angle(&up_axis, ang) * probe;
            if bottom_supported(backend, actor.body, actor.capsule.radius, clearance, heading) {
                actor.hunt_time = HUNT_COMMIT_LEDGE;
                objective = t.translation
                    + heading.normalize() * (actor.capsule.radius * SEARCH_PROJECTION);
            }
        }
    }

    if (objective - t.translation).norm_squared() > 0.0 {
        actor.last_enemy_pos = objective;
    }

    // Close enough is close enough; stop shoving into the victim.
    let close = actor.capsule.radius + 0.5;
    if (actor.last_enemy_pos - t.translation).norm_squared() > close * close {
        let rotation = turn_toward(
            &t.rotation,
            t.translation,
            actor.last_enemy_pos,
            actor.capsule.radius,
            turn_rate,
            delta,
        );
        backend.set_transform(actor.body, Transform::new(t.translation, rotation));
        actor.move_input.z = if actor.stationary { 0.0 } else { -1.0 };
    } else {
        actor.move_input.z = 0.0;
    }
}
