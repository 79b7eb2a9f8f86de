/*!
Turn-toward-target steering about an actor's local up axis.

Actors face along their local -Z axis. Steering projects the direction to
the target onto the plane perpendicular to the current up axis, measures the
signed angle from the forward axis, and rotates either instantly or at a
rate scaled by delta. Targets inside the dead radius (typically the
collision radius) are ignored to prevent jitter when standing on top of a
waypoint or victim.
*/

use nalgebra as na;

use crate::collision::{Quat, Vec3};
use crate::constants::DIST_EPS;

/// Component of `target - origin` perpendicular to `axis`.
#[inline]
pub fn planar_offset(origin: Vec3, target: Vec3, axis: Vec3) -> Vec3 {
    let d = target - origin;
    d - axis * (d.dot(&axis) / axis.norm_squared().max(DIST_EPS))
}

/// Squared distance from `origin` to `target` measured in the plane
/// perpendicular to `axis`.
#[inline]
pub fn planar_distance_sq(origin: Vec3, target: Vec3, axis: Vec3) -> f32 {
    planar_offset(origin, target, axis).norm_squared()
}

/// Rotate `orientation` about its up axis toward `target`.
///
/// With `turn_rate > 0` the rotation advances by `angle * turn_rate * delta`
/// this tick; otherwise it is applied in full. Degenerate cases (target in
/// the dead zone, already facing within ~2.5°, target directly behind with
/// no sideways lean) leave the orientation unchanged or pick a deterministic
/// turn direction rather than producing NaN.
pub fn turn_toward(
    orientation: &Quat,
    origin: Vec3,
    target: Vec3,
    dead_radius: f32,
    turn_rate: f32,
    delta: f32,
) -> Quat {
    let up = orientation * Vec3::y();
    let to_target = planar_offset(origin, target, up);
    if to_target.norm() < dead_radius.max(DIST_EPS) {
        return *orientation;
    }
    let dir = to_target.normalize();
    let fwd = -(orientation * Vec3::z());
    let aligned = fwd.dot(&dir);
    if aligned > 0.999 {
        return *orientation;
    }
    let angle = aligned.clamp(-1.0, 1.0).acos();
    let up_axis = na::Unit::new_normalize(up);
    // The "left" axis decides which way around is shorter.
    let left = Quat::from_axis_angle(&up_axis, std::f32::consts::FRAC_PI_2) * fwd;
    let lean = left.dot(&dir);
    let signed = if lean.abs() < DIST_EPS {
        angle
    } else {
        angle * lean.signum()
    };
    let step = if turn_rate > 0.0 {
        signed * turn_rate * delta
    } else {
        signed
    };
    Quat::from_axis_angle(&up_axis, step) * orientation
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_offset_removes_axis_component() {
        let off = planar_offset(
            Vec3::zeros(),
            Vec3::new(3.0, 5.0, 4.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(off, Vec3::new(3.0, 0.0, 4.0), epsilon = 1.0e-6);
    }

    #[test]
    fn instant_turn_faces_target() {
        // Target off to the +X side; identity faces -Z.
        let q = turn_toward(
            &Quat::identity(),
            Vec3::zeros(),
            Vec3::new(10.0, 0.0, 0.0),
            0.5,
            0.0,
            0.0,
        );
        let fwd = -(q * Vec3::z());
        assert_relative_eq!(fwd, Vec3::new(1.0, 0.0, 0.0), epsilon = 1.0e-4);
    }

    #[test]
    fn turn_direction_takes_the_short_way() {
        let target = Vec3::new(1.0, 0.0, -1.0);
        let q = turn_toward(&Quat::identity(), Vec3::zeros(), target, 0.1, 2.0, 0.1);
        let fwd = -(q * Vec3::z());
        // A partial step should have rotated toward +X, not -X.
        assert!(fwd.x > 0.0);
        assert!(fwd.x < 0.71, "partial step must not reach the target yet");
    }

    #[test]
    fn dead_zone_suppresses_rotation() {
        let q = turn_toward(
            &Quat::identity(),
            Vec3::zeros(),
            Vec3::new(0.2, 0.0, 0.1),
            0.5,
            0.0,
            0.0,
        );
        assert_relative_eq!(q.angle_to(&Quat::identity()), 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn already_facing_is_a_no_op() {
        let q = turn_toward(
            &Quat::identity(),
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, -5.0),
            0.5,
            0.0,
            0.0,
        );
        assert_relative_eq!(q.angle_to(&Quat::identity()), 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn target_directly_behind_still_turns() {
        let q = turn_toward(
            &Quat::identity(),
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 5.0),
            0.5,
            0.0,
            0.0,
        );
        let fwd = -(q * Vec3::z());
        assert_relative_eq!(fwd, Vec3::new(0.0, 0.0, 1.0), epsilon = 1.0e-4);
    }

    #[test]
    fn elevation_is_ignored() {
        // Target far above but slightly ahead: only the planar part matters.
        let q = turn_toward(
            &Quat::identity(),
            Vec3::zeros(),
            Vec3::new(0.0, 50.0, -5.0),
            0.5,
            0.0,
            0.0,
        );
        assert_relative_eq!(q.angle_to(&Quat::identity()), 0.0, epsilon = 1.0e-6);
    }
}
