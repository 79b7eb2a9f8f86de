/*!
Per-actor gravity state.

An actor's "down" is a unit vector, not a world constant: sloped floors,
ceiling-walk surfaces and scripted overrides can all change it. This module
keeps that direction, the accumulated free-fall velocity, and the math that
rebuilds an actor's orientation basis around a new down direction.
*/

use nalgebra as na;

use crate::collision::{FloorContact, Quat, Vec3};
use crate::constants::{
    BLEND_MAX, BLEND_MIN, DIST_EPS, REORIENT_ALIGN_EPS_SQ, REORIENT_RATE_MAX, REORIENT_RATE_MIN,
};

/// How a surface reorients the gravity of actors standing on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GravityMode {
    /// Leave actor gravity unchanged.
    Keep,
    /// Gravity becomes the negated surface normal.
    Set,
    /// Gravity becomes the surface normal itself (ceiling-walk surfaces).
    Flip,
    /// Adopt the negated normal only for moderate slope changes; see
    /// [`BlendBand`].
    #[default]
    Blend,
}

impl GravityMode {
    /// Stable index for backends that store modes as collider metadata.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Self::Keep => 0,
            Self::Set => 1,
            Self::Flip => 2,
            Self::Blend => 3,
        }
    }

    /// Inverse of [`Self::index`]; unknown values fall back to `Blend`.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Keep,
            1 => Self::Set,
            2 => Self::Flip,
            _ => Self::Blend,
        }
    }
}

/// Acceptance band for [`GravityMode::Blend`].
///
/// The dot product between the current gravity direction and the candidate
/// direction (negated contact normal) must land in `[min, max)`. Below `min`
/// the contact is a grazing hit on an unrelated steep surface; at or above
/// `max` the directions already agree and changing would only jitter.
/// Empirically tuned; kept configurable rather than asserted correct.
#[derive(Clone, Copy, Debug)]
pub struct BlendBand {
    pub min: f32,
    pub max: f32,
}

impl Default for BlendBand {
    fn default() -> Self {
        Self {
            min: BLEND_MIN,
            max: BLEND_MAX,
        }
    }
}

impl BlendBand {
    #[inline]
    pub fn accepts(&self, alignment: f32) -> bool {
        alignment >= self.min && alignment < self.max
    }
}

/// Basis reorientation rate range (fraction of the remaining rotation per
/// second), interpolated by planar speed: slow actors reorient gently
/// enough not to visibly snap, fast actors quickly enough not to lag.
/// Another empirically tuned pair kept configurable.
#[derive(Clone, Copy, Debug)]
pub struct ReorientRate {
    pub min: f32,
    pub max: f32,
}

impl Default for ReorientRate {
    fn default() -> Self {
        Self {
            min: REORIENT_RATE_MIN,
            max: REORIENT_RATE_MAX,
        }
    }
}

/// Gravity direction plus the accumulated free-fall component of velocity.
///
/// `fall` is the velocity the actor owes purely to gravity; the integrator
/// subtracts it before applying friction/acceleration and re-adds it after,
/// so planar movement math never fights the fall. `accel` is the change in
/// `fall` applied this tick.
#[derive(Clone, Debug)]
pub struct GravityFrame {
    /// Unit vector pointing "down" for this actor.
    pub dir: Vec3,
    /// Accumulated free-fall velocity (m/s). Zero while supported or held.
    pub fall: Vec3,
    /// This tick's change in `fall`.
    pub accel: Vec3,
}

impl Default for GravityFrame {
    fn default() -> Self {
        Self {
            dir: Vec3::new(0.0, -1.0, 0.0),
            fall: Vec3::zeros(),
            accel: Vec3::zeros(),
        }
    }
}

impl GravityFrame {
    pub fn new(dir: Vec3) -> Self {
        Self {
            dir,
            ..Self::default()
        }
    }

    /// React to a floor-probe contact, possibly adopting a new down direction.
    ///
    /// Returns `true` if the contact was accepted by its surface's mode (even
    /// when `Keep` leaves the direction unchanged), `false` when there was no
    /// contact or a `Blend` contact fell outside the acceptance band.
    pub fn react_to_contact(&mut self, contact: Option<&FloorContact>, band: &BlendBand) -> bool {
        let Some(contact) = contact else {
            return false;
        };
        let toward = -contact.normal;
        match contact.gravity_mode {
            GravityMode::Keep => true,
            GravityMode::Set => {
                self.dir = toward;
                true
            }
            GravityMode::Flip => {
                self.dir = contact.normal;
                true
            }
            GravityMode::Blend => {
                if band.accepts(self.dir.dot(&toward)) {
                    self.dir = toward;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Accumulate free fall while airborne; zero it while supported or held.
    pub fn accrue(&mut self, gravity: f32, delta: f32, airborne: bool) {
        let prev = self.fall;
        if airborne {
            self.fall += self.dir * gravity * delta;
            self.accel = self.fall - prev;
        } else {
            self.fall = Vec3::zeros();
            self.accel = Vec3::zeros();
        }
    }

    /// Drop the accumulated fall without touching `accel`. Used by jumps,
    /// grabs and water entry, which all replace the fall wholesale.
    #[inline]
    pub fn clear_fall(&mut self) {
        self.fall = Vec3::zeros();
    }
}

/// Rebuild an orthonormal basis whose up axis opposes `gravity_dir`, keeping
/// the facing direction as close to `current`'s as the new up allows.
///
/// The forward axis is recovered via cross products; when the old forward is
/// nearly parallel to the new up (the cross degenerates), the previous up and
/// then the previous right axis are tried as deterministic fallbacks.
pub fn aligned_to_gravity(current: &Quat, gravity_dir: Vec3) -> Quat {
    let up = -gravity_dir;
    let old_x = current * Vec3::x();
    let old_y = current * Vec3::y();
    let old_z = current * Vec3::z();

    let mut x = -old_z.cross(&up);
    if x.norm_squared() < DIST_EPS {
        x = -old_z.cross(&old_y);
        if x.norm_squared() < DIST_EPS {
            x = -old_z.cross(&old_x);
        }
    }
    // Orthonormalize against the (already unit) up axis.
    let x = (x - up * x.dot(&up)).normalize();
    let z = x.cross(&up);
    let m = na::Matrix3::from_columns(&[x, up, z]);
    Quat::from_rotation_matrix(&na::Rotation3::from_matrix_unchecked(m))
}

/// One reorientation step toward the gravity-aligned basis.
///
/// With `delta <= 0` the aligned basis is applied immediately. Otherwise the
/// orientation is slerped at a rate interpolated across `rate` by
/// `speed_ratio` (planar speed over max speed).
pub fn reorient(
    current: &Quat,
    gravity_dir: Vec3,
    speed_ratio: f32,
    delta: f32,
    rate: &ReorientRate,
) -> Quat {
    let up = current * Vec3::y();
    if (up + gravity_dir).norm_squared() < REORIENT_ALIGN_EPS_SQ {
        return *current;
    }
    let target = aligned_to_gravity(current, gravity_dir);
    if delta <= 0.0 {
        return target;
    }
    let ratio = speed_ratio.clamp(0.0, 1.0);
    let step = (rate.min + (rate.max - rate.min) * ratio) * delta;
    current.slerp(&target, step.min(1.0))
}
