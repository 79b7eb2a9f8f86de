/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data
exchanged between:
- the floor probe (short ray along the gravity vector)
- the slide-move resolver (sweep-and-slide against the static world)
- the gravity frame, which reacts to probe contacts
*/

use nalgebra as na;

use crate::gravity::GravityMode;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Convert to nalgebra `Isometry3` for use with narrow-phase queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

/// Capsule specification for kinematic actors.
///
/// `half_height` is the half-length of the cylinder section (aligned with the
/// actor's local up axis), so the total capsule height is
/// `2*half_height + 2*radius`.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Distance from the capsule center to its lowest point: how far "feet"
    /// are below the origin, and how far floor probes must reach.
    #[inline]
    pub fn floor_clearance(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// Opaque handle for a kinematic body owned by a collision backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub u32);

/// A surface contact reported by a ray probe.
///
/// Carries the surface's gravity reaction mode so the gravity frame can decide
/// whether (and how) to adopt the contact normal as its new down direction.
#[derive(Clone, Copy, Debug)]
pub struct FloorContact {
    /// World-space impact point.
    pub position: Vec3,
    /// World-space surface normal at the impact point.
    pub normal: Vec3,
    /// How surfaces of this collider reorient actor gravity.
    pub gravity_mode: GravityMode,
}

/// Result of a slide-move resolution.
#[derive(Clone, Copy, Debug)]
pub struct SlideResult {
    /// Velocity after clipping against the surfaces hit during the move.
    pub velocity: Vec3,
    /// Whether the body ended the move supported by walkable ground.
    pub on_floor: bool,
}
