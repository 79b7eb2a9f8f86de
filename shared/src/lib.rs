/*!
Backend-independent actor locomotion math.

Everything in this crate operates on plain `nalgebra` values plus the small
collision-backend abstraction in [`collision`]. No game rules live here:
the `sim` crate owns actors, states and pathing, and drives these building
blocks once per fixed simulation step.
*/

pub mod collision;
pub mod constants;
pub mod gravity;
pub mod motion;
pub mod steering;
pub mod water;

pub use collision::{
    BodyId, CapsuleSpec, CollisionBackend, FloorContact, Iso, Quat, SlideParams, SlideResult,
    Transform, Vec3, bottom_supported, probe_floor,
};
pub use gravity::{BlendBand, GravityFrame, GravityMode, ReorientRate, aligned_to_gravity, reorient};
pub use motion::{MotionState, MoveTunables};
pub use steering::{planar_distance_sq, planar_offset, turn_toward};
pub use water::{Liquid, WaterState, WaterVolume, sample_water};
