/*!
The collision backend abstraction.

Locomotion only ever computes velocity deltas; positions and orientations are
owned by whatever resolves collisions. This trait is the full surface the
`sim` crate needs from such a resolver: body transform access, a world ray
query, and a sweep-and-slide move. Two implementations ship in this crate:
an analytic half-space world for tests ([`super::planes`]) and a
rapier3d-backed world ([`super::rapier`]).
*/

use super::types::{BodyId, FloorContact, SlideResult, Transform, Vec3};

/// Floor-snap and slope parameters for one slide-move call.
#[derive(Clone, Copy, Debug)]
pub struct SlideParams {
    /// The actor's current up axis (opposite its gravity direction).
    pub up: Vec3,
    /// Maximum distance to snap down onto ground after the move (meters).
    /// Zero disables snapping; pass zero while airborne so jumps detach.
    pub snap_len: f32,
    /// Steepest angle from `up` (radians) still reported as floor.
    pub max_slope: f32,
}

/// A collision resolver that owns body transforms.
pub trait CollisionBackend {
    /// Current world transform of a body, or `None` for an unknown handle.
    fn transform(&self, body: BodyId) -> Option<Transform>;

    /// Overwrite a body's transform (orientation updates, teleports).
    /// Unknown handles are ignored.
    fn set_transform(&mut self, body: BodyId, transform: Transform);

    /// Cast a ray against the static world from `origin` to `cast_to`.
    /// Returns the nearest front-face hit, if any. Bodies are never hit.
    fn cast_ray(&self, origin: Vec3, cast_to: Vec3) -> Option<FloorContact>;

    /// Move a body by `velocity * delta`, sliding along obstacles, optionally
    /// snapping onto ground, and report the clipped velocity plus the
    /// resulting floor state.
    fn slide_move(
        &mut self,
        body: BodyId,
        velocity: Vec3,
        params: &SlideParams,
        delta: f32,
    ) -> SlideResult;
}

/// Short probe along the gravity vector for a supporting surface.
///
/// `reach` should cover the capsule's floor clearance plus its radius so that
/// slightly-separated ground (stairs, slopes mid-slide) still reports contact.
pub fn probe_floor<B: CollisionBackend + ?Sized>(
    backend: &B,
    body: BodyId,
    gravity_dir: Vec3,
    reach: f32,
) -> Option<FloorContact> {
    let t = backend.transform(body)?;
    backend.cast_ray(t.translation, t.translation + gravity_dir * reach)
}

/// Whether the body's base is fully supported by ground.
///
/// Four rays are cast from the body origin toward the corners of its base
/// (offset by `offset`, e.g. a step the actor is about to take) and down past
/// its floor clearance. Any miss means part of the base hangs over an edge.
pub fn bottom_supported<B: CollisionBackend + ?Sized>(
    backend: &B,
    body: BodyId,
    radius: f32,
    floor_clearance: f32,
    offset: Vec3,
) -> bool {
    let Some(t) = backend.transform(body) else {
        return false;
    };
    let x = t.rotation * Vec3::x();
    let y = t.rotation * Vec3::y();
    let z = t.rotation * Vec3::z();
    let origin = t.translation;
    for corner in [x + z, x - z, -x - z, -x + z] {
        let foot = corner * radius + origin + offset;
        if backend
            .cast_ray(origin, foot - y * floor_clearance - y)
            .is_none()
        {
            return false;
        }
    }
    true
}
