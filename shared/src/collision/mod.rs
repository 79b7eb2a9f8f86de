/*!
Collision root module.

Locomotion treats collision as an opaque collaborator behind the
[`CollisionBackend`] trait: a world ray query, a slide-move resolver, and
body transform ownership. The code is split for clarity:

- types:   shared data types (Transform, CapsuleSpec, FloorContact, etc.)
- backend: the `CollisionBackend` trait plus the floor/bottom probes
- planes:  analytic half-space world; deterministic, dependency-free,
           used by the test suites
- rapier:  rapier3d-backed world (static collider set + query pipeline,
           kinematic character controller as the slide resolver)
*/

pub mod backend;
pub mod planes;
pub mod rapier;
pub mod types;

// Re-export commonly used types and functions.
pub use backend::{CollisionBackend, SlideParams, bottom_supported, probe_floor};
pub use types::{BodyId, CapsuleSpec, FloorContact, Iso, Quat, SlideResult, Transform, Vec3};
