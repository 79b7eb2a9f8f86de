/*!
rapier3d-backed collision world.

Static geometry lives in a collider set queried through rapier's broad-phase
BVH; actors are not colliders at all. They are capsules swept through the
static world by rapier's `KinematicCharacterController`, which doubles as
the slide-move resolver (with a configurable `up` axis, so variable gravity
works unchanged). Each collider carries its surface's gravity reaction mode
in `user_data`.
*/

use nalgebra as na;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::{
    BroadPhaseBvh, Capsule, Collider, ColliderBuilder, ColliderSet, HalfSpace,
    IntegrationParameters, NarrowPhase, QueryFilter, QueryPipeline, Ray, RigidBodySet, SharedShape,
    UnitVector,
};

use super::backend::{CollisionBackend, SlideParams};
use super::types::{BodyId, CapsuleSpec, FloorContact, SlideResult, Transform, Vec3};
use crate::constants::DIST_EPS;
use crate::gravity::GravityMode;

/// Canonical definition of an immutable world collider.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation (unit quaternion).
    pub rotation: na::UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: StaticShapeDef,
    /// How surfaces of this collider reorient actor gravity.
    pub gravity_mode: GravityMode,
}

impl WorldStaticDef {
    /// A horizontal floor plane at `y = height` with default gravity behavior.
    pub fn flat_floor(height: f32) -> Self {
        Self {
            translation: Vec3::new(0.0, height, 0.0),
            rotation: na::UnitQuaternion::identity(),
            shape: StaticShapeDef::Plane {
                offset_along_normal: 0.0,
            },
            gravity_mode: GravityMode::default(),
        }
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum StaticShapeDef {
    /// Infinite plane (half-space). The normal is derived from the pose as
    /// `rotation * +Y`; the plane passes through the pose translation,
    /// shifted by `offset_along_normal`.
    Plane { offset_along_normal: f32 },
    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },
    /// Sphere/ball (meters).
    Sphere { radius: f32 },
    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },
}

/// Build a rapier collider from a `WorldStaticDef`.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        StaticShapeDef::Plane {
            offset_along_normal,
        } => {
            // Derive the world-space plane normal from the pose rotation,
            // then place the half-space at `normal * dist`.
            let n = def.rotation * Vec3::y();
            let dist = n.dot(&def.translation) + *offset_along_normal;
            let unit_n = UnitVector::new_normalize(n);
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                .translation(unit_n.into_inner() * dist)
        }
        StaticShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .position(na::Isometry3::from_parts(
                    na::Translation3::from(def.translation),
                    def.rotation,
                ))
        }
        StaticShapeDef::Sphere { radius } => {
            ColliderBuilder::ball(*radius).translation(def.translation)
        }
        StaticShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius).position(na::Isometry3::from_parts(
            na::Translation3::from(def.translation),
            def.rotation,
        )),
    };
    builder.user_data(u128::from(def.gravity_mode.index())).build()
}

struct ActorBody {
    transform: Transform,
    capsule: CapsuleSpec,
}

/// A collision backend over a static rapier query world.
pub struct RapierWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    actors: Vec<ActorBody>,
}

impl RapierWorld {
    /// Build the static query world. `dt_hint` feeds the broad-phase
    /// integration parameters (use the fixed tick length).
    pub fn new(world_statics: impl IntoIterator<Item = WorldStaticDef>, dt_hint: f32) -> Self {
        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut modified_colliders = Vec::new();

        world_statics.into_iter().for_each(|def| {
            let collider = collider_from_def(&def);
            let co_handle = colliders.insert(collider);
            modified_colliders.push(co_handle);
        });

        let mut broad_phase = BroadPhaseBvh::new();
        let mut events = Vec::new();
        broad_phase.update(
            &IntegrationParameters {
                dt: dt_hint,
                ..IntegrationParameters::default()
            },
            &colliders,
            &bodies,
            &modified_colliders,
            &[],
            &mut events,
        );

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase: NarrowPhase::default(),
            actors: Vec::new(),
        }
    }

    pub fn spawn_actor(&mut self, transform: Transform, capsule: CapsuleSpec) -> BodyId {
        let id = BodyId(self.actors.len() as u32);
        self.actors.push(ActorBody { transform, capsule });
        id
    }

    fn query_pipeline(&self) -> QueryPipeline<'_> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::only_fixed(),
        )
    }
}

impl CollisionBackend for RapierWorld {
    fn transform(&self, body: BodyId) -> Option<Transform> {
        self.actors.get(body.0 as usize).map(|a| a.transform)
    }

    fn set_transform(&mut self, body: BodyId, transform: Transform) {
        if let Some(a) = self.actors.get_mut(body.0 as usize) {
            a.transform = transform;
        }
    }

    fn cast_ray(&self, origin: Vec3, cast_to: Vec3) -> Option<FloorContact> {
        let dir = cast_to - origin;
        let len = dir.norm();
        if len <= DIST_EPS {
            return None;
        }
        let ray = Ray::new(na::Point3::from(origin), dir / len);
        let qp = self.query_pipeline();
        qp.cast_ray_and_get_normal(&ray, len, true)
            .map(|(handle, hit)| FloorContact {
                position: ray.point_at(hit.time_of_impact).coords,
                normal: hit.normal,
                gravity_mode: self
                    .colliders
                    .get(handle)
                    .map(|c| GravityMode::from_index(c.user_data as u8))
                    .unwrap_or_default(),
            })
    }

    fn slide_move(
        &mut self,
        body: BodyId,
        velocity: Vec3,
        params: &SlideParams,
        delta: f32,
    ) -> SlideResult {
        let Some(a) = self.actors.get(body.0 as usize) else {
            return SlideResult {
                velocity,
                on_floor: false,
            };
        };
        let capsule = a.capsule;
        let start = a.transform;

        let kcc = KinematicCharacterController {
            up: UnitVector::new_normalize(params.up),
            offset: CharacterLength::Relative(0.025),
            autostep: Some(CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Relative(0.4),
                ..CharacterAutostep::default()
            }),
            snap_to_ground: (params.snap_len > 0.0)
                .then_some(CharacterLength::Absolute(params.snap_len)),
            max_slope_climb_angle: params.max_slope,
            ..KinematicCharacterController::default()
        };

        let qp = self.query_pipeline();
        let corrected = kcc.move_shape(
            delta,
            &qp,
            &Capsule::new_y(capsule.half_height, capsule.radius),
            &start.iso(),
            velocity * delta,
            |_| {},
        );

        let translation = start.translation + corrected.translation;
        let resolved = if delta > 0.0 {
            corrected.translation / delta
        } else {
            velocity
        };
        if let Some(a) = self.actors.get_mut(body.0 as usize) {
            a.transform.translation = translation;
        }
        SlideResult {
            velocity: resolved,
            on_floor: corrected.grounded,
        }
    }
}
