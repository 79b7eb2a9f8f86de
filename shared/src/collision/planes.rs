/*!
Analytic half-space collision world.

A world made only of infinite planes, with the actor approximated by the
bottom sphere of its capsule. Sweeps against half-spaces have closed-form
solutions, so this backend is exact, deterministic, and has no third-party
dependencies, which makes it the reference resolver for unit tests and a
readable model of the sweep-and-slide contract the rapier backend fulfills
against arbitrary geometry.
*/

use super::backend::{CollisionBackend, SlideParams};
use super::types::{BodyId, CapsuleSpec, FloorContact, SlideResult, Transform, Vec3};
use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_SKIN, DIST_EPS, MIN_MOVE_SQ};
use crate::gravity::GravityMode;

/// An infinite plane satisfying `normal ⋅ x = dist`, solid on the back side.
#[derive(Clone, Copy, Debug)]
pub struct PlaneDef {
    /// World-space unit normal of the plane.
    pub normal: Vec3,
    /// Plane offset along the normal, i.e., `normal ⋅ x = dist`.
    pub dist: f32,
    /// How surfaces of this plane reorient actor gravity.
    pub gravity_mode: GravityMode,
}

impl PlaneDef {
    /// A floor/wall with default (`Blend`) gravity behavior.
    pub fn new(normal: Vec3, dist: f32) -> Self {
        Self {
            normal,
            dist,
            gravity_mode: GravityMode::default(),
        }
    }

    #[inline]
    fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(&p) - self.dist
    }
}

struct Body {
    transform: Transform,
    capsule: CapsuleSpec,
}

/// A collision backend over a set of half-spaces.
pub struct PlaneWorld {
    planes: Vec<PlaneDef>,
    bodies: Vec<Body>,
}

impl PlaneWorld {
    pub fn new(planes: impl IntoIterator<Item = PlaneDef>) -> Self {
        Self {
            planes: planes.into_iter().collect(),
            bodies: Vec::new(),
        }
    }

    /// A single horizontal floor at `y = height`, the common test world.
    pub fn flat_floor(height: f32) -> Self {
        Self::new([PlaneDef::new(Vec3::new(0.0, 1.0, 0.0), height)])
    }

    pub fn spawn_body(&mut self, transform: Transform, capsule: CapsuleSpec) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(Body { transform, capsule });
        id
    }

    fn body(&self, body: BodyId) -> Option<&Body> {
        self.bodies.get(body.0 as usize)
    }
}

impl CollisionBackend for PlaneWorld {
    fn transform(&self, body: BodyId) -> Option<Transform> {
        self.body(body).map(|b| b.transform)
    }

    fn set_transform(&mut self, body: BodyId, transform: Transform) {
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            b.transform = transform;
        }
    }

    fn cast_ray(&self, origin: Vec3, cast_to: Vec3) -> Option<FloorContact> {
        let mut best: Option<(f32, &PlaneDef)> = None;
        for plane in &self.planes {
            let s0 = plane.signed_distance(origin);
            let s1 = plane.signed_distance(cast_to);
            // Front-face crossings only.
            if s0 >= 0.0 && s1 < 0.0 {
                let t = s0 / (s0 - s1);
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, plane));
                }
            }
        }
        best.map(|(t, plane)| FloorContact {
            position: origin + (cast_to - origin) * t,
            normal: plane.normal,
            gravity_mode: plane.gravity_mode,
        })
    }

    fn slide_move(
        &mut self,
        body: BodyId,
        velocity: Vec3,
        params: &SlideParams,
        delta: f32,
    ) -> SlideResult {
        let Some(b) = self.body(body) else {
            return SlideResult {
                velocity,
                on_floor: false,
            };
        };
        let capsule = b.capsule;
        let up = params.up;
        let floor_dot = params.max_slope.cos();
        // Sweep the capsule's bottom sphere; the center rides above it.
        let foot_offset = up * capsule.half_height;
        let mut sphere = b.transform.translation - foot_offset;
        let radius = capsule.radius + DEFAULT_SKIN;
        let mut vel = velocity;
        let mut on_floor = false;

        // Depenetrate before sweeping.
        for plane in &self.planes {
            let s = plane.signed_distance(sphere) - radius;
            if s < 0.0 {
                sphere -= plane.normal * s;
            }
        }

        let mut remaining = vel * delta;
        for _ in 0..DEFAULT_MAX_ITERATIONS {
            if remaining.norm_squared() <= MIN_MOVE_SQ {
                break;
            }
            let mut earliest: Option<(f32, Vec3)> = None;
            for plane in &self.planes {
                let s0 = plane.signed_distance(sphere) - radius;
                let s1 = s0 + plane.normal.dot(&remaining);
                if s0 >= 0.0 && s1 < 0.0 {
                    let t = s0 / (s0 - s1);
                    if earliest.map_or(true, |(bt, _)| t < bt) {
                        earliest = Some((t, plane.normal));
                    }
                }
            }
            match earliest {
                Some((t, normal)) => {
                    sphere += remaining * t;
                    remaining *= 1.0 - t;
                    // Clip motion and velocity along the contact.
                    let into = normal.dot(&remaining);
                    if into < 0.0 {
                        remaining -= normal * into;
                    }
                    let vel_into = normal.dot(&vel);
                    if vel_into < 0.0 {
                        vel -= normal * vel_into;
                    }
                    if normal.dot(&up) >= floor_dot {
                        on_floor = true;
                    }
                }
                None => {
                    sphere += remaining;
                    break;
                }
            }
        }

        // Floor snap: pull the body down onto nearby walkable ground.
        if !on_floor && params.snap_len > 0.0 {
            let mut best: Option<(f32, Vec3)> = None;
            for plane in &self.planes {
                let along_up = plane.normal.dot(&up);
                if along_up < floor_dot {
                    continue;
                }
                let s = plane.signed_distance(sphere) - radius;
                // Distance measured straight down the up axis.
                let down = s / along_up;
                if (0.0..=params.snap_len).contains(&down)
                    && best.map_or(true, |(bd, _)| down < bd)
                {
                    best = Some((down, plane.normal));
                }
            }
            if let Some((down, normal)) = best {
                if down > DIST_EPS {
                    sphere -= up * down;
                }
                let vel_into = normal.dot(&vel);
                if vel_into < 0.0 {
                    vel -= normal * vel_into;
                }
                on_floor = true;
            }
        }

        let translation = sphere + foot_offset;
        if let Some(b) = self.bodies.get_mut(body.0 as usize) {
            b.transform.translation = translation;
        }
        SlideResult {
            velocity: vel,
            on_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::types::Quat;
    use crate::constants::FLOOR_MAX_ANGLE;
    use approx::assert_relative_eq;

    const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    fn capsule() -> CapsuleSpec {
        CapsuleSpec {
            radius: 0.5,
            half_height: 0.5,
        }
    }

    fn standing_params() -> SlideParams {
        SlideParams {
            up: UP,
            snap_len: 1.0,
            max_slope: FLOOR_MAX_ANGLE,
        }
    }

    fn spawn_standing(world: &mut PlaneWorld, y: f32) -> BodyId {
        world.spawn_body(
            Transform::new(Vec3::new(0.0, y, 0.0), Quat::identity()),
            capsule(),
        )
    }

    #[test]
    fn ray_hits_front_faces_only() {
        let world = PlaneWorld::flat_floor(0.0);
        let hit = world
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .expect("downward ray must hit the floor");
        assert_relative_eq!(hit.position, Vec3::zeros(), epsilon = 1.0e-5);
        assert_relative_eq!(hit.normal, UP);

        // From below, the same plane is a back face.
        assert!(world
            .cast_ray(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, -5.0, 0.0))
            .is_none());
        // Ray stopping short of the plane misses.
        assert!(world
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
            .is_none());
    }

    #[test]
    fn slide_along_floor_keeps_planar_velocity() {
        let mut world = PlaneWorld::flat_floor(0.0);
        let body = spawn_standing(&mut world, 1.0);
        let res = world.slide_move(body, Vec3::new(5.0, 0.0, 0.0), &standing_params(), 0.1);
        assert!(res.on_floor);
        assert_relative_eq!(res.velocity, Vec3::new(5.0, 0.0, 0.0), epsilon = 1.0e-5);
        let t = world.transform(body).unwrap();
        assert_relative_eq!(t.translation.x, 0.5, epsilon = 1.0e-5);
    }

    #[test]
    fn falling_body_lands_and_clips_velocity() {
        let mut world = PlaneWorld::flat_floor(0.0);
        let body = spawn_standing(&mut world, 3.0);
        let airborne = SlideParams {
            snap_len: 0.0,
            ..standing_params()
        };
        // Big downward step: sweep stops at the floor.
        let res = world.slide_move(body, Vec3::new(0.0, -30.0, 0.0), &airborne, 0.5);
        assert!(res.on_floor);
        assert_relative_eq!(res.velocity, Vec3::zeros(), epsilon = 1.0e-5);
        let t = world.transform(body).unwrap();
        // Bottom sphere resting on the plane (plus skin).
        assert_relative_eq!(t.translation.y, 1.0 + DEFAULT_SKIN, epsilon = 1.0e-4);
    }

    #[test]
    fn wall_clips_into_a_slide() {
        let mut world = PlaneWorld::new([
            PlaneDef::new(Vec3::new(0.0, 1.0, 0.0), 0.0),
            PlaneDef::new(Vec3::new(-1.0, 0.0, 0.0), -5.0), // wall at x = 5
        ]);
        let body = spawn_standing(&mut world, 1.0);
        let res = world.slide_move(
            body,
            Vec3::new(10.0, 0.0, 10.0),
            &standing_params(),
            1.0,
        );
        // Velocity into the wall is gone, lateral survives.
        assert_relative_eq!(res.velocity.x, 0.0, epsilon = 1.0e-4);
        assert_relative_eq!(res.velocity.z, 10.0, epsilon = 1.0e-4);
        let t = world.transform(body).unwrap();
        assert!(t.translation.x <= 5.0 - capsule().radius + 1.0e-3);
    }

    #[test]
    fn snap_latches_onto_nearby_ground() {
        let mut world = PlaneWorld::flat_floor(0.0);
        // Hovering just above the floor, moving horizontally.
        let body = spawn_standing(&mut world, 1.3);
        let res = world.slide_move(body, Vec3::new(2.0, 0.0, 0.0), &standing_params(), 0.1);
        assert!(res.on_floor);
        let t = world.transform(body).unwrap();
        assert!(t.translation.y < 1.1);
    }

    #[test]
    fn no_snap_when_disabled() {
        let mut world = PlaneWorld::flat_floor(0.0);
        let body = spawn_standing(&mut world, 3.0);
        let airborne = SlideParams {
            snap_len: 0.0,
            ..standing_params()
        };
        let res = world.slide_move(body, Vec3::new(0.0, 2.0, 0.0), &airborne, 0.1);
        assert!(!res.on_floor);
        let t = world.transform(body).unwrap();
        assert!(t.translation.y > 3.0);
    }

    #[test]
    fn steep_plane_is_not_floor() {
        // 60° slope: too steep to stand on.
        let normal = Vec3::new(0.866, 0.5, 0.0);
        let mut world = PlaneWorld::new([PlaneDef::new(normal, -2.0)]);
        let body = spawn_standing(&mut world, 0.0);
        let res = world.slide_move(
            body,
            Vec3::new(-10.0, 0.0, 0.0),
            &SlideParams {
                snap_len: 0.0,
                ..standing_params()
            },
            1.0,
        );
        assert!(!res.on_floor);
    }
}
