/*!
Water volumes and immersion sampling.

Immersion is graded, not boolean: level 1 means feet-deep (walkable), level
2 means deep enough to swim, level 3 means fully submerged. The motion
integrator switches friction/acceleration profiles at level 2 and scales
water friction by the level itself.
*/

use crate::collision::{CapsuleSpec, Vec3};
use crate::constants::{LAVA_JUMP_STRENGTH, SLIME_JUMP_STRENGTH, WATER_JUMP_STRENGTH};

/// Liquid kinds, in increasing order of hostility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Liquid {
    #[default]
    Water,
    Slime,
    Lava,
}

impl Liquid {
    /// Upward impulse per swim stroke (m/s). Denser/hotter liquids resist.
    #[inline]
    pub fn swim_jump_strength(self) -> f32 {
        match self {
            Self::Water => WATER_JUMP_STRENGTH,
            Self::Slime => SLIME_JUMP_STRENGTH,
            Self::Lava => LAVA_JUMP_STRENGTH,
        }
    }

    /// Stable index for persistence records.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Self::Water => 0,
            Self::Slime => 1,
            Self::Lava => 2,
        }
    }

    /// Inverse of [`Self::index`]; unknown values fall back to `Water`.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Slime,
            2 => Self::Lava,
            _ => Self::Water,
        }
    }
}

/// Current immersion: 0 dry, 1 feet, 2 swimming, 3 submerged.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaterState {
    pub level: u8,
    pub kind: Liquid,
}

impl WaterState {
    /// Deep enough that the swim movement profile applies.
    #[inline]
    pub fn swimming(&self) -> bool {
        self.level >= 2
    }

    /// Fully under the surface.
    #[inline]
    pub fn submerged(&self) -> bool {
        self.level >= 3
    }
}

/// An axis-aligned liquid volume in world space.
#[derive(Clone, Copy, Debug)]
pub struct WaterVolume {
    pub min: Vec3,
    pub max: Vec3,
    pub kind: Liquid,
}

impl WaterVolume {
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Grade immersion by sampling three points along the actor's up axis:
/// feet, waist (the body origin), and head.
///
/// The reported kind comes from the volume containing the highest submerged
/// sample point.
pub fn sample_water(
    volumes: &[WaterVolume],
    origin: Vec3,
    up: Vec3,
    capsule: &CapsuleSpec,
) -> WaterState {
    let span = capsule.half_height + capsule.radius * 0.5;
    let feet = origin - up * span;
    let head = origin + up * span;

    let find = |p: Vec3| volumes.iter().find(|v| v.contains(p));

    if let Some(v) = find(head) {
        return WaterState {
            level: 3,
            kind: v.kind,
        };
    }
    if let Some(v) = find(origin) {
        return WaterState {
            level: 2,
            kind: v.kind,
        };
    }
    if let Some(v) = find(feet) {
        return WaterState {
            level: 1,
            kind: v.kind,
        };
    }
    WaterState::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    fn capsule() -> CapsuleSpec {
        CapsuleSpec {
            radius: 0.5,
            half_height: 0.5,
        }
    }

    fn pool(surface_y: f32, kind: Liquid) -> WaterVolume {
        WaterVolume {
            min: Vec3::new(-10.0, -10.0, -10.0),
            max: Vec3::new(10.0, surface_y, 10.0),
            kind,
        }
    }

    #[test]
    fn immersion_grades_with_depth() {
        let c = capsule();
        // Surface at y=0; actor origin descends into the pool.
        let vols = [pool(0.0, Liquid::Water)];
        let dry = sample_water(&vols, Vec3::new(0.0, 5.0, 0.0), UP, &c);
        assert_eq!(dry.level, 0);

        let wading = sample_water(&vols, Vec3::new(0.0, 0.5, 0.0), UP, &c);
        assert_eq!(wading.level, 1);

        let swimming = sample_water(&vols, Vec3::new(0.0, -0.1, 0.0), UP, &c);
        assert_eq!(swimming.level, 2);
        assert!(swimming.swimming());

        let under = sample_water(&vols, Vec3::new(0.0, -2.0, 0.0), UP, &c);
        assert_eq!(under.level, 3);
        assert!(under.submerged());
    }

    #[test]
    fn kind_comes_from_the_highest_submerged_sample() {
        let c = capsule();
        let vols = [pool(-0.8, Liquid::Lava), pool(0.0, Liquid::Water)];
        // Feet (y = -0.85) in lava, waist (y = -0.1) in water, head clear.
        let s = sample_water(&vols, Vec3::new(0.0, -0.1, 0.0), UP, &c);
        assert_eq!(s.level, 2);
        assert_eq!(s.kind, Liquid::Water);

        // Fully under both surfaces: the lava volume wins.
        let deep = sample_water(&vols, Vec3::new(0.0, -3.0, 0.0), UP, &c);
        assert_eq!(deep.level, 3);
        assert_eq!(deep.kind, Liquid::Lava);
    }

    #[test]
    fn gravity_relative_sampling_uses_the_actor_up() {
        let c = capsule();
        // A wall-walking actor whose up is +X: volume to its "feet" side.
        let vols = [WaterVolume {
            min: Vec3::new(-5.0, -1.0, -1.0),
            max: Vec3::new(0.0, 1.0, 1.0),
            kind: Liquid::Water,
        }];
        let s = sample_water(&vols, Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), &c);
        assert_eq!(s.level, 1);
    }
}
