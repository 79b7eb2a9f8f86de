/*!
Locomotion tuning defaults and tolerances.

These constants centralize the parameters used by the motion integrator,
the gravity frame, and the collision backends. Keeping them together makes
tuning easier and helps ensure deterministic behavior across platforms.

Notes
- Distances are in meters, speeds in meters per second, time in seconds.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
- Per-actor overrides belong in `MoveTunables`; these are the spawn defaults.
*/

/// Default walking speed (m/s).
pub const WALK_SPEED: f32 = 4.5;

/// Default running speed (m/s). Also the default `max_speed` cap while alerted.
pub const RUN_SPEED: f32 = 10.0;

/// Minimum speed used when computing ground friction (m/s).
/// Below this, friction is computed as if the actor moved at `STOP_SPEED`,
/// so slow actors still come to rest in bounded time.
pub const STOP_SPEED: f32 = 3.125;

/// Ground acceleration rate (1/s, scaled by wish speed).
pub const ACCELERATION: f32 = 10.0;

/// Air acceleration rate (1/s, scaled by wish speed). Deliberately small:
/// airborne course correction is possible but weak.
pub const AIR_ACCELERATION: f32 = 0.7;

/// Acceleration rate while swimming (1/s, scaled by wish speed).
pub const WATER_ACCELERATION: f32 = 10.0;

/// Ground friction coefficient (1/s).
pub const FRICTION: f32 = 4.0;

/// Friction coefficient while submerged (1/s, additionally scaled by water level).
pub const WATER_FRICTION: f32 = 4.0;

/// Upward impulse applied on a ground jump (m/s).
pub const JUMP_STRENGTH: f32 = 8.4375;

/// Gravitational acceleration magnitude (m/s^2).
pub const GRAVITY: f32 = 25.0;

/// Planar speeds below this are snapped to zero during friction so actors
/// don't drift forever at sub-perceptible speeds (m/s).
pub const REST_SPEED_EPS: f32 = 0.0625;

/// Minimum wish speed assumed by air acceleration (m/s), so a touch of air
/// control remains available even with near-zero input.
pub const AIR_WISH_FLOOR: f32 = 1.875;

/// Fraction of `water_acceleration` actually applied while swimming.
pub const SWIM_ACCEL_SCALE: f32 = 0.7;

/// Post-landing window during which friction is suspended (s), so chained
/// jumps keep their momentum.
pub const FRICTION_GRACE: f32 = 0.1;

/// Friction multiplier applied when the actor's base is only partially
/// supported (standing over an edge).
pub const EDGE_FRICTION_SCALE: f32 = 2.0;

/// Blend-mode gravity reorientation acceptance band: the dot product between
/// the current gravity direction and the candidate (negated surface normal)
/// must fall in `[BLEND_MIN, BLEND_MAX)`. Near-parallel contacts need no
/// change; near-opposite contacts are grazing hits on unrelated surfaces.
pub const BLEND_MIN: f32 = 0.5;
pub const BLEND_MAX: f32 = 0.99;

/// Basis reorientation rate range (fraction/s), interpolated by planar speed:
/// slow actors reorient gently, fast actors catch up before it reads as lag.
pub const REORIENT_RATE_MIN: f32 = 5.0;
pub const REORIENT_RATE_MAX: f32 = 7.5;

/// Squared distance between the current up axis and the target up axis below
/// which reorientation is skipped entirely.
pub const REORIENT_ALIGN_EPS_SQ: f32 = 1.0e-5;

/// Steepest surface angle (radians from the up axis) still considered floor.
pub const FLOOR_MAX_ANGLE: f32 = 0.785398;

/// Swim-stroke impulse per liquid kind (m/s). Denser/hotter liquids resist.
pub const WATER_JUMP_STRENGTH: f32 = 3.125;
pub const SLIME_JUMP_STRENGTH: f32 = 2.5;
pub const LAVA_JUMP_STRENGTH: f32 = 1.5625;

/// Velocity retained when plunging into water, and when leaving it.
pub const WATER_ENTRY_DAMP: f32 = 0.2;
pub const WATER_EXIT_DAMP: f32 = 0.5;

/// Sink rate for idle non-flying swimmers (m/s^2) and the lift applied per
/// unit of vertical input while actively swimming or flying.
pub const FLY_SINK_RATE: f32 = 1.875;
pub const FLY_INPUT_LIFT: f32 = 0.03125;

/// Small downward bias that keeps grounded flyers stuck to the floor (m/s).
pub const FLOOR_STICK: f32 = 0.01;

/// Separation from surfaces kept when landing or sliding (meters).
/// Too large creates visible gaps; too small risks jitter on contact.
pub const DEFAULT_SKIN: f32 = 0.02;

/// Maximum number of slide iterations per kinematic step.
/// Higher values help with tight corners at the cost of more queries.
pub const DEFAULT_MAX_ITERATIONS: u32 = 4;

/// Minimum squared movement threshold to consider a step meaningful (m^2).
/// Movements below this are treated as zero to avoid tiny oscillations.
pub const MIN_MOVE_SQ: f32 = 1.0e-8;

/// Practical small distance for comparisons (meters).
/// Use for dot-product guards, equality checks in world space, etc.
pub const DIST_EPS: f32 = 1.0e-6;
