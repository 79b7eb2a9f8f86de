/*!
Actor simulation: state machine, pathing, pursuit, control policies, and
the fixed-step tick that drives the `shared` locomotion math against a
collision backend.

The crate is engine-free by construction. Everything the host supplies
(collision resolution, waypoint groups, animation/sound/trigger effects,
enemy targeting) arrives through traits, so the whole simulation runs
against stubs in tests.
*/

pub mod actor;
pub mod chase;
pub mod control;
pub mod path;
pub mod save;
pub mod state;
pub mod think;
pub mod tick;

pub use actor::{Actor, SpawnFlags};
pub use chase::{add_breadcrumb, chase_walk};
pub use control::{AiControlPolicy, ControlFrame, ControlPolicy, PlayerControlPolicy, PlayerInput};
pub use path::{PathLoop, PathStep, PathWalker, Waypoint, WaypointSource};
pub use save::{load_actor, save_actor, ActorRecord};
pub use state::{ActorHooks, ActorState, NullHooks, SoundChannel, SoundCue, StateCtx};
pub use think::{ThinkRoutine, ThinkSchedule};
pub use tick::{actor_tick, TickCtx};
