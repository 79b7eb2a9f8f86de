//! Waypoint patrol walking.
//!
//! A path walker owns a snapshot of one named waypoint group, sorted by the
//! waypoints' explicit ordering index, and steers the actor toward
//! successive points. Loop behavior on running off the end is `Once`
//! (stop), `Loop` (wrap), or `PingPong` (reverse the sort order and start
//! over, which walks the list backwards without a separate direction flag).

use serde::{Deserialize, Serialize};
use shared::Vec3;

/// One patrol point.
#[derive(Clone, Copy, Debug)]
pub struct Waypoint {
    /// Explicit ordering index within the group.
    pub index: i32,
    /// World position.
    pub position: Vec3,
}

/// External collaborator resolving a named group to its waypoint entities.
pub trait WaypointSource {
    /// The group's waypoints, in no particular order.
    fn waypoints_in_group(&self, group: &str) -> Vec<Waypoint>;
}

/// What happens when the walker runs off the end of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathLoop {
    #[default]
    Once,
    Loop,
    PingPong,
}

/// One tick's path-walking decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathStep {
    /// Keep turning toward and moving at this point.
    Steer(Vec3),
    /// The route is complete (or there is no route).
    Finished,
}

/// Walks an acquired waypoint list.
#[derive(Clone, Debug, Default)]
pub struct PathWalker {
    /// Waypoints in travel order. Ascending by `index` initially; `PingPong`
    /// flips the order each pass.
    pub points: Vec<Waypoint>,
    /// List position of the current objective.
    pub cursor: usize,
    pub loop_mode: PathLoop,
}

impl PathWalker {
    /// Snapshot a waypoint group and pick the starting point: the list is
    /// sorted ascending by waypoint index, and the cursor starts at the
    /// geometrically nearest point (ties resolve to the first in sort
    /// order). Returns false, leaving the walker empty, if the group has
    /// no waypoints.
    pub fn acquire(&mut self, source: &dyn WaypointSource, group: &str, origin: Vec3) -> bool {
        let mut points = source.waypoints_in_group(group);
        points.sort_by_key(|w| w.index);
        if points.is_empty() {
            self.clear();
            return false;
        }
        let mut cursor = 0;
        let mut best = f32::INFINITY;
        for (i, w) in points.iter().enumerate() {
            let d = (w.position - origin).norm_squared();
            if d < best {
                best = d;
                cursor = i;
            }
        }
        self.points = points;
        self.cursor = cursor;
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.cursor = 0;
    }

    /// Advance the walk by one tick.
    ///
    /// While farther from the objective than one tick of travel (or the
    /// floor clearance, whichever is larger), keep steering at it. On
    /// arrival, move the cursor along, applying the loop mode at the end of
    /// the list.
    pub fn step(
        &mut self,
        origin: Vec3,
        floor_clearance: f32,
        max_speed: f32,
        delta: f32,
    ) -> PathStep {
        if self.points.is_empty() {
            return PathStep::Finished;
        }
        let reach = (max_speed * delta).max(floor_clearance);
        let target = self.points[self.cursor.min(self.points.len() - 1)].position;
        if (target - origin).norm_squared() > reach * reach {
            return PathStep::Steer(target);
        }
        self.cursor += 1;
        if self.cursor >= self.points.len() {
            match self.loop_mode {
                PathLoop::Once => return PathStep::Finished,
                PathLoop::Loop => self.cursor = 0,
                PathLoop::PingPong => {
                    self.reverse_travel();
                    self.cursor = 0;
                }
            }
        }
        PathStep::Steer(self.points[self.cursor].position)
    }

    /// Flip the travel order by re-sorting on the waypoint index: ascending
    /// lists become descending and vice versa.
    fn reverse_travel(&mut self) {
        let ascending = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.index < last.index,
            _ => return,
        };
        if ascending {
            self.points.sort_by_key(|w| std::cmp::Reverse(w.index));
        } else {
            self.points.sort_by_key(|w| w.index);
        }
    }
}
