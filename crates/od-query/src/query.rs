//! Path queries: points, speed changes, junctions and target distances
//! along a lane walk.
//!
//! Every query starts at `(lane, s)` with a [`TravelDirection`] and a
//! [`PreferredConnections`] list.  Misses are `None` or an empty list.

use rustc_hash::FxHashSet;

use od_core::{JunctionId, LaneId, RoadId};
use od_network::{Link, Point, PreferredConnections, RoadNetwork, S_TOLERANCE};

use crate::walk::{Along, LaneWalk, Step, TravelDirection};
use crate::{QueryConfig, QueryResult};

/// Serialized form of an unreachable target distance.
pub const UNREACHABLE: f64 = -1.0;

/// A speed-limit change `distance` metres ahead.  `speed_kmh: None` means
/// no limit applies from there on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedLimitChange {
    pub distance: f64,
    pub speed_kmh: Option<f64>,
}

/// A junction entered `distance` metres ahead.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntersectionAhead {
    pub distance: f64,
    pub junction: JunctionId,
    /// Number of continuations the junction offers from the walked lane.
    pub branches: usize,
}

/// A lane-level road position used as a target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoadPosition {
    pub road: RoadId,
    /// Signed lane id on `road`.
    pub lane_id: i32,
    pub s: f64,
}

/// Query engine over one network.  Cheap to construct; holds no per-vehicle
/// state.
#[derive(Clone)]
pub struct PathQuery<'a> {
    network: &'a RoadNetwork,
    config: QueryConfig,
}

impl<'a> PathQuery<'a> {
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self { network, config: QueryConfig::default() }
    }

    /// Construct with explicit bounds.  Rejects an invalid config.
    pub fn with_config(network: &'a RoadNetwork, config: QueryConfig) -> QueryResult<Self> {
        config.validate()?;
        Ok(Self { network, config })
    }

    pub fn network(&self) -> &'a RoadNetwork {
        self.network
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Start a walk from `(lane, s)`.  `None` for an unknown lane, lane id 0
    /// or `s` outside the lane.
    pub fn walk<'p>(
        &'p self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        ahead: bool,
        prefs: &'p PreferredConnections,
    ) -> Option<LaneWalk<'p>> {
        let lane_id = self.network.get_lane(lane)?.id;
        let along = Along::start(lane_id, direction, ahead)?;
        LaneWalk::new(self.network, lane, s, along, prefs, &self.config)
    }

    // ── Points ────────────────────────────────────────────────────────────

    /// Lane center point `distance` metres ahead of `(lane, s)`.
    pub fn point_ahead(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        distance: f64,
        prefs: &PreferredConnections,
    ) -> Option<Point> {
        self.point_along(lane, s, direction, distance, prefs, true)
    }

    /// Lane center point `distance` metres behind `(lane, s)`.
    pub fn point_behind(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        distance: f64,
        prefs: &PreferredConnections,
    ) -> Option<Point> {
        self.point_along(lane, s, direction, distance, prefs, false)
    }

    fn point_along(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        distance: f64,
        prefs: &PreferredConnections,
        ahead: bool,
    ) -> Option<Point> {
        if !(distance.is_finite() && distance >= 0.0) {
            return None;
        }
        let (step, offset) = locate_on_walk(self.walk(lane, s, direction, ahead, prefs)?, distance)?;
        self.network.lane_center_point(step.lane, step.s_at(offset))
    }

    // ── Attributes ahead ──────────────────────────────────────────────────

    /// Speed-limit changes within `range_m` ahead, nearest first.  The limit
    /// in force at the start position is not reported.
    pub fn speed_limits_ahead(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        range_m: f64,
        prefs: &PreferredConnections,
    ) -> Vec<SpeedLimitChange> {
        let mut changes = Vec::new();
        let Some(walk) = self.walk(lane, s, direction, true, prefs) else {
            return changes;
        };

        let mut current: Option<Option<f64>> = None;
        for step in walk {
            if step.distance > range_m {
                break;
            }
            for (from, to) in step_intervals(self.network, &step) {
                let distance = step.distance + (from - step.start_s).abs();
                if distance > range_m {
                    break;
                }
                let limit = self.network.speed_limit_at(step.lane, 0.5 * (from + to));
                match current {
                    Some(previous) if previous == limit => {}
                    Some(_) => {
                        if distance > 0.0 {
                            changes.push(SpeedLimitChange { distance, speed_kmh: limit });
                        }
                        current = Some(limit);
                    }
                    None => current = Some(limit),
                }
            }
        }
        changes
    }

    /// Branching junctions entered within `range_m` ahead, nearest first.
    /// A junction link with a single candidate is a plain continuation.
    pub fn intersections_ahead(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        range_m: f64,
        prefs: &PreferredConnections,
    ) -> Vec<IntersectionAhead> {
        let mut found = Vec::new();
        let Some(walk) = self.walk(lane, s, direction, true, prefs) else {
            return found;
        };
        for step in walk {
            let distance = step.end_distance();
            if distance > range_m {
                break;
            }
            if let Link::ViaJunction { junction, candidates } = step.exit {
                if distance > 0.0 && candidates.len() > 1 {
                    found.push(IntersectionAhead {
                        distance,
                        junction: *junction,
                        branches: candidates.len(),
                    });
                }
            }
        }
        found
    }

    /// Distance along the walk to `target`.  `None` when the target is not
    /// reached before a dead end, a revisited lane, or the traversal bound.
    pub fn distance_to_target_ahead(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        prefs: &PreferredConnections,
        target: RoadPosition,
    ) -> Option<f64> {
        let walk = self.walk(lane, s, direction, true, prefs)?;
        let mut visited = FxHashSet::default();

        for step in walk {
            let l = self.network.lane(step.lane);
            if l.road == target.road && l.id == target.lane_id {
                let section = self.network.section(l.section);
                if section.contains(target.s) {
                    let distance = step.distance + step.along.sign() * (target.s - step.start_s);
                    if distance >= -S_TOLERANCE {
                        return Some(distance.max(0.0));
                    }
                }
            }
            if !visited.insert(step.lane) {
                log::debug!("cycle at lane {} while searching for target", step.lane);
                return None;
            }
        }
        None
    }

    /// [`distance_to_target_ahead`](Self::distance_to_target_ahead) with
    /// [`UNREACHABLE`] for a miss.
    pub fn distance_to_target_or_sentinel(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        prefs: &PreferredConnections,
        target: RoadPosition,
    ) -> f64 {
        self.distance_to_target_ahead(lane, s, direction, prefs, target)
            .unwrap_or(UNREACHABLE)
    }
}

/// Step containing `distance` along a walk, and the offset into it.
pub(crate) fn locate_on_walk(walk: LaneWalk<'_>, distance: f64) -> Option<(Step<'_>, f64)> {
    for step in walk {
        let offset = distance - step.distance;
        if offset <= step.length() + S_TOLERANCE {
            return Some((step, offset));
        }
    }
    None
}

/// `(from, to)` road positions between speed breakpoints, in walk order.
fn step_intervals(network: &RoadNetwork, step: &Step<'_>) -> Vec<(f64, f64)> {
    let mut cuts: Vec<f64> = network
        .speed_breakpoints(step.lane)
        .into_iter()
        .filter(|&b| {
            let ahead = (b - step.start_s) * step.along.sign();
            ahead > 0.0 && ahead < step.length()
        })
        .collect();
    if step.along == Along::Decreasing {
        cuts.reverse();
    }

    let mut intervals = Vec::with_capacity(cuts.len() + 1);
    let mut from = step.start_s;
    for cut in cuts.into_iter().chain(std::iter::once(step.end_s)) {
        if (cut - from).abs() > 0.0 {
            intervals.push((from, cut));
        }
        from = cut;
    }
    intervals
}
