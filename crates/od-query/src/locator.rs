//! Most-probable-lane heuristic.
//!
//! The spatial system reports every lane surface below the vehicle.  A hit
//! on a lane the caller already expects wins outright, which keeps the
//! answer stable from tick to tick.  Otherwise each hit is scored by how
//! well the lane's travel heading matches the vehicle heading and how close
//! the surface is to the vehicle height.
//!
//! The breakpoints and weights below reproduce a tuned heuristic.  Change
//! them only together with the behavior that depends on them.

use rustc_hash::FxHashSet;

use od_core::{LaneId, Vec3, heading_diff_deg, ramp};
use od_network::RoadNetwork;

use crate::spatial::{RayHit, SpatialQuery};

/// Heading differences at or below this score 1.0, degrees.
pub const HEADING_FULL_DEG: f64 = 20.0;
/// Heading differences at or above this score 0.0, degrees.
pub const HEADING_ZERO_DEG: f64 = 90.0;
/// Height differences at or below this score 1.0, metres.
pub const ELEVATION_FULL_M: f64 = 0.5;
/// Height differences at or above this score 0.0, metres.
pub const ELEVATION_ZERO_M: f64 = 2.0;
pub const HEADING_WEIGHT: f64 = 0.4;
pub const ELEVATION_WEIGHT: f64 = 0.6;

/// Lanes a caller expects the vehicle to be on, typically the lanes of the
/// last forecast.  Owned and threaded through by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedLanes(FxHashSet<LaneId>);

impl ExpectedLanes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lane: LaneId) -> bool {
        self.0.insert(lane)
    }

    pub fn contains(&self, lane: LaneId) -> bool {
        self.0.contains(&lane)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = LaneId> + '_ {
        self.0.iter().copied()
    }
}

impl Extend<LaneId> for ExpectedLanes {
    fn extend<I: IntoIterator<Item = LaneId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<LaneId> for ExpectedLanes {
    fn from_iter<I: IntoIterator<Item = LaneId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// World position (y-up) and heading (radians CCW from +x in the document
/// plane) of a vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehiclePose {
    pub position: Vec3,
    pub heading: f64,
}

/// The chosen lane, the road position under the vehicle, and its score.
/// An expected-lane hit has score 1.0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LaneMatch {
    pub lane: LaneId,
    pub s: f64,
    pub score: f64,
}

pub fn heading_score(diff_deg: f64) -> f64 {
    ramp(diff_deg.abs(), HEADING_FULL_DEG, HEADING_ZERO_DEG)
}

pub fn elevation_score(diff_m: f64) -> f64 {
    ramp(diff_m.abs(), ELEVATION_FULL_M, ELEVATION_ZERO_M)
}

/// Weighted total of the two scores.
pub fn lane_score(heading_diff_deg: f64, elevation_diff_m: f64) -> f64 {
    HEADING_WEIGHT * heading_score(heading_diff_deg)
        + ELEVATION_WEIGHT * elevation_score(elevation_diff_m)
}

/// Most probable lane under `vehicle`, with its road position.
pub fn locate(
    network: &RoadNetwork,
    spatial: &impl SpatialQuery,
    vehicle: &VehiclePose,
    expected: &ExpectedLanes,
) -> Option<LaneMatch> {
    let position = vehicle.position;
    let hits = spatial.raycast_down(position.x, position.z);

    let mut best: Option<LaneMatch> = None;
    let mut best_score = -1.0;
    for hit in hits {
        let Some((lane, s)) = resolve_hit(network, &hit, position) else {
            continue;
        };
        if expected.contains(lane) {
            return Some(LaneMatch { lane, s, score: 1.0 });
        }
        let Some(point) = network.lane_center_point(lane, s) else {
            continue;
        };
        let score = lane_score(
            heading_diff_deg(point.travel_heading(), vehicle.heading),
            position.y - hit.contact_y,
        );
        if score > best_score {
            best_score = score;
            best = Some(LaneMatch { lane, s, score });
        }
    }
    best
}

/// [`locate`] without the road position.
pub fn most_probable_lane(
    network: &RoadNetwork,
    spatial: &impl SpatialQuery,
    vehicle: &VehiclePose,
    expected: &ExpectedLanes,
) -> Option<LaneId> {
    locate(network, spatial, vehicle, expected).map(|m| m.lane)
}

/// [`locate`] for many vehicles, each with its own expected lanes.
///
/// With the `parallel` feature the calls run on Rayon's thread pool.
pub fn locate_batch<S: SpatialQuery + Sync>(
    network: &RoadNetwork,
    spatial: &S,
    vehicles: &[(VehiclePose, ExpectedLanes)],
) -> Vec<Option<LaneMatch>> {
    #[cfg(not(feature = "parallel"))]
    {
        vehicles
            .iter()
            .map(|(pose, expected)| locate(network, spatial, pose, expected))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        vehicles
            .par_iter()
            .map(|(pose, expected)| locate(network, spatial, pose, expected))
            .collect()
    }
}

/// Lane handle and road `s` for a hit.  Unknown roads and lanes are
/// skipped.
fn resolve_hit(network: &RoadNetwork, hit: &RayHit, position: Vec3) -> Option<(LaneId, f64)> {
    let Some(road) = network.get_road(hit.road) else {
        log::debug!("raycast hit on unknown road {}", hit.road);
        return None;
    };
    let s = network.project(hit.road, position.x, position.z)?.s.clamp(0.0, road.length);
    let lane = network.lane_at(hit.road, hit.lane_id, s);
    if lane.is_none() {
        log::debug!("raycast hit on unknown lane {} of road {} at s={s:.2}", hit.lane_id, road.id);
    }
    lane.map(|lane| (lane, s))
}
