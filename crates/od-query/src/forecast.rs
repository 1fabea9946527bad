//! Lookahead forecast: sampled points, curvature series, speed changes and
//! junctions around a vehicle's lane position.

use od_core::LaneId;
use od_network::{LaneSide, Point, PreferredConnections};

use crate::locator::ExpectedLanes;
use crate::query::{IntersectionAhead, PathQuery, SpeedLimitChange};
use crate::spatial::SpatialQuery;
use crate::walk::{Along, TravelDirection};

/// Two curvature values closer than this are the same value.
pub const CURVATURE_EPSILON: f64 = 1e-10;

/// Consumers keep at most this many curvature samples.
pub const MAX_FORECAST_CURVATURES: usize = 100;

/// Signed curvature `distance` metres from the vehicle (negative behind).
/// Positive curvature turns left in the direction of travel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CurvatureSample {
    pub distance: f64,
    pub curvature: f64,
}

/// Collapse redundant samples of a curvature series.
///
/// The first and last samples are always kept.  An interior sample is
/// dropped when its value equals both neighbors, or sits at their
/// arithmetic mean, within [`CURVATURE_EPSILON`].  Each pass compares
/// against the neighbors of the input to that pass; passes repeat until
/// nothing is dropped, so reducing a reduced series returns it unchanged.
pub fn reduce_curvature_series(samples: &[CurvatureSample]) -> Vec<CurvatureSample> {
    let mut current = samples.to_vec();
    loop {
        let reduced = reduce_pass(&current);
        if reduced.len() == current.len() {
            return reduced;
        }
        current = reduced;
    }
}

fn reduce_pass(samples: &[CurvatureSample]) -> Vec<CurvatureSample> {
    if samples.len() <= 2 {
        return samples.to_vec();
    }
    let last = samples.len() - 1;
    samples
        .iter()
        .enumerate()
        .filter(|&(i, cur)| {
            if i == 0 || i == last {
                return true;
            }
            let prev = samples[i - 1].curvature;
            let next = samples[i + 1].curvature;
            let c = cur.curvature;
            let same_as_both = (c - prev).abs() < CURVATURE_EPSILON
                && (c - next).abs() < CURVATURE_EPSILON;
            let midpoint = ((c - prev) - (next - c)).abs() < CURVATURE_EPSILON;
            !(same_as_both || midpoint)
        })
        .map(|(_, &sample)| sample)
        .collect()
}

/// A sampled lane point at a signed distance from the vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ForecastPoint {
    pub distance: f64,
    pub point: Point,
}

/// Everything a driver model needs to know about the road around it.
#[derive(Clone, Debug)]
pub struct Forecast {
    pub origin: Point,
    /// Points ahead, nearest first, starting at the origin.
    pub ahead: Vec<ForecastPoint>,
    /// Points behind, nearest first, with negative distances.
    pub behind: Vec<ForecastPoint>,
    /// Reduced curvature series from furthest behind to furthest ahead,
    /// at most [`MAX_FORECAST_CURVATURES`] long.
    pub curvatures: Vec<CurvatureSample>,
    pub speed_limits: Vec<SpeedLimitChange>,
    pub intersections: Vec<IntersectionAhead>,
    /// Driving lanes in the vehicle's direction of travel at the origin.
    pub lanes_in_direction: usize,
    /// Driving lanes in the opposite direction at the origin.
    pub lanes_opposite: usize,
    /// Lanes the forecast walked ahead; usable as next tick's expected
    /// lanes.
    pub lanes_ahead: ExpectedLanes,
}

impl Forecast {
    /// Replace the height of every sampled point with the ground height
    /// below it plus `offset`.
    pub fn project_to_ground(&mut self, spatial: &impl SpatialQuery, offset: f64) {
        self.origin = project_to_ground(self.origin, spatial, offset);
        for sample in self.ahead.iter_mut().chain(self.behind.iter_mut()) {
            sample.point = project_to_ground(sample.point, spatial, offset);
        }
    }
}

/// `point` with `y` replaced by the ground height below it plus `offset`.
/// Keeps the profile elevation where the spatial query reports no ground.
pub fn project_to_ground(mut point: Point, spatial: &impl SpatialQuery, offset: f64) -> Point {
    if let Some(ground) = spatial.elevation_at(point.position.x, point.position.z) {
        point.position.y = ground + offset;
    }
    point
}

impl PathQuery<'_> {
    /// Assemble a [`Forecast`] at `(lane, s)` using the sampling options in
    /// the query config.  `None` when the start position is invalid.
    pub fn forecast(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        prefs: &PreferredConnections,
    ) -> Option<Forecast> {
        let network = self.network();
        let config = self.config();
        let origin = network.lane_center_point(lane, s)?;

        let ahead = self.sample(lane, s, direction, prefs, true, config.forecast_ahead_m)?;
        let behind = self.sample(lane, s, direction, prefs, false, config.forecast_behind_m)?;

        let mut series: Vec<CurvatureSample> = behind
            .iter()
            .rev()
            .chain(ahead.iter())
            .filter_map(Sample::curvature)
            .collect();
        series.dedup_by(|b, a| a.distance == b.distance);
        let mut curvatures = reduce_curvature_series(&series);
        curvatures.truncate(MAX_FORECAST_CURVATURES);

        let mut lanes_ahead = ExpectedLanes::new();
        if let Some(walk) = self.walk(lane, s, direction, true, prefs) {
            let range = config.forecast_ahead_m;
            lanes_ahead.extend(walk.take_while(|step| step.distance <= range).map(|step| step.lane));
        }

        let l = network.lane(lane);
        let side = match direction {
            TravelDirection::Normal => l.side(),
            TravelDirection::WrongWay => opposite_side(l.side()),
        };

        Some(Forecast {
            origin,
            ahead: ahead.iter().map(|sample| sample.at).collect(),
            behind: behind.iter().skip(1).map(|sample| sample.at).collect(),
            curvatures,
            speed_limits: self.speed_limits_ahead(lane, s, direction, config.forecast_ahead_m, prefs),
            intersections: self.intersections_ahead(lane, s, direction, config.forecast_ahead_m, prefs),
            lanes_in_direction: network.driving_lane_count(l.section, side, s),
            lanes_opposite: network.driving_lane_count(l.section, opposite_side(side), s),
            lanes_ahead,
        })
    }

    /// Points every `forecast_spacing_m` from the origin out to `range_m`,
    /// with the walk direction at each.  Distances are negative behind.
    /// Stops early at a dead end.
    fn sample(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        prefs: &PreferredConnections,
        ahead: bool,
        range_m: f64,
    ) -> Option<Vec<Sample>> {
        let network = self.network();
        let spacing = self.config().forecast_spacing_m;
        let sign = if ahead { 1.0 } else { -1.0 };

        let mut samples = Vec::new();
        let mut k = 0usize;
        let mut target = 0.0;
        for step in self.walk(lane, s, direction, ahead, prefs)? {
            while target <= range_m && target <= step.end_distance() + od_network::S_TOLERANCE {
                let offset = target - step.distance;
                if let Some(point) = network.lane_center_point(step.lane, step.s_at(offset)) {
                    let at = ForecastPoint { distance: sign * target, point };
                    samples.push(Sample { at, along: step.along, ahead });
                }
                k += 1;
                target = k as f64 * spacing;
            }
            if target > range_m {
                break;
            }
        }
        Some(samples)
    }
}

struct Sample {
    at: ForecastPoint,
    along: Along,
    ahead: bool,
}

impl Sample {
    /// Curvature in the vehicle's direction of travel: the walk direction
    /// ahead, its reverse behind.
    fn curvature(&self) -> Option<CurvatureSample> {
        let k = self.at.point.curvature?;
        let travel = if self.ahead { self.along.sign() } else { -self.along.sign() };
        Some(CurvatureSample { distance: self.at.distance, curvature: k * travel })
    }
}

fn opposite_side(side: LaneSide) -> LaneSide {
    match side {
        LaneSide::Left => LaneSide::Right,
        LaneSide::Right => LaneSide::Left,
    }
}
