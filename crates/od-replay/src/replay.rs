//! Row-by-row replay of a drive log against a road network.
//!
//! Each row is located the way a live tick loop would: the lanes reached
//! within [`ReplayConfig::expected_lookahead_m`] of the previous row's lane
//! become the expected lanes for the next row.  A row that cannot be
//! located clears them.

use od_core::LaneId;
use od_network::PreferredConnections;
use od_query::{
    ExpectedLanes, PathQuery, RoadPosition, SpatialQuery, TravelDirection, locate,
};

use crate::drive_log::LogRecord;
use crate::{ReplayError, ReplayResult};

/// Replay options.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConfig {
    /// Distance ahead of a located lane whose lanes are expected on the
    /// next row, metres.
    pub expected_lookahead_m: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { expected_lookahead_m: 50.0 }
    }
}

/// One report row.  Fields are `None` when the row could not be located
/// (or, for the target distance, when no target is set).
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayRow {
    pub time_s: f64,
    /// Authored road id.
    pub road: Option<String>,
    /// Signed lane id.
    pub lane: Option<i32>,
    pub s: Option<f64>,
    pub speed_limit_kmh: Option<f64>,
    /// Distance to the target along the walk, or
    /// [`UNREACHABLE`](od_query::UNREACHABLE).
    pub distance_to_target_m: Option<f64>,
}

impl ReplayRow {
    fn unlocated(time_s: f64) -> Self {
        Self {
            time_s,
            road: None,
            lane: None,
            s: None,
            speed_limit_kmh: None,
            distance_to_target_m: None,
        }
    }
}

/// Replays drive logs over one network and spatial query.
pub struct Replay<'a, S> {
    query: PathQuery<'a>,
    spatial: &'a S,
    prefs: PreferredConnections,
    target: Option<RoadPosition>,
    config: ReplayConfig,
}

impl<'a, S: SpatialQuery> Replay<'a, S> {
    pub fn new(query: PathQuery<'a>, spatial: &'a S) -> Self {
        Self {
            query,
            spatial,
            prefs: PreferredConnections::new(),
            target: None,
            config: ReplayConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplayConfig) -> ReplayResult<Self> {
        let lookahead = config.expected_lookahead_m;
        if !(lookahead.is_finite() && lookahead >= 0.0) {
            return Err(ReplayError::InvalidConfig { field: "expected_lookahead_m", value: lookahead });
        }
        self.config = config;
        Ok(self)
    }

    /// Report the distance to `target` on every located row.
    pub fn with_target(mut self, target: RoadPosition) -> Self {
        self.target = Some(target);
        self
    }

    /// Junction choices used for target distances and expected lanes.
    pub fn with_preferences(mut self, prefs: PreferredConnections) -> Self {
        self.prefs = prefs;
        self
    }

    /// Replay `records` in order, one report row each.
    pub fn run(&self, records: &[LogRecord]) -> Vec<ReplayRow> {
        let mut expected = ExpectedLanes::new();
        let rows: Vec<ReplayRow> = records.iter().map(|r| self.step(r, &mut expected)).collect();
        let located = rows.iter().filter(|r| r.lane.is_some()).count();
        log::info!("replayed {} rows, {} located", rows.len(), located);
        rows
    }

    fn step(&self, record: &LogRecord, expected: &mut ExpectedLanes) -> ReplayRow {
        let network = self.query.network();
        let pose = record.pose();
        let Some(found) = locate(network, self.spatial, &pose, expected) else {
            log::debug!("t={:.3}: no lane below ({:.2}, {:.2})", record.time_s, record.x, record.z);
            expected.clear();
            return ReplayRow::unlocated(record.time_s);
        };

        let lane = network.lane(found.lane);
        let direction = network
            .lane_center_point(found.lane, found.s)
            .map_or(TravelDirection::Normal, |p| {
                TravelDirection::from_headings(p.travel_heading(), pose.heading)
            });
        let distance_to_target_m = self.target.map(|target| {
            self.query
                .distance_to_target_or_sentinel(found.lane, found.s, direction, &self.prefs, target)
        });
        self.expect_ahead(found.lane, found.s, direction, expected);

        ReplayRow {
            time_s: record.time_s,
            road: Some(network.road(lane.road).id.clone()),
            lane: Some(lane.id),
            s: Some(found.s),
            speed_limit_kmh: network.speed_limit_at(found.lane, found.s),
            distance_to_target_m,
        }
    }

    fn expect_ahead(
        &self,
        lane: LaneId,
        s: f64,
        direction: TravelDirection,
        expected: &mut ExpectedLanes,
    ) {
        expected.clear();
        expected.insert(lane);
        let Some(walk) = self.query.walk(lane, s, direction, true, &self.prefs) else {
            return;
        };
        let lookahead = self.config.expected_lookahead_m;
        expected.extend(walk.take_while(|step| step.distance <= lookahead).map(|step| step.lane));
    }
}
