//! Query bounds and forecast sampling options.

use crate::{QueryError, QueryResult};

/// Options shared by every path query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryConfig {
    /// Upper bound on the distance any walk covers, metres.  Protects
    /// against cyclic networks and absurd lookahead distances.
    pub max_traversal_m: f64,

    /// Upper bound on the number of lanes a single walk enters.
    pub max_lane_steps: usize,

    /// Distance between forecast samples, metres.
    pub forecast_spacing_m: f64,

    /// How far ahead a forecast samples, metres.
    pub forecast_ahead_m: f64,

    /// How far behind a forecast samples, metres.
    pub forecast_behind_m: f64,

    /// Height added to the ground elevation when forecast points are
    /// projected onto terrain.
    pub terrain_offset_m: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_traversal_m: 10_000.0,
            max_lane_steps: 1_000,
            forecast_spacing_m: 5.0,
            forecast_ahead_m: 250.0,
            forecast_behind_m: 50.0,
            terrain_offset_m: 0.0,
        }
    }
}

impl QueryConfig {
    /// Reject values that would make a walk or a sampling loop meaningless.
    pub fn validate(&self) -> QueryResult<()> {
        let positive = [
            ("max_traversal_m", self.max_traversal_m),
            ("forecast_spacing_m", self.forecast_spacing_m),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(QueryError::InvalidConfig { field, value });
            }
        }
        for (field, value) in [("forecast_ahead_m", self.forecast_ahead_m), ("forecast_behind_m", self.forecast_behind_m)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(QueryError::InvalidConfig { field, value });
            }
        }
        if self.max_lane_steps == 0 {
            return Err(QueryError::InvalidConfig { field: "max_lane_steps", value: 0.0 });
        }
        Ok(())
    }
}
