//! `od-query` — path queries, forecasts, and lane location over a loaded
//! [`od_network::RoadNetwork`].
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`walk`]     | `TravelDirection`, `Along`, bounded `LaneWalk` iterator      |
//! | [`query`]    | `PathQuery`: points, speed changes, junctions, target distance |
//! | [`forecast`] | `Forecast`, curvature series reduction, terrain projection   |
//! | [`locator`]  | `most_probable_lane`, `ExpectedLanes`, scoring constants     |
//! | [`adas`]     | ADAS lane/line classification and neighbor occupancy         |
//! | [`spatial`]  | `SpatialQuery` trait consumed by the locator                 |
//! | [`config`]   | `QueryConfig`                                                |
//! | [`error`]    | `QueryError`, `QueryResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | `locate_batch` runs on Rayon's thread pool.               |
//!
//! Queries hold no per-vehicle state.  The caller threads its lane, `s`,
//! expected lanes and preferred connections through every call.

pub mod adas;
pub mod config;
pub mod error;
pub mod forecast;
pub mod locator;
pub mod query;
pub mod spatial;
pub mod walk;


pub use adas::{AdasLaneInformation, AdasLaneType, AdasLineType, LinePosition, TrafficPosition};
pub use config::QueryConfig;
pub use error::{QueryError, QueryResult};
pub use forecast::{
    CURVATURE_EPSILON, CurvatureSample, Forecast, ForecastPoint, MAX_FORECAST_CURVATURES,
    project_to_ground, reduce_curvature_series,
};
pub use locator::{
    ExpectedLanes, LaneMatch, VehiclePose, locate, locate_batch, most_probable_lane,
};
pub use query::{IntersectionAhead, PathQuery, RoadPosition, SpeedLimitChange, UNREACHABLE};
pub use spatial::{RayHit, SpatialQuery};
pub use walk::{Along, LaneWalk, Step, TravelDirection};
