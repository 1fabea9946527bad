//! Load and routing error types.
//!
//! A `LoadError` is fatal to the document load that raised it: no partially
//! built network is ever returned.  Every variant names the authored
//! road/lane/junction id so the offending record can be found.

use thiserror::Error;

use od_core::{LaneId, OdError};
use od_geometry::GeometryError;

/// Errors produced while loading and linking a document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("duplicate road id {0:?}")]
    DuplicateRoad(String),

    #[error("duplicate junction id {0:?}")]
    DuplicateJunction(String),

    #[error("road {road:?}: invalid length {length}")]
    InvalidLength { road: String, length: f64 },

    #[error("road {road:?}: plan view length {plan_view} differs from road length {length}")]
    LengthMismatch { road: String, plan_view: f64, length: f64 },

    #[error("road {road:?}: {source}")]
    Geometry {
        road: String,
        #[source]
        source: GeometryError,
    },

    #[error("road {road:?} has no lane sections")]
    NoLaneSections { road: String },

    #[error("road {road:?}: lane section at s={s} is out of order or outside the road")]
    SectionOrder { road: String, s: f64 },

    #[error("road {road:?}, section s={s}: lane id 0 is reserved for the center line")]
    CenterLane { road: String, s: f64 },

    #[error("road {road:?}, section s={s}: duplicate lane id {lane}")]
    DuplicateLane { road: String, s: f64, lane: i32 },

    #[error("road {road:?}, section s={s}: lane ids are not contiguous from the center line")]
    NonContiguousLanes { road: String, s: f64 },

    #[error("road {road:?} references unknown road {target:?}")]
    UnknownRoad { road: String, target: String },

    #[error("road {road:?} references unknown junction {junction:?}")]
    UnknownJunction { road: String, junction: String },

    #[error("road {road:?}: link to road {target:?} has no contact point")]
    MissingContactPoint { road: String, target: String },

    #[error("junction {junction:?}, connection {connection:?} references unknown road {target:?}")]
    UnknownConnectionRoad { junction: String, connection: String, target: String },

    #[error("road {road:?}, lane {lane}: {direction} lane {target} does not exist on road {target_road:?}")]
    DanglingLane {
        road: String,
        lane: i32,
        direction: &'static str,
        target: i32,
        target_road: String,
    },

    #[error("invalid value: {0}")]
    Value(#[from] OdError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xodr")]
    #[error("XML parse error: {0}")]
    Xml(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors produced by [`crate::Router`] implementations.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: LaneId, to: LaneId },

    #[error("lane {0} not found in network")]
    LaneNotFound(LaneId),
}

pub type RouteResult<T> = Result<T, RouteError>;
