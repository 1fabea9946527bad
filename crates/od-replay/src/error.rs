//! Error types for od-replay.

use thiserror::Error;

use od_network::LoadError;
use od_query::QueryError;
use od_spatial::SpatialError;

/// Errors that can occur while replaying a drive log.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("network load failed: {0}")]
    Load(#[from] LoadError),

    #[error("query config rejected: {0}")]
    Query(#[from] QueryError),

    #[error("spatial index failed: {0}")]
    Spatial(#[from] SpatialError),

    #[error("target road {0:?} not found in network")]
    UnknownRoad(String),

    #[error("replay config rejected: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },
}

/// Alias for `Result<T, ReplayError>`.
pub type ReplayResult<T> = Result<T, ReplayError>;
