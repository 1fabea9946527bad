//! Spatial index error type.

use thiserror::Error;

/// Errors produced by `od-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("invalid index config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
