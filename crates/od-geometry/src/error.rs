//! Geometry error type.

use thiserror::Error;

/// Errors produced while reconstructing a reference line.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("plan view has no segments with positive length")]
    EmptyPlanView,

    #[error("segment {index} has a non-finite parameter")]
    NonFinite { index: usize },
}

pub type GeometryResult<T> = Result<T, GeometryError>;
