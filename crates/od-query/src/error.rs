//! Query error types.
//!
//! Misses (off-road, no continuation, unreachable target) are ordinary
//! outcomes and come back as `None` or empty results.  Only caller mistakes
//! are errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid query config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },
}

pub type QueryResult<T> = Result<T, QueryError>;
