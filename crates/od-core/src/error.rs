//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `OdError` as one variant
//! through `#[from]`.

use thiserror::Error;

/// Errors raised by the primitive parsers in `od-core`.
#[derive(Debug, Error)]
pub enum OdError {
    #[error("unknown speed unit {0:?}")]
    UnknownUnit(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `od-core`.
pub type OdResult<T> = Result<T, OdError>;
