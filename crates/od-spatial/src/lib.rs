//! `od-spatial` — an R-tree over lane surfaces that answers the ground and
//! raycast queries of [`od_query::SpatialQuery`] without a renderer.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`index`] | `LaneSurfaceIndex` (rstar R-tree of lane patches), `IndexConfig` |
//! | [`error`] | `SpatialError`, `SpatialResult<T>`                        |
//!
//! Hosts with their own collision world implement `SpatialQuery` directly
//! and do not need this crate.

pub mod error;
pub mod index;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use index::{IndexConfig, LaneSurfaceIndex};
