//! `od-core` — foundational types for the `od-engine` road network.
//!
//! This crate is a dependency of every other `od-*` crate.  It has no `od-*`
//! dependencies and a single required external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `RoadId`, `SectionId`, `LaneId`, `JunctionId`, `ConnectionId`, `NodeId`, `EdgeId` |
//! | [`geo`]     | `Vec3`, angle normalization, heading difference, `ramp`   |
//! | [`units`]   | `SpeedUnit` and km/h normalization                        |
//! | [`error`]   | `OdError`, `OdResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod units;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{OdError, OdResult};
pub use geo::{Vec3, heading_diff_deg, normalize_angle, ramp};
pub use ids::{ConnectionId, EdgeId, JunctionId, LaneId, NodeId, RoadId, SectionId};
pub use units::SpeedUnit;
