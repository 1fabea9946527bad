//! `od-geometry` — continuous reference lines from parametric segments.
//!
//! A road's plan view is authored as an ordered list of typed curve segments.
//! This crate turns that list into a [`ReferenceLine`]: a continuous,
//! sampleable function of arc length `s` that yields position, heading and
//! curvature.
//!
//! # Crate layout
//!
//! | Module             | Contents                                             |
//! |--------------------|------------------------------------------------------|
//! | [`segment`]        | `SegmentKind`, `Segment`, local-frame evaluation     |
//! | [`reference_line`] | `ReferenceLine`, `AuthoredSegment`, `Pose`, projection |
//! | [`profile`]        | `CubicPoly`, `CubicProfile` (elevation, offsets, widths) |
//! | [`error`]          | `GeometryError`, `GeometryResult<T>`                 |
//!
//! # Determinism
//!
//! Spiral positions have no closed form and are integrated numerically with a
//! fixed number of Simpson steps ([`SPIRAL_INTEGRATION_STEPS`]).  The step
//! count never adapts to the input, so the same document always produces the
//! same coordinates.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod profile;
pub mod reference_line;
pub mod segment;


pub use error::{GeometryError, GeometryResult};
pub use profile::{CubicPoly, CubicProfile};
pub use reference_line::{AuthoredSegment, Pose, Projection, ReferenceLine};
pub use segment::{ParamRange, Segment, SegmentKind, SPIRAL_INTEGRATION_STEPS};
