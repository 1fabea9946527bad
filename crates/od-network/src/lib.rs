//! `od-network` — road network data model, loading, topology and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`document`] | Serde document schema (`Document`, `RoadRecord`, …)           |
//! | [`loader`]   | JSON document loading (`load_document_json`)                  |
//! | [`xodr`]     | OpenDRIVE XML loading (feature = `"xodr"` only)               |
//! | [`builder`]  | `NetworkBuilder`: validation and construction                 |
//! | [`linker`]   | Lane predecessor/successor resolution                         |
//! | [`model`]    | `Road`, `LaneSection`, `Lane`, `Junction`, `Link`, `Point`     |
//! | [`network`]  | `RoadNetwork` arenas and lane geometry accessors              |
//! | [`graph`]    | `RoadGraph` (CSR lane graph)                                  |
//! | [`router`]   | `Router` trait, `LanePath`, `DijkstraRouter`                  |
//! | [`prefs`]    | `PreferredConnections` tie-break list                         |
//! | [`config`]   | `NetworkConfig`                                               |
//! | [`error`]    | `LoadError`, `RouteError` and result aliases                  |
//!
//! # Feature flags
//!
//! | Flag   | Effect                                                         |
//! |--------|----------------------------------------------------------------|
//! | `xodr` | Enables `.xodr` loading via the `quick-xml` crate.             |
//!
//! # Coordinates
//!
//! Documents are authored in a right-handed `(x, y)` plane with elevation
//! `h`.  Every world position returned by the network is y-up:
//! `(x, h, -y)`.  Headings stay in the document plane, radians CCW from +x.

pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod linker;
pub mod loader;
pub mod model;
pub mod network;
pub mod prefs;
pub mod router;

#[cfg(feature = "xodr")]
pub mod xodr;

#[cfg(test)]
mod tests;

/// Slack when comparing road positions against section and road bounds.
pub const S_TOLERANCE: f64 = 1e-6;

pub use builder::NetworkBuilder;
pub use config::NetworkConfig;
pub use document::{
    ConnectionRecord, Document, ElementType, GeometryKindRecord, GeometryRecord, Header,
    JunctionRecord, LaneLinkRecord, LaneRecord, LaneSectionRecord, LaneSpeedRecord,
    LinkTargetRecord, PolyRecord, RoadLinkRecord, RoadMarkRecord, RoadRecord, RoadSpeedRecord,
    WidthRecord,
};
pub use error::{LoadError, LoadResult, RouteError, RouteResult};
pub use graph::RoadGraph;
pub use linker::LinkStats;
pub use loader::{load_document_json, load_document_reader, parse_document_json};
pub use model::{
    Connection, ContactPoint, Junction, Lane, LaneRef, LaneSection, LaneSide, LaneType, LaneWidth,
    Link, Point, Road, RoadLink, RoadMark, RoadMarkType, SpeedRecord,
};
pub use network::{ContinuityGap, RoadNetwork};
pub use prefs::{Preference, PreferredConnections};
pub use router::{DijkstraRouter, LanePath, Router};
