//! `od-replay` — post-hoc analysis of recorded drives.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`drive_log`] | `LogRecord`, CSV drive-log reader                      |
//! | [`replay`]    | `Replay`: per-row lane location, speed limit, target distance |
//! | [`report`]    | `ReportWriter`: CSV report output                      |
//! | [`error`]     | `ReplayError`, `ReplayResult<T>`                       |
//!
//! [`replay_files`] wires the three together over a JSON network and the
//! `od-spatial` lane-surface index.

pub mod drive_log;
pub mod error;
pub mod replay;
pub mod report;


use std::path::Path;

use od_network::{NetworkConfig, RoadNetwork};
use od_query::{PathQuery, QueryConfig, RoadPosition};
use od_spatial::LaneSurfaceIndex;

pub use drive_log::{LogRecord, read_log, read_log_reader};
pub use error::{ReplayError, ReplayResult};
pub use replay::{Replay, ReplayConfig, ReplayRow};
pub use report::{REPORT_HEADER, ReportWriter};

/// A report target named by authored road id, resolved once the network
/// is loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportTarget {
    pub road: String,
    pub lane_id: i32,
    pub s: f64,
}

/// Replay the drive log at `log_path` over the JSON network at
/// `network_path` and write the report to `report_path`.  Returns the
/// number of rows written.
pub fn replay_files(
    network_path: &Path,
    log_path: &Path,
    report_path: &Path,
    target: Option<&ReportTarget>,
) -> ReplayResult<usize> {
    let network = RoadNetwork::load_json(network_path, &NetworkConfig::default())?;
    let index = LaneSurfaceIndex::build(&network)?;
    let query = PathQuery::with_config(&network, QueryConfig::default())?;

    let mut replay = Replay::new(query, &index);
    if let Some(target) = target {
        let road = network
            .road_by_id(&target.road)
            .ok_or_else(|| ReplayError::UnknownRoad(target.road.clone()))?;
        replay = replay.with_target(RoadPosition { road, lane_id: target.lane_id, s: target.s });
    }
    let rows = replay.run(&read_log(log_path)?);

    let mut writer = ReportWriter::create(report_path)?;
    writer.write_rows(&rows)?;
    writer.finish()?;
    Ok(rows.len())
}
