//! CSV report writer.
//!
//! ```csv
//! time_s,road,lane,s,speed_limit_kmh,distance_to_target_m
//! 0,R1,-1,10,50,140
//! 0.5,,,,,
//! ```
//!
//! Unset values are empty fields.  An unreachable target is `-1`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::replay::ReplayRow;
use crate::{ReplayError, ReplayResult};

pub const REPORT_HEADER: [&str; 6] =
    ["time_s", "road", "lane", "s", "speed_limit_kmh", "distance_to_target_m"];

/// Writes [`ReplayRow`]s as CSV.
pub struct ReportWriter<W: Write> {
    writer: Writer<W>,
}

impl ReportWriter<File> {
    /// Create (or truncate) the report file at `path` and write the header.
    pub fn create(path: &Path) -> ReplayResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn from_writer(inner: W) -> ReplayResult<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(REPORT_HEADER)?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &ReplayRow) -> ReplayResult<()> {
        self.writer.write_record(&[
            row.time_s.to_string(),
            row.road.clone().unwrap_or_default(),
            row.lane.map(|id| id.to_string()).unwrap_or_default(),
            field(row.s),
            field(row.speed_limit_kmh),
            field(row.distance_to_target_m),
        ])?;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[ReplayRow]) -> ReplayResult<()> {
        rows.iter().try_for_each(|row| self.write_row(row))
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> ReplayResult<W> {
        self.writer.into_inner().map_err(|e| ReplayError::Io(e.into_error()))
    }
}

fn field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
