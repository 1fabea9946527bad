//! CSV drive-log reader.
//!
//! # CSV format
//!
//! One row per recorded vehicle pose, in time order.  Positions are in the
//! y-up world frame; `heading_deg` follows the document convention
//! (counter-clockwise from +x).
//!
//! ```csv
//! time_s,x,y,z,heading_deg
//! 0.0,10.0,0.0,1.75,0.0
//! 0.5,17.0,0.0,1.75,0.5
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use od_core::Vec3;
use od_query::VehiclePose;

use crate::ReplayResult;

/// One recorded pose.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct LogRecord {
    pub time_s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading_deg: f64,
}

impl LogRecord {
    pub fn pose(&self) -> VehiclePose {
        VehiclePose {
            position: Vec3::new(self.x, self.y, self.z),
            heading: self.heading_deg.to_radians(),
        }
    }
}

/// Read a drive log from a CSV file.
pub fn read_log(path: &Path) -> ReplayResult<Vec<LogRecord>> {
    let file = std::fs::File::open(path)?;
    read_log_reader(file)
}

/// Like [`read_log`] but accepts any `Read` source.
pub fn read_log_reader<R: Read>(reader: R) -> ReplayResult<Vec<LogRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records = csv_reader
        .deserialize::<LogRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("read drive log: {} rows", records.len());
    Ok(records)
}
