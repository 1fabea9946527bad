//! Speed units used by road and lane speed records.
//!
//! Every speed that leaves the engine is normalized to km/h.

use std::str::FromStr;

use crate::OdError;

/// Unit attached to an authored speed value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "km/h"))]
    Kmh,
    #[cfg_attr(feature = "serde", serde(rename = "m/s"))]
    Ms,
    #[cfg_attr(feature = "serde", serde(rename = "mph"))]
    Mph,
}

impl SpeedUnit {
    const MPH_TO_KMH: f64 = 1.609_344;
    const MS_TO_KMH: f64 = 3.6;

    /// Convert `value` expressed in this unit to km/h.
    #[inline]
    pub fn to_kmh(self, value: f64) -> f64 {
        match self {
            SpeedUnit::Kmh => value,
            SpeedUnit::Ms  => value * Self::MS_TO_KMH,
            SpeedUnit::Mph => value * Self::MPH_TO_KMH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpeedUnit::Kmh => "km/h",
            SpeedUnit::Ms  => "m/s",
            SpeedUnit::Mph => "mph",
        }
    }
}

impl FromStr for SpeedUnit {
    type Err = OdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "km/h" | "kmh" => Ok(SpeedUnit::Kmh),
            "m/s" | "ms"   => Ok(SpeedUnit::Ms),
            "mph"          => Ok(SpeedUnit::Mph),
            other => Err(OdError::UnknownUnit(other.to_owned())),
        }
    }
}

impl std::fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
