use crate::records::sample::GeoPosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether altitude took part in a distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementType {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

impl MeasurementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::TwoD => "2D",
            MeasurementType::ThreeD => "3D",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One truth sample paired with its time-closest sensor sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub timestamp: DateTime<Utc>,
    pub truth_position: GeoPosition,
    pub sensor_position: GeoPosition,
    pub distance_m: f64,
    pub measurement: MeasurementType,
    pub within_tolerance: bool,
    /// Sensor time minus truth time.
    pub time_delta_ms: i64,
}
