//! Tabular form of match results, one row per matched truth sample.

use crate::records::{MatchResult, MeasurementType};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// Column order of the exported table.
pub const HEADER: [&str; 10] = [
    "Timestamp",
    "Truth Latitude",
    "Truth Longitude",
    "Truth Altitude",
    "Sensor Latitude",
    "Sensor Longitude",
    "Sensor Altitude",
    "Distance between (m)",
    "Type of measurement",
    "Within Tolerance?",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Truth Latitude")]
    pub truth_latitude: f64,
    #[serde(rename = "Truth Longitude")]
    pub truth_longitude: f64,
    #[serde(rename = "Truth Altitude")]
    pub truth_altitude: Option<f64>,
    #[serde(rename = "Sensor Latitude")]
    pub sensor_latitude: f64,
    #[serde(rename = "Sensor Longitude")]
    pub sensor_longitude: f64,
    #[serde(rename = "Sensor Altitude")]
    pub sensor_altitude: Option<f64>,
    /// Fixed two decimals.
    #[serde(rename = "Distance between (m)")]
    pub distance_m: String,
    #[serde(rename = "Type of measurement")]
    pub measurement: MeasurementType,
    #[serde(rename = "Within Tolerance?")]
    pub within_tolerance: u8,
}

impl From<&MatchResult> for MatchRow {
    fn from(result: &MatchResult) -> Self {
        Self {
            timestamp: result
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            truth_latitude: result.truth_position.latitude,
            truth_longitude: result.truth_position.longitude,
            truth_altitude: result.truth_position.altitude,
            sensor_latitude: result.sensor_position.latitude,
            sensor_longitude: result.sensor_position.longitude,
            sensor_altitude: result.sensor_position.altitude,
            distance_m: format!("{:.2}", result.distance_m),
            measurement: result.measurement,
            within_tolerance: u8::from(result.within_tolerance),
        }
    }
}

pub fn to_rows(results: &[MatchResult]) -> Vec<MatchRow> {
    results.iter().map(MatchRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::GeoPosition;
    use chrono::{TimeZone, Utc};

    fn result(distance_m: f64, within_tolerance: bool) -> MatchResult {
        MatchResult {
            timestamp: Utc.timestamp_millis_opt(1_704_067_200_050).unwrap(),
            truth_position: GeoPosition::new(10.0, 20.0, Some(100.0)),
            sensor_position: GeoPosition::surface(10.0001, 20.0001),
            distance_m,
            measurement: MeasurementType::TwoD,
            within_tolerance,
            time_delta_ms: 50,
        }
    }

    #[test]
    fn row_uses_iso_millis_and_two_decimals() {
        let row = MatchRow::from(&result(15.60649, true));
        assert_eq!(row.timestamp, "2024-01-01T00:00:00.050Z");
        assert_eq!(row.distance_m, "15.61");
        assert_eq!(row.within_tolerance, 1);
        assert_eq!(row.sensor_altitude, None);
    }

    #[test]
    fn failing_tolerance_is_zero() {
        let row = MatchRow::from(&result(120.0, false));
        assert_eq!(row.within_tolerance, 0);
        assert_eq!(row.distance_m, "120.00");
    }

    #[test]
    fn json_keys_follow_table_header() {
        let value = serde_json::to_value(MatchRow::from(&result(1.0, true))).unwrap();
        let object = value.as_object().unwrap();
        for column in HEADER {
            assert!(object.contains_key(column), "missing {column}");
        }
        assert_eq!(object["Type of measurement"], "2D");
    }
}
