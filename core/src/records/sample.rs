use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geodetic position in decimal degrees (WGS-84) with optional altitude in metres.
///
/// `altitude` is `None` when the source carried no reliable value. A recorded
/// altitude of exactly zero is treated as a missing reading, see
/// [`GeoPosition::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

impl GeoPosition {
    /// Builds a position, folding a zero altitude into `None`.
    pub fn new(latitude: f64, longitude: f64, altitude: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            altitude: altitude.filter(|alt| *alt != 0.0),
        }
    }

    pub fn surface(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, None)
    }
}

/// Normalised observation shared by the truth and sensor series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoSample {
    pub timestamp: DateTime<Utc>,
    pub position: GeoPosition,
}

impl GeoSample {
    pub fn new(timestamp: DateTime<Utc>, position: GeoPosition) -> Self {
        Self {
            timestamp,
            position,
        }
    }

    /// Unix epoch milliseconds of the sample.
    pub fn epoch_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
