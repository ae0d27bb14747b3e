use anyhow::Context;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use matchcore::ingest::{SensorRecord, TruthRecord};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Configuration for generating a synthetic truth track and sensor feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub samples: usize,
    pub interval_ms: u64,
    pub start: DateTime<Utc>,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub speed_mps: f64,
    pub altitude_m: f64,
    /// Maximum absolute sensor clock offset per detection.
    pub sensor_jitter_ms: i64,
    pub position_noise_m: f64,
    /// Probability that a truth sample has no detection at all.
    pub dropout: f64,
    pub sensor_altitude: bool,
    pub seed: u64,
    pub description: Option<String>,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            samples: 600,
            interval_ms: 100,
            start: DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default(),
            center_lat: 47.3769,
            center_lon: 8.5417,
            radius_m: 150.0,
            speed_mps: 12.0,
            altitude_m: 480.0,
            sensor_jitter_ms: 40,
            position_noise_m: 6.0,
            dropout: 0.05,
            sensor_altitude: true,
            seed: 0,
            description: None,
        }
    }
}

/// Generated input pair in the same shape the CSV readers produce.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFlight {
    pub truth: Vec<TruthRecord>,
    pub sensor: Vec<SensorRecord>,
}

fn circle_position(config: &FlightConfig, elapsed_s: f64) -> (f64, f64) {
    let radius = config.radius_m.max(1.0);
    let angle = config.speed_mps * elapsed_s / radius;
    let north = radius * angle.sin();
    let east = radius * angle.cos();
    offset_degrees(config.center_lat, config.center_lon, north, east)
}

fn offset_degrees(lat: f64, lon: f64, north_m: f64, east_m: f64) -> (f64, f64) {
    let lat_out = lat + north_m / METERS_PER_DEGREE;
    let lon_out = lon + east_m / (METERS_PER_DEGREE * lat.to_radians().cos().max(1e-6));
    (lat_out, lon_out)
}

fn symmetric(rng: &mut StdRng, amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        rng.gen_range(-amplitude..amplitude)
    } else {
        0.0
    }
}

/// Truth rows carry the flight start in `datetime(utc)` and the elapsed time
/// in `time(millisecond)`; sensor rows carry absolute RFC 3339 instants.
pub fn build_flight(config: &FlightConfig) -> anyhow::Result<SyntheticFlight> {
    let interval = i64::try_from(config.interval_ms).context("interval_ms out of range")?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let base_text = config.start.format("%Y-%m-%d %H:%M:%S").to_string();
    let mut flight = SyntheticFlight {
        truth: Vec::with_capacity(config.samples),
        sensor: Vec::with_capacity(config.samples),
    };

    for index in 0..config.samples {
        let elapsed_ms = interval
            .checked_mul(index as i64)
            .context("overflow computing elapsed time for generator")?;
        let (lat, lon) = circle_position(config, elapsed_ms as f64 / 1_000.0);
        let climb = 5.0 * (2.0 * PI * index as f64 / config.samples.max(1) as f64).sin();
        let altitude = config.altitude_m + climb;

        flight.truth.push(TruthRecord {
            datetime: Some(base_text.clone()),
            offset_ms: Some(elapsed_ms.to_string()),
            latitude: Some(format!("{lat:.7}")),
            longitude: Some(format!("{lon:.7}")),
            altitude: Some(format!("{altitude:.1}")),
        });

        if config.dropout > 0.0 && rng.gen_bool(config.dropout.min(1.0)) {
            continue;
        }

        let jitter = if config.sensor_jitter_ms > 0 {
            rng.gen_range(-config.sensor_jitter_ms..=config.sensor_jitter_ms)
        } else {
            0
        };
        let received = config.start + Duration::milliseconds(elapsed_ms + jitter);
        let (sensor_lat, sensor_lon) = offset_degrees(
            lat,
            lon,
            symmetric(&mut rng, config.position_noise_m),
            symmetric(&mut rng, config.position_noise_m),
        );
        let sensor_alt = if config.sensor_altitude {
            altitude + symmetric(&mut rng, config.position_noise_m)
        } else {
            0.0
        };

        flight.sensor.push(SensorRecord {
            object_id: Some("1".into()),
            datasource_id: Some(format!("synthetic-{}", config.seed)),
            received: Some(received.to_rfc3339_opts(SecondsFormat::Millis, true)),
            geo_position: Some(format!("POINT({sensor_lon:.7} {sensor_lat:.7})")),
            latitude: None,
            longitude: None,
            altitude: Some(format!("{sensor_alt:.1}")),
        });
    }

    Ok(flight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchcore::ingest::{ingest_sensor, ingest_truth};

    #[test]
    fn generator_builds_expected_sample_count() {
        let config = FlightConfig {
            samples: 50,
            dropout: 0.0,
            ..Default::default()
        };
        let flight = build_flight(&config).unwrap();
        assert_eq!(flight.truth.len(), 50);
        assert_eq!(flight.sensor.len(), 50);
    }

    #[test]
    fn generated_rows_normalise_cleanly() {
        let flight = build_flight(&FlightConfig::default()).unwrap();
        let truth = ingest_truth(&flight.truth);
        let sensor = ingest_sensor(&flight.sensor);
        assert!(truth.rejected.is_empty());
        assert!(sensor.rejected.is_empty());
        assert_eq!(truth.samples[1].epoch_ms() - truth.samples[0].epoch_ms(), 100);
        assert!(sensor.samples.iter().all(|s| s.position.altitude.is_some()));
    }

    #[test]
    fn same_seed_is_reproducible() {
        let config = FlightConfig {
            samples: 40,
            seed: 13,
            description: Some("repeat".into()),
            ..Default::default()
        };
        let a = build_flight(&config).unwrap();
        let b = build_flight(&config).unwrap();
        let a_received: Vec<_> = a.sensor.iter().map(|s| s.received.clone()).collect();
        let b_received: Vec<_> = b.sensor.iter().map(|s| s.received.clone()).collect();
        assert_eq!(a_received, b_received);
    }

    #[test]
    fn demo_profile_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/flight.yaml");
        let contents = std::fs::read_to_string(path).unwrap();
        let config: FlightConfig = serde_yaml::from_str(&contents).unwrap();
        assert_eq!(config.samples, 1200);
        assert_eq!(config.start.timestamp(), 1_704_067_200);
    }

    #[test]
    fn disabled_sensor_altitude_yields_zero_sentinel() {
        let config = FlightConfig {
            samples: 10,
            dropout: 0.0,
            sensor_altitude: false,
            ..Default::default()
        };
        let flight = build_flight(&config).unwrap();
        assert!(flight
            .sensor
            .iter()
            .all(|s| s.altitude.as_deref() == Some("0.0")));
        let sensor = ingest_sensor(&flight.sensor);
        assert!(sensor.samples.iter().all(|s| s.position.altitude.is_none()));
    }
}
