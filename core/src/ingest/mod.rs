//! Normalisation of raw truth/sensor rows into validated [`GeoSample`]s.
//!
//! Bad rows never abort a batch: each one is reported as a [`RejectedRecord`]
//! carrying the condition that excluded it.

pub mod raw;
pub mod timestamp;
pub mod wkt;

pub use raw::{SensorRecord, TruthRecord};
pub use timestamp::{apply_offset, parse_instant, parse_offset_ms};
pub use wkt::{parse_point, WktPoint};

use crate::math::geodesy::validate_position;
use crate::prelude::{CoreResult, MatchError, Series};
use crate::records::{GeoPosition, GeoSample};
use log::debug;
use raw::cell;

/// A row excluded during normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub index: usize,
    pub error: MatchError,
}

/// Samples that survived normalisation, in input order, plus the rejects.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub samples: Vec<GeoSample>,
    pub rejected: Vec<RejectedRecord>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.samples.len() + self.rejected.len()
    }

    pub fn rejected_coordinates(&self) -> usize {
        self.rejected
            .iter()
            .filter(|r| matches!(r.error, MatchError::InvalidCoordinate { .. }))
            .count()
    }

    pub fn rejected_timestamps(&self) -> usize {
        self.rejected
            .iter()
            .filter(|r| matches!(r.error, MatchError::MalformedTimestamp { .. }))
            .count()
    }
}

pub fn ingest_truth(records: &[TruthRecord]) -> IngestReport {
    collect(Series::Truth, records, normalize_truth, |_| None)
}

pub fn ingest_sensor(records: &[SensorRecord]) -> IngestReport {
    collect(Series::Sensor, records, normalize_sensor, SensorRecord::source_label)
}

fn collect<R>(
    series: Series,
    records: &[R],
    normalize: impl Fn(&R) -> CoreResult<GeoSample>,
    label: impl Fn(&R) -> Option<String>,
) -> IngestReport {
    let mut report = IngestReport {
        samples: Vec::with_capacity(records.len()),
        rejected: Vec::new(),
    };
    for (index, record) in records.iter().enumerate() {
        match normalize(record) {
            Ok(sample) => report.samples.push(sample),
            Err(error) => {
                match label(record) {
                    Some(source) => {
                        debug!("skipping {} row {} ({}): {}", series, index, source, error)
                    }
                    None => debug!("skipping {} row {}: {}", series, index, error),
                }
                report.rejected.push(RejectedRecord { index, error });
            }
        }
    }
    report
}

/// Base date/time plus the optional millisecond offset column.
pub fn normalize_truth(record: &TruthRecord) -> CoreResult<GeoSample> {
    let base = parse_instant(cell(&record.datetime).unwrap_or_default())?;
    let offset = parse_offset_ms(cell(&record.offset_ms))?;
    let timestamp = apply_offset(base, offset)?;

    let position = GeoPosition::new(
        parse_number("latitude", cell(&record.latitude))?,
        parse_number("longitude", cell(&record.longitude))?,
        parse_altitude(cell(&record.altitude))?,
    );
    validate_position(&position)?;
    Ok(GeoSample::new(timestamp, position))
}

/// Reads the WKT `GeoPosition` column when present, else `Latitude`/`Longitude`.
pub fn normalize_sensor(record: &SensorRecord) -> CoreResult<GeoSample> {
    let timestamp = parse_instant(cell(&record.received).unwrap_or_default())?;

    let (latitude, longitude, wkt_altitude) = match cell(&record.geo_position) {
        Some(wkt) => {
            let point = parse_point(wkt)?;
            (point.latitude, point.longitude, point.altitude)
        }
        None => (
            parse_number("latitude", cell(&record.latitude))?,
            parse_number("longitude", cell(&record.longitude))?,
            None,
        ),
    };
    let altitude = match parse_altitude(cell(&record.altitude))? {
        Some(alt) => Some(alt),
        None => wkt_altitude,
    };

    let position = GeoPosition::new(latitude, longitude, altitude);
    validate_position(&position)?;
    Ok(GeoSample::new(timestamp, position))
}

fn parse_number(field: &'static str, value: Option<&str>) -> CoreResult<f64> {
    let text = value.ok_or_else(|| MatchError::coordinate(field, "<missing>"))?;
    let number: f64 = text
        .parse()
        .map_err(|_| MatchError::coordinate(field, text))?;
    if !number.is_finite() {
        return Err(MatchError::coordinate(field, text));
    }
    Ok(number)
}

fn parse_altitude(value: Option<&str>) -> CoreResult<Option<f64>> {
    value.map(|text| parse_number("altitude", Some(text))).transpose()
}
