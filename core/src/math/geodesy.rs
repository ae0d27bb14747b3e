use crate::prelude::{CoreResult, MatchError};
use crate::records::{GeoPosition, MeasurementType};

/// Mean Earth radius used by the spherical model, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance between two positions together with the mode that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub meters: f64,
    pub kind: MeasurementType,
}

/// Great-circle distance in metres between two lat/lon pairs (degrees).
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1.0 for antipodal pairs
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Checks ranges and finiteness of every populated field.
pub fn validate_position(position: &GeoPosition) -> CoreResult<()> {
    let GeoPosition {
        latitude,
        longitude,
        altitude,
    } = *position;

    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(MatchError::coordinate("latitude", latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(MatchError::coordinate("longitude", longitude));
    }
    if let Some(alt) = altitude {
        if !alt.is_finite() {
            return Err(MatchError::coordinate("altitude", alt));
        }
    }
    Ok(())
}

/// Distance from `truth` to `sensor`.
///
/// The pair is measured in 3D (slant range) only when the sensor position has
/// an altitude strictly above zero; a missing truth altitude then counts as
/// zero. Otherwise the horizontal great-circle distance is returned and any
/// truth altitude is ignored.
pub fn distance(truth: &GeoPosition, sensor: &GeoPosition) -> CoreResult<Measurement> {
    validate_position(truth)?;
    validate_position(sensor)?;

    let horizontal = haversine_m(
        truth.latitude,
        truth.longitude,
        sensor.latitude,
        sensor.longitude,
    );

    match sensor.altitude.filter(|alt| *alt > 0.0) {
        Some(sensor_alt) => {
            let delta_alt = truth.altitude.unwrap_or(0.0) - sensor_alt;
            Ok(Measurement {
                meters: horizontal.hypot(delta_alt),
                kind: MeasurementType::ThreeD,
            })
        }
        None => Ok(Measurement {
            meters: horizontal,
            kind: MeasurementType::TwoD,
        }),
    }
}
