use crate::prelude::{CoreResult, MatchError};

/// Coordinates read from a WKT point. WKT order is longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WktPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: Option<f64>,
}

/// Parses `POINT(lon lat)`, `POINT (lon lat)` or `POINT Z (lon lat alt)`.
pub fn parse_point(raw: &str) -> CoreResult<WktPoint> {
    let text = raw.trim();
    let invalid = || MatchError::coordinate("geo_position", text);

    let head = text
        .get(.."POINT".len())
        .filter(|head| head.eq_ignore_ascii_case("POINT"))
        .ok_or_else(invalid)?;
    let rest = text[head.len()..].trim_start();
    let rest = match rest.strip_prefix(['Z', 'z']) {
        Some(after_z) => after_z.trim_start(),
        None => rest,
    };
    let body = rest
        .strip_prefix('(')
        .and_then(|r| r.trim_end().strip_suffix(')'))
        .ok_or_else(invalid)?;

    let values = body
        .split_whitespace()
        .map(|token| token.parse::<f64>().map_err(|_| invalid()))
        .collect::<CoreResult<Vec<_>>>()?;

    match values.as_slice() {
        [lon, lat] => Ok(WktPoint {
            longitude: *lon,
            latitude: *lat,
            altitude: None,
        }),
        [lon, lat, alt] => Ok(WktPoint {
            longitude: *lon,
            latitude: *lat,
            altitude: Some(*alt),
        }),
        _ => Err(invalid()),
    }
}
