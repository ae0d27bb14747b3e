use crate::prelude::{CoreResult, MatchError};
use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a date/time field into an instant truncated to whole milliseconds.
///
/// Accepts RFC 3339, naive date/times (read as UTC) and bare integers (Unix
/// epoch milliseconds).
pub fn parse_instant(raw: &str) -> CoreResult<DateTime<Utc>> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(MatchError::timestamp(raw, "empty date/time"));
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = text
            .parse()
            .map_err(|err| MatchError::timestamp(raw, format!("epoch millis: {err}")))?;
        return from_millis(raw, millis);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return from_millis(raw, parsed.timestamp_millis());
    }

    let text = text.strip_suffix(['Z', 'z']).unwrap_or(text);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return from_millis(raw, naive.and_utc().timestamp_millis());
        }
    }

    Err(MatchError::timestamp(raw, "unrecognised date/time format"))
}

/// Parses the optional sub-second offset column. Missing or blank means zero.
///
/// Fractional values are truncated toward zero, never rounded.
pub fn parse_offset_ms(raw: Option<&str>) -> CoreResult<i64> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(0);
    };
    let value: f64 = text
        .parse()
        .map_err(|_| MatchError::timestamp(text, "millisecond offset is not a number"))?;
    if !value.is_finite() {
        return Err(MatchError::timestamp(text, "millisecond offset is not finite"));
    }
    Ok(value.trunc() as i64)
}

/// Shifts `base` by `offset_ms`, failing if the result leaves chrono's range.
pub fn apply_offset(base: DateTime<Utc>, offset_ms: i64) -> CoreResult<DateTime<Utc>> {
    let millis = base
        .timestamp_millis()
        .checked_add(offset_ms)
        .ok_or_else(|| MatchError::timestamp(base.to_rfc3339(), "offset overflows"))?;
    from_millis(&base.to_rfc3339(), millis)
}

fn from_millis(raw: &str, millis: i64) -> CoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| MatchError::timestamp(raw, "instant out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_millis() {
        let ts = parse_instant("2024-01-01T00:00:00.050Z").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_704_067_200_050);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_instant("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn naive_datetimes_are_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 14, 33, 21).unwrap();
        assert_eq!(parse_instant("2024-03-05 14:33:21").unwrap(), expected);
        assert_eq!(parse_instant("2024/03/05 14:33:21").unwrap(), expected);
        assert_eq!(parse_instant(" 2024-03-05T14:33:21 ").unwrap(), expected);
        assert_eq!(
            parse_instant("2024-03-05 14:33:21.250").unwrap().timestamp_millis(),
            expected.timestamp_millis() + 250
        );
    }

    #[test]
    fn sub_millisecond_precision_is_truncated() {
        let ts = parse_instant("2024-01-01T00:00:00.123987Z").unwrap();
        assert_eq!(ts.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn bare_integer_is_epoch_millis() {
        let ts = parse_instant("1704067200050").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_704_067_200_050);
    }

    #[test]
    fn garbage_is_malformed() {
        for raw in ["", "   ", "yesterday", "2024-13-45 99:00:00"] {
            assert!(matches!(
                parse_instant(raw),
                Err(MatchError::MalformedTimestamp { .. })
            ));
        }
    }

    #[test]
    fn offset_defaults_to_zero_and_truncates() {
        assert_eq!(parse_offset_ms(None).unwrap(), 0);
        assert_eq!(parse_offset_ms(Some("")).unwrap(), 0);
        assert_eq!(parse_offset_ms(Some("250")).unwrap(), 250);
        assert_eq!(parse_offset_ms(Some("99.6")).unwrap(), 99);
        assert_eq!(parse_offset_ms(Some("0.6")).unwrap(), 0);
        assert_eq!(parse_offset_ms(Some("-2.7")).unwrap(), -2);
        assert!(parse_offset_ms(Some("abc")).is_err());
    }

    #[test]
    fn offset_is_added_to_base() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let shifted = apply_offset(base, 1_500).unwrap();
        assert_eq!(shifted.timestamp_millis() - base.timestamp_millis(), 1_500);
    }
}
