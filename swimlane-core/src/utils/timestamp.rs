use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Parse an ISO-8601 timestamp.
///
/// Offset-carrying forms (`...Z`, `...+02:00`) are taken as-is; naive forms
/// such as `2024-01-01T00:00:00.250000` are interpreted as UTC.
pub fn parse_timestamp(iso: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let iso = iso.trim();
    OffsetDateTime::parse(iso, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(iso, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(iso, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc))
}

/// Convert a millisecond count to a [`Duration`], rounded to microseconds.
///
/// Returns `None` for NaN and infinities.
pub fn duration_from_millis(millis: f64) -> Option<Duration> {
    if !millis.is_finite() {
        return None;
    }
    // Float-to-int `as` saturates, so absurd values stay representable.
    Some(Duration::microseconds((millis * 1000.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::UtcOffset;

    #[test]
    fn test_parse_utc_timestamp() {
        let parsed = parse_timestamp("2024-01-01T00:00:00.000Z").unwrap();
        assert_eq!(parsed.unix_timestamp(), 1_704_067_200);
        assert_eq!(parsed.offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_parse_offset_timestamp() {
        let parsed = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed.unix_timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_parse_naive_timestamp_as_utc() {
        let parsed = parse_timestamp("2024-01-01T00:00:00.250000").unwrap();
        assert_eq!(parsed.unix_timestamp(), 1_704_067_200);
        assert_eq!(parsed.millisecond(), 250);
        assert_eq!(parsed.offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_duration_from_millis() {
        assert_eq!(duration_from_millis(50.0), Some(Duration::milliseconds(50)));
        assert_eq!(duration_from_millis(-5.0), Some(Duration::milliseconds(-5)));
        assert_eq!(duration_from_millis(0.5), Some(Duration::microseconds(500)));
        assert_eq!(duration_from_millis(f64::NAN), None);
        assert_eq!(duration_from_millis(f64::INFINITY), None);
    }
}
