//! Calendar-day bucketing of raw post timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tagpulse_core::NOT_AVAILABLE;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Extracts the calendar date of a raw timestamp.
///
/// RFC 3339 values are dated in their own offset. Offset-less datetimes and
/// bare dates are accepted as-is. Returns `None` for [`NOT_AVAILABLE`] and
/// anything unparseable.
#[must_use]
pub fn post_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NOT_AVAILABLE {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_feed_datetime_attribute() {
        assert_eq!(post_date("2025-08-01T09:15:00.000Z"), Some(date(2025, 8, 1)));
    }

    #[test]
    fn offset_timestamp_uses_its_own_calendar_day() {
        assert_eq!(
            post_date("2025-08-01T23:30:00+05:30"),
            Some(date(2025, 8, 1))
        );
    }

    #[test]
    fn utc_feed_timestamps_bucket_on_the_utc_day() {
        // 20:00Z is already 2 August in Kolkata.
        assert_eq!(post_date("2025-08-01T20:00:00.000Z"), Some(date(2025, 8, 1)));
    }

    #[test]
    fn parses_naive_datetimes_and_dates() {
        assert_eq!(post_date("2025-08-01 14:00:00"), Some(date(2025, 8, 1)));
        assert_eq!(post_date("2025-08-01T14:00:00"), Some(date(2025, 8, 1)));
        assert_eq!(post_date("2025-08-01"), Some(date(2025, 8, 1)));
    }

    #[test]
    fn placeholder_and_garbage_are_none() {
        assert_eq!(post_date("N/A"), None);
        assert_eq!(post_date(""), None);
        assert_eq!(post_date("yesterday"), None);
        assert_eq!(post_date("2025-13-40"), None);
    }
}
