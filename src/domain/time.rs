//! Lenient timestamp parsing for graph properties.
//!
//! The activity graph stores dates and times as strings in several shapes
//! (`2035-01-10`, `2035-01-10T12:00:00`, `2035-01-10 12:00:00.250`, RFC 3339
//! with an offset). Everything is reduced to a naive wall-clock timestamp;
//! offsets are discarded, not converted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Parse a timestamp in any of the accepted shapes.
///
/// Date-only values resolve to midnight. Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Parse a JSON property as a timestamp.
///
/// Strings go through [`parse_timestamp`]; integers are read as Unix
/// seconds. Everything else is rejected.
#[must_use]
pub fn timestamp_from_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Parse a JSON property as a calendar day.
#[must_use]
pub fn day_from_value(value: &Value) -> Option<NaiveDate> {
    timestamp_from_value(value).map(|ts| ts.date())
}

/// Seconds since the Unix epoch for a naive timestamp read as UTC.
#[must_use]
pub fn epoch_seconds(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp()
}
