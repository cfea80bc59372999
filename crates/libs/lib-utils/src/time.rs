//! # Time Utilities
//!
//! Block time formatting using chrono. Chains render `time_point_sec` values
//! as `YYYY-MM-DDTHH:MM:SS` in UTC, without offset or fraction.

use chrono::DateTime;

const TIME_POINT_SEC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format seconds since the Unix epoch as a chain `time_point_sec` string.
pub fn format_time_point_sec(secs: u32) -> String {
    // Every u32 second count is a representable timestamp.
    DateTime::from_timestamp(i64::from(secs), 0)
        .map(|dt| dt.format(TIME_POINT_SEC_FORMAT).to_string())
        .unwrap_or_default()
}
