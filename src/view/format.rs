//! Display formatting

use chrono::{DateTime, Local, NaiveDateTime};

/// `ru-RU` style date and time
const DISPLAY_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Offset-less layouts the backend emits
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Reformat an ISO-8601 timestamp for display.
///
/// Timestamps with an offset are shown in local time; offset-less ones are
/// already local. Anything unparseable is returned verbatim.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// One decimal place
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}", value)
}
