//! Time utilities for listing windows and XMLTV timestamps

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// XMLTV wire format without the offset suffix
pub const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// XMLTV timestamps look like `20240101120000` or `20240101120000 +0100`
static XMLTV_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{14}(?:\s+[+-]\d{4})?$").expect("XMLTV timestamp regex is valid")
});

/// Today's date on the local machine
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Consecutive dates starting at `start`, `days` long
pub fn listing_window(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|offset| start.checked_add_signed(Duration::days(i64::from(offset))))
        .collect()
}

/// Key used by grid responses for a listing day
pub fn grid_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Unix timestamp of `date` at `hour`:00 local time
pub fn local_timestamp_at(date: NaiveDate, hour: u32) -> Option<i64> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Whether a string is already in XMLTV wire form
pub fn is_xmltv_time(value: &str) -> bool {
    XMLTV_TIME_REGEX.is_match(value)
}

/// Render an instant as an XMLTV UTC timestamp
pub fn format_xmltv_time(dt: &DateTime<Utc>) -> String {
    format!("{} +0000", dt.format(XMLTV_TIME_FORMAT))
}

/// Parse an XMLTV timestamp; a missing offset is read as UTC
pub fn parse_xmltv_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if !is_xmltv_time(value) {
        return None;
    }
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    DateTime::parse_from_str(&normalized, &format!("{XMLTV_TIME_FORMAT} %z"))
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, XMLTV_TIME_FORMAT).map(|dt| dt.and_utc()))
        .ok()
}

/// Parse the looser date formats feeds use (`pubDate`, ISO 8601)
pub fn parse_feed_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
