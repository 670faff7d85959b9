use chrono::{DateTime, Local, NaiveTime, TimeZone};
use std::time::{SystemTime, UNIX_EPOCH};

pub const LAST_UPDATE_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn current_time_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

pub fn format_last_update<Tz: TimeZone>(datetime: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    datetime.format(LAST_UPDATE_FORMAT).to_string()
}

/// Parses a wall clock time like `05:30`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs).ok()
        .and_then(|s| Local.timestamp_opt(s, 0).single())
        .map_or_else(|| secs.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}
