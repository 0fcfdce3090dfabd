//! Human-relative timestamps ("3 days ago")

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a forum timestamp into a naive UTC datetime
///
/// Accepts RFC 3339 (`2021-03-04T12:00:00.000Z`, the forum's format) and
/// offset-less ISO 8601 (`2021-03-04T12:00:00`).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Describe `then` relative to the current UTC clock
pub fn naturaltime_now(then: NaiveDateTime) -> String {
    naturaltime(then, Utc::now().naive_utc())
}

/// Describe `then` relative to `now`: "now", "a minute ago", "3 days from now", ...
pub fn naturaltime(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let seconds = (now - then).num_seconds();
    let delta = naturaldelta(seconds.unsigned_abs());

    if delta == "a moment" {
        "now".to_string()
    } else if seconds < 0 {
        format!("{} from now", delta)
    } else {
        format!("{} ago", delta)
    }
}

/// Describe a duration in seconds, using months and years for long spans
fn naturaldelta(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let seconds = total_seconds % 86_400;
    let years = days / 365;
    let days = days % 365;
    let months = (days as f64 / 30.5) as u64;

    if years == 0 && days == 0 {
        return match seconds {
            0 => "a moment".to_string(),
            1 => "a second".to_string(),
            2..=59 => format!("{} seconds", seconds),
            60..=119 => "a minute".to_string(),
            120..=3599 => format!("{} minutes", seconds / 60),
            3600..=7199 => "an hour".to_string(),
            _ => format!("{} hours", seconds / 3600),
        };
    }

    match years {
        0 => match (days, months) {
            (1, _) => "a day".to_string(),
            (_, 0) => format!("{} days", days),
            (_, 1) => "a month".to_string(),
            _ => format!("{} months", months),
        },
        1 => match (days, months) {
            (0, 0) => "a year".to_string(),
            (1, 0) => "1 year, 1 day".to_string(),
            (_, 0) => format!("1 year, {} days", days),
            (_, 1) => "1 year, 1 month".to_string(),
            _ => format!("1 year, {} months", months),
        },
        _ => format!("{} years", years),
    }
}
