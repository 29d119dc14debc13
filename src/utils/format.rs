//! Display helpers for history entries

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Friendly label for when a session happened, relative to now.
///
/// `Today · 9:05 AM`, `Yesterday · 6:45 PM`, otherwise `Feb 15 · 11:20 AM`.
pub fn format_session_date(timestamp_ms: i64) -> String {
    format_session_date_at(timestamp_ms, &Local::now())
}

/// Same as [`format_session_date`] with an explicit "now" and time zone
pub fn format_session_date_at<Tz>(timestamp_ms: i64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(date) = now.timezone().timestamp_millis_opt(timestamp_ms).single() else {
        return "Unknown date".to_string();
    };

    let diff_days = (now.date_naive() - date.date_naive()).num_days();
    let time = date.format("%-I:%M %p");

    match diff_days {
        0 => format!("Today · {}", time),
        1 => format!("Yesterday · {}", time),
        _ => format!("{} · {}", date.format("%b %-d"), time),
    }
}

/// Print a number with at most two decimals and no trailing zeros
pub fn format_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
