//! `HH:MM` durations and clock times.

use chrono::{NaiveDateTime, NaiveTime};

/// Minutes as zero-padded `HH:MM`. Hours may exceed 24.
pub fn format_duration(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// `HH:MM` (or `H:MM`) to minutes.
pub fn parse_duration(text: &str) -> Option<u32> {
    let (hours, minutes) = text.trim().split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (minutes < 60).then_some(hours * 60 + minutes)
}

/// Whole minutes from `start` to `end`, floored; zero if `end` is earlier.
pub fn elapsed_minutes(start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    u32::try_from((end - start).num_minutes()).unwrap_or(0)
}

/// Wall-clock `HH:MM` (or `H:MM`).
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
