//! Small text and time helpers shared by the command layer

use chrono::{DateTime, Utc};

/// Shorten `text` to at most `max_chars` characters, appending `...` when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// `true` for `None`, the empty string and whitespace-only strings
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Parse a comma-separated tag string
///
/// Elements are trimmed and empty ones dropped; `None` when nothing is left.
pub fn parse_tags(input: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    (!tags.is_empty()).then_some(tags)
}

/// Human-readable distance from `at` to `now`
///
/// Anything older than 30 days is shown as a plain `YYYY-MM-DD` date.
pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    let mins = secs.div_euclid(60);
    let hours = mins.div_euclid(60);
    let days = hours.div_euclid(24);

    if secs < 60 {
        "just now".to_string()
    } else if mins < 60 {
        plural(mins, "min")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 30 {
        plural(days, "day")
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s ago", n, unit)
    } else {
        format!("{} {} ago", n, unit)
    }
}
