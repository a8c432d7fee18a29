// ABOUTME: Display helpers shared by the console front ends
// ABOUTME: Local date formatting and character-aware truncation

use chrono::{DateTime, Local, Utc};

use crate::sla::parse_timestamp;

/// Formats a backend timestamp as local `dd/mm/yyyy HH:MM:SS`, or `-` when unset.
pub fn format_datetime(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => format_local(dt),
        None => "-".to_string(),
    }
}

pub fn format_local(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

/// Truncates a string to a maximum number of characters with ellipsis
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
