use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::models::CommentStatus;

const UNITS: [(i64, &str); 5] = [
    (365 * 86_400, "year"),
    (30 * 86_400, "month"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
];

/// "just now", "5 minutes ago", "1 day ago", ...
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(timestamp).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    for (size, unit) in UNITS {
        let count = seconds / size;
        if count >= 1 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{} {}{} ago", count, unit, plural);
        }
    }

    "just now".to_string()
}

/// Relative time for the last month, a plain date before that
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    if now.signed_duration_since(timestamp).num_days() > 30 {
        return timestamp.format("%Y-%m-%d %H:%M").to_string();
    }

    format_relative_time(timestamp, now)
}

/// Status label colored for terminal output
pub fn status_label(status: CommentStatus) -> ColoredString {
    match status {
        CommentStatus::Pending => status.as_str().yellow(),
        CommentStatus::Approved => status.as_str().green(),
        CommentStatus::Rejected => status.as_str().red(),
    }
}

/// First line of `text`, cut to `max` characters
pub fn excerpt(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max && !text.contains('\n') {
        return line.to_string();
    }

    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}
