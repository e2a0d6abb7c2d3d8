//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use std::time::Duration;

/// Format an update interval the way it is shown to users
///
/// Intervals of a minute or more are shown in whole minutes, shorter ones in
/// seconds.
pub fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs >= 60 {
        let minutes = secs / 60;
        format!("{minutes} minute{}", plural(minutes))
    } else {
        format!("{secs} second{}", plural(secs))
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Truncate text to a maximum number of characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::from_secs(120)), "2 minutes");
        assert_eq!(format_interval(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_interval(Duration::from_secs(90)), "1 minute");
        assert_eq!(format_interval(Duration::from_secs(45)), "45 seconds");
        assert_eq!(format_interval(Duration::from_secs(1)), "1 second");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("very long text here", 10), "very lo...");
        assert_eq!(truncate_text("ÄÖÜäöüßÄÖÜ", 5), "ÄÖ...");
    }
}
