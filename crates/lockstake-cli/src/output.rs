// crates/lockstake-cli/src/output.rs
//
// Output formatting utilities for the Lockstake CLI.
// Supports table and JSON output modes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use lockstake_core::{BasisPoints, Timestamp, BASIS_POINTS};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render basis points as a multiplier, e.g. `19500` -> `1.9500x`.
pub fn format_bps(bps: BasisPoints) -> String {
    format!("{}.{:04}x", bps / BASIS_POINTS, bps % BASIS_POINTS)
}

/// Render a unix timestamp as RFC 3339, or `-` for zero.
pub fn format_timestamp(ts: Timestamp) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

/// Render a duration in seconds as days plus leftover hours.
pub fn format_duration(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    if hours == 0 {
        format!("{}d", days)
    } else {
        format!("{}d {}h", days, hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bps() {
        assert_eq!(format_bps(10_000), "1.0000x");
        assert_eq!(format_bps(19_500), "1.9500x");
        assert_eq!(format_bps(10_508), "1.0508x");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "-");
        assert_eq!(format_timestamp(86_400), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30 * 86_400), "30d");
        assert_eq!(format_duration(2 * 86_400 + 7_200), "2d 2h");
    }
}
