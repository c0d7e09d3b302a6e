//! Timestamp utilities
//!
//! Stored timestamps are fixed-width RFC 3339 UTC text with millisecond
//! precision, so string comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Year-month bucket ("YYYY-MM") used for recent-submission counts
pub fn timestamp_bucket(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Text form written to `created_at` / `updated_at` columns
pub fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a `created_at` / `updated_at` column value
pub fn from_db_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
}
