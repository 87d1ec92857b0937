//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a whole number of minutes to a chrono Duration
pub fn minutes(minutes: i64) -> Duration {
    Duration::minutes(minutes)
}
