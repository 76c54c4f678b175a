//! SQL literals for range bounds
//!
//! Temporal columns get quoted timestamp literals; epoch columns get bare
//! integers scaled to the column's unit.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::TimeUnit;

/// Literal used for bounds that cannot be rendered
pub const NULL_LITERAL: &str = "NULL";

/// Always-true condition used when no filter can be built
pub const ALWAYS_TRUE: &str = "1=1";

/// How temporal bounds are written into the query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampStyle {
    /// `'2024-01-01 00:00:00'`
    #[default]
    Plain,
    /// `TIMESTAMP '2024-01-01 00:00:00'`
    Ansi,
    /// `'2024-01-01T00:00:00Z'`
    Iso8601,
}

impl TimestampStyle {
    /// Render an instant as a SQL literal in UTC
    ///
    /// Milliseconds are printed only when they are non-zero.
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        let has_millis = instant.nanosecond() / 1_000_000 != 0;

        match self {
            TimestampStyle::Plain => format!("'{}'", plain_timestamp(instant, has_millis)),
            TimestampStyle::Ansi => {
                format!("TIMESTAMP '{}'", plain_timestamp(instant, has_millis))
            }
            TimestampStyle::Iso8601 => {
                let layout = if has_millis {
                    "%Y-%m-%dT%H:%M:%S%.3fZ"
                } else {
                    "%Y-%m-%dT%H:%M:%SZ"
                };
                format!("'{}'", instant.format(layout))
            }
        }
    }
}

impl std::str::FromStr for TimestampStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(TimestampStyle::Plain),
            "ansi" => Ok(TimestampStyle::Ansi),
            "iso8601" | "iso" => Ok(TimestampStyle::Iso8601),
            other => Err(format!(
                "unknown timestamp style '{}': expected plain, ansi or iso8601",
                other
            )),
        }
    }
}

impl std::fmt::Display for TimestampStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampStyle::Plain => write!(f, "plain"),
            TimestampStyle::Ansi => write!(f, "ansi"),
            TimestampStyle::Iso8601 => write!(f, "iso8601"),
        }
    }
}

fn plain_timestamp(instant: &DateTime<Utc>, has_millis: bool) -> String {
    let layout = if has_millis {
        "%Y-%m-%d %H:%M:%S%.3f"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    instant.format(layout).to_string()
}

/// Scale an instant to an epoch value in `unit`
///
/// Millisecond precision is the source of truth: seconds truncate toward
/// zero, finer units are exact multiples. Computed in `i128`, so nanosecond
/// values never overflow.
pub fn scale_to_unit(instant: &DateTime<Utc>, unit: TimeUnit) -> i128 {
    let millis = i128::from(instant.timestamp_millis());

    match unit {
        TimeUnit::Seconds => millis / 1_000,
        TimeUnit::Millis => millis,
        TimeUnit::Micros => millis * 1_000,
        TimeUnit::Nanos => millis * 1_000_000,
    }
}
