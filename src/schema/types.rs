//! Column metadata and classification types
//!
//! This module defines the values exchanged between the schema cache and the
//! macro engine:
//! - `ColumnDescriptor`: a column name and its declared SQL type
//! - `TimeUnit`: the scale of an epoch column's integer values
//! - `ColumnClassification`: how a column stores time, if at all

use serde::{Deserialize, Serialize};

/// A column as reported by a `DESCRIBE`-style metadata query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, exactly as the database reports it
    pub name: String,
    /// Declared SQL type, e.g. `BIGINT` or `Nullable(DateTime64(3))`
    #[serde(default)]
    pub declared_type: String,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

impl std::fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.declared_type)
    }
}

/// Unit of an epoch column's integer values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    /// Get all units for iteration
    pub fn all() -> &'static [TimeUnit] {
        &[
            TimeUnit::Seconds,
            TimeUnit::Millis,
            TimeUnit::Micros,
            TimeUnit::Nanos,
        ]
    }

    /// Short suffix used in column naming conventions (`_s`, `_ms`, ...)
    pub fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Millis => "ms",
            TimeUnit::Micros => "us",
            TimeUnit::Nanos => "ns",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeUnit::Seconds => write!(f, "seconds"),
            TimeUnit::Millis => write!(f, "milliseconds"),
            TimeUnit::Micros => write!(f, "microseconds"),
            TimeUnit::Nanos => write!(f, "nanoseconds"),
        }
    }
}

/// How a column stores time
///
/// An epoch column whose unit could not be inferred keeps `unit: None`
/// so callers can decide whether to warn, block, or ask the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnClassification {
    /// Native DATE / DATETIME / TIMESTAMP column
    Temporal,
    /// Integer count of time units since the Unix epoch
    Epoch { unit: Option<TimeUnit> },
    /// Not a time column
    NotTimeLike,
}

impl ColumnClassification {
    /// Whether the column can be filtered on with concrete bounds
    pub fn is_filterable(&self) -> bool {
        matches!(
            self,
            ColumnClassification::Temporal | ColumnClassification::Epoch { unit: Some(_) }
        )
    }

    /// Whether the column looks like a time column at all
    pub fn is_time_like(&self) -> bool {
        !matches!(self, ColumnClassification::NotTimeLike)
    }
}

impl std::fmt::Display for ColumnClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnClassification::Temporal => write!(f, "temporal"),
            ColumnClassification::Epoch { unit: Some(unit) } => write!(f, "epoch ({})", unit),
            ColumnClassification::Epoch { unit: None } => write!(f, "epoch (unknown unit)"),
            ColumnClassification::NotTimeLike => write!(f, "not time-like"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filterable() {
        assert!(ColumnClassification::Temporal.is_filterable());
        assert!(ColumnClassification::Epoch {
            unit: Some(TimeUnit::Millis)
        }
        .is_filterable());
        assert!(!ColumnClassification::Epoch { unit: None }.is_filterable());
        assert!(!ColumnClassification::NotTimeLike.is_filterable());
    }

    #[test]
    fn test_classification_serde() {
        let json = serde_json::to_string(&ColumnClassification::Epoch {
            unit: Some(TimeUnit::Nanos),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"epoch","unit":"nanos"}"#);

        let parsed: ColumnClassification = serde_json::from_str(r#"{"kind":"temporal"}"#).unwrap();
        assert_eq!(parsed, ColumnClassification::Temporal);
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeUnit::Micros.to_string(), "microseconds");
        assert_eq!(
            ColumnClassification::Epoch { unit: None }.to_string(),
            "epoch (unknown unit)"
        );
        assert_eq!(
            ColumnDescriptor::new("ts", "BIGINT").to_string(),
            "ts BIGINT"
        );
    }
}
