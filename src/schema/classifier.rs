//! Time Field Classifier
//!
//! Decides whether a column stores native date/time values, integer epoch
//! values, or nothing time-like, and infers the unit of epoch columns.
//!
//! # Rules
//!
//! The declared type governs the kind of column:
//!
//! ```text
//! DATE / DATETIME / TIMESTAMP*   -> Temporal
//! BIGINT / LONG / NUMERIC / INT* -> Epoch { unit }
//! anything else                  -> NotTimeLike
//! ```
//!
//! Epoch units are inferred from the lower-cased column name, first match wins:
//!
//! 1. unit marker or unit word (`_ns`, `_nsec`, `nanos`, `_ms`, `_ms_utc`, `millis`,
//!    `_s`, `secs`, ...)
//! 2. well-known names (`__timestamp` is nanoseconds, `created_at` is milliseconds)
//! 3. names mentioning `time` or `date` are assumed to be nanoseconds
//! 4. otherwise the unit stays unknown

use super::types::{ColumnClassification, ColumnDescriptor, TimeUnit};

/// Declared-type fragments of native date/time columns
const TEMPORAL_TYPES: &[&str] = &["date", "timestamp", "datetime"];

/// Declared-type fragments of integer columns that may hold epoch values
const NUMERIC_TYPES: &[&str] = &["bigint", "long", "numeric", "int"];

/// Naming rule for epoch units
struct UnitRule {
    unit: TimeUnit,
    /// Abbreviated marker such as `_ms`
    marker: &'static str,
    /// The marker only counts at the very end of the name
    suffix_only: bool,
    /// Matched anywhere in the name
    words: &'static [&'static str],
}

impl UnitRule {
    fn matches(&self, name: &str) -> bool {
        self.has_marker(name) || self.words.iter().any(|w| name.contains(w))
    }

    /// `_ms` matches at the end, before another `_` segment, or spelled out as
    /// `_msec`/`_msecs`
    fn has_marker(&self, name: &str) -> bool {
        if self.suffix_only {
            return name.ends_with(self.marker);
        }

        name.match_indices(self.marker).any(|(start, marker)| {
            let rest = &name[start + marker.len()..];
            let rest = rest
                .strip_prefix("ecs")
                .or_else(|| rest.strip_prefix("ec"))
                .unwrap_or(rest);
            rest.is_empty() || rest.starts_with('_')
        })
    }
}

/// Ordered from finest to coarsest so `microseconds` never reads as `sec`
const UNIT_RULES: &[UnitRule] = &[
    UnitRule {
        unit: TimeUnit::Nanos,
        marker: "_ns",
        suffix_only: false,
        words: &["nanos", "nano"],
    },
    UnitRule {
        unit: TimeUnit::Micros,
        marker: "_us",
        suffix_only: false,
        words: &["micros", "micro"],
    },
    UnitRule {
        unit: TimeUnit::Millis,
        marker: "_ms",
        suffix_only: false,
        words: &["millis", "milli"],
    },
    UnitRule {
        unit: TimeUnit::Seconds,
        marker: "_s",
        suffix_only: true,
        words: &["secs", "sec"],
    },
];

/// Column names with an established storage convention
const KNOWN_NAMES: &[(&str, TimeUnit)] = &[
    ("__timestamp", TimeUnit::Nanos),
    ("created_at", TimeUnit::Millis),
    ("create_date", TimeUnit::Millis),
];

/// Name fragments that make an unlabeled epoch column a nanosecond column
const BROAD_TIME_WORDS: &[&str] = &["time", "date", "timestamp"];

/// Classify a column from its name and declared type
///
/// Pure function of the descriptor: no state, no I/O, never fails.
pub fn classify(column: &ColumnDescriptor) -> ColumnClassification {
    let declared = column.declared_type.to_lowercase();

    if TEMPORAL_TYPES.iter().any(|t| declared.contains(t)) {
        return ColumnClassification::Temporal;
    }

    if NUMERIC_TYPES.iter().any(|t| declared.contains(t)) {
        return ColumnClassification::Epoch {
            unit: infer_unit(&column.name),
        };
    }

    ColumnClassification::NotTimeLike
}

/// Infer the epoch unit of a numeric column from its name
///
/// Returns `None` when the name carries no usable hint.
pub fn infer_unit(name: &str) -> Option<TimeUnit> {
    let name = name.to_lowercase();

    for rule in UNIT_RULES {
        if rule.matches(&name) {
            return Some(rule.unit);
        }
    }

    if let Some((_, unit)) = KNOWN_NAMES.iter().find(|(known, _)| *known == name) {
        return Some(*unit);
    }

    if name == "time" || BROAD_TIME_WORDS.iter().any(|w| name.contains(w)) {
        return Some(TimeUnit::Nanos);
    }

    None
}
