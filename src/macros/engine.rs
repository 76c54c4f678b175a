//! Macro Substitution Engine
//!
//! Replaces the time macros in a query with concrete bounds for the selected
//! time column.
//!
//! ```text
//! $__timeFilter  ->  <col> >= <from> AND <col> <= <to>
//! $__timeField   ->  <col>
//! $__timeFrom    ->  <from>
//! $__timeTo      ->  <to>
//! ```
//!
//! When no usable bounds exist (no column, a column that is not time-like,
//! or an epoch column of unknown unit) the filter degrades to `1=1`, the
//! bounds to `NULL`, and a diagnostic explains why.

use serde::{Deserialize, Serialize};

use super::literal::{scale_to_unit, TimestampStyle, ALWAYS_TRUE, NULL_LITERAL};
use super::scanner::{contains_macros, MacroScanner, Segment};
use super::token::MacroToken;
use crate::range::ResolvedRange;
use crate::schema::ColumnClassification;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Query runs, but with degraded filtering
    Warning,
    /// Query must not run
    Error,
}

/// A message produced while substituting macros
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Final query text plus everything worth telling the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionResult {
    pub query: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl SubstitutionResult {
    /// Result for a query that needed no substitution
    pub fn unchanged(query: &str) -> Self {
        Self {
            query: query.to_string(),
            diagnostics: Vec::new(),
        }
    }

    /// Whether any diagnostic blocks execution
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics of the given severity
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }
}

/// Engine settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Literal style for temporal columns
    #[serde(default)]
    pub timestamp_style: TimestampStyle,
    /// Report degraded filters as errors instead of warnings
    #[serde(default)]
    pub strict_epoch_units: bool,
}

/// Replacement text for each token, computed once per call
struct Bindings {
    filter: String,
    field: String,
    from: String,
    to: String,
}

impl Bindings {
    fn degraded(field: &str) -> Self {
        Self {
            filter: ALWAYS_TRUE.to_string(),
            field: field.to_string(),
            from: NULL_LITERAL.to_string(),
            to: NULL_LITERAL.to_string(),
        }
    }

    fn bounded(column: &str, from: String, to: String) -> Self {
        Self {
            filter: format!("{} >= {} AND {} <= {}", column, from, column, to),
            field: column.to_string(),
            from,
            to,
        }
    }

    fn render(&self, token: MacroToken) -> &str {
        match token {
            MacroToken::TimeFilter => &self.filter,
            MacroToken::TimeField => &self.field,
            MacroToken::TimeFrom => &self.from,
            MacroToken::TimeTo => &self.to,
        }
    }
}

/// Why bounds could not be built
enum Degradation<'a> {
    NoColumn,
    NotTimeLike(&'a str),
    UnknownUnit(&'a str),
}

impl Degradation<'_> {
    fn message(&self) -> String {
        match self {
            Degradation::NoColumn => {
                "No time column is selected; time macros were replaced without filtering by time"
                    .to_string()
            }
            Degradation::NotTimeLike(column) => format!(
                "Column '{}' is not a time column; time macros were replaced without filtering by time",
                column
            ),
            Degradation::UnknownUnit(column) => format!(
                "Could not infer the time unit (seconds, milliseconds, microseconds or nanoseconds) \
                 of column '{}'; time macros were replaced without filtering by time",
                column
            ),
        }
    }
}

/// Substitutes time macros in query text
#[derive(Debug, Clone, Default)]
pub struct MacroEngine {
    options: EngineOptions,
}

impl MacroEngine {
    /// Create an engine with the given options
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Engine options
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Replace every macro token in `query`
    ///
    /// All tokens in one call share the same column, classification and range.
    /// Output never contains a macro token, so substituting it again is a no-op.
    pub fn substitute(
        &self,
        query: &str,
        time_column: Option<&str>,
        classification: ColumnClassification,
        range: ResolvedRange,
    ) -> SubstitutionResult {
        if !contains_macros(query) {
            return SubstitutionResult::unchanged(query);
        }

        let segments: Vec<Segment<'_>> = MacroScanner::new(query).collect();
        let column = time_column.map(str::trim).filter(|c| !c.is_empty());
        let (bindings, degradation) = self.bind(column, classification, &range);

        let mut diagnostics = Vec::new();
        if let Some(degradation) = degradation {
            let uses_bounds = segments
                .iter()
                .any(|s| matches!(s, Segment::Macro(t) if t.needs_range()));
            let needs_column = column.is_none()
                && segments
                    .iter()
                    .any(|s| matches!(s, Segment::Macro(MacroToken::TimeField)));

            if uses_bounds || needs_column {
                let message = degradation.message();
                tracing::warn!(column = ?column, %classification, "{}", message);
                diagnostics.push(if self.options.strict_epoch_units {
                    Diagnostic::error(message)
                } else {
                    Diagnostic::warning(message)
                });
            }
        }

        let mut output = String::with_capacity(query.len() + 64);
        let mut replaced = 0usize;
        for segment in &segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Macro(token) => {
                    output.push_str(bindings.render(*token));
                    replaced += 1;
                }
            }
        }

        tracing::debug!(replaced, column = ?column, %classification, "Substituted time macros");

        SubstitutionResult {
            query: output,
            diagnostics,
        }
    }

    fn bind<'a>(
        &self,
        column: Option<&'a str>,
        classification: ColumnClassification,
        range: &ResolvedRange,
    ) -> (Bindings, Option<Degradation<'a>>) {
        let Some(column) = column else {
            return (Bindings::degraded(NULL_LITERAL), Some(Degradation::NoColumn));
        };

        match classification {
            ColumnClassification::Temporal => {
                let style = self.options.timestamp_style;
                (
                    Bindings::bounded(column, style.format(&range.from), style.format(&range.to)),
                    None,
                )
            }
            ColumnClassification::Epoch { unit: Some(unit) } => (
                Bindings::bounded(
                    column,
                    scale_to_unit(&range.from, unit).to_string(),
                    scale_to_unit(&range.to, unit).to_string(),
                ),
                None,
            ),
            ColumnClassification::Epoch { unit: None } => (
                Bindings::degraded(column),
                Some(Degradation::UnknownUnit(column)),
            ),
            ColumnClassification::NotTimeLike => (
                Bindings::degraded(column),
                Some(Degradation::NotTimeLike(column)),
            ),
        }
    }
}

/// Whether `query` contains any time macro
pub fn check_for_macros(query: &str) -> bool {
    contains_macros(query)
}

/// Substitute macros with default engine options
pub fn substitute(
    query: &str,
    time_column: Option<&str>,
    classification: ColumnClassification,
    range: ResolvedRange,
) -> SubstitutionResult {
    MacroEngine::default().substitute(query, time_column, classification, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TimeUnit;
    use chrono::{Duration, TimeZone, Utc};

    fn january() -> ResolvedRange {
        ResolvedRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        )
    }

    fn epoch(unit: TimeUnit) -> ColumnClassification {
        ColumnClassification::Epoch { unit: Some(unit) }
    }

    const FILTER_QUERY: &str = "SELECT * FROM t WHERE $__timeFilter";

    #[test]
    fn test_no_macros_is_unchanged() {
        let query = "SELECT * FROM t WHERE ts > 0";
        let result = substitute(query, Some("ts"), epoch(TimeUnit::Millis), january());
        assert_eq!(result.query, query);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_temporal_filter() {
        let result = substitute(
            FILTER_QUERY,
            Some("event_date"),
            ColumnClassification::Temporal,
            january(),
        );
        assert_eq!(
            result.query,
            "SELECT * FROM t WHERE event_date >= '2024-01-01 00:00:00' \
             AND event_date <= '2024-01-31 00:00:00'"
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_temporal_bounds() {
        let result = substitute(
            "WHERE d BETWEEN $__timeFrom AND $__timeTo",
            Some("d"),
            ColumnClassification::Temporal,
            january(),
        );
        assert_eq!(
            result.query,
            "WHERE d BETWEEN '2024-01-01 00:00:00' AND '2024-01-31 00:00:00'"
        );
    }

    #[test]
    fn test_ansi_style() {
        let engine = MacroEngine::new(EngineOptions {
            timestamp_style: TimestampStyle::Ansi,
            ..Default::default()
        });
        let result = engine.substitute("$__timeFrom", Some("d"), ColumnClassification::Temporal, january());
        assert_eq!(result.query, "TIMESTAMP '2024-01-01 00:00:00'");
    }

    #[test]
    fn test_epoch_filters_per_unit() {
        let cases = [
            (TimeUnit::Seconds, "1704067200", "1706659200"),
            (TimeUnit::Millis, "1704067200000", "1706659200000"),
            (TimeUnit::Micros, "1704067200000000", "1706659200000000"),
            (TimeUnit::Nanos, "1704067200000000000", "1706659200000000000"),
        ];
        for (unit, from, to) in cases {
            let result = substitute(FILTER_QUERY, Some("ts"), epoch(unit), january());
            assert_eq!(
                result.query,
                format!("SELECT * FROM t WHERE ts >= {} AND ts <= {}", from, to),
                "{:?}",
                unit
            );
        }
    }

    #[test]
    fn test_unknown_unit_degrades_with_warning() {
        let result = substitute(
            FILTER_QUERY,
            Some("weird_metric"),
            ColumnClassification::Epoch { unit: None },
            january(),
        );
        assert_eq!(result.query, "SELECT * FROM t WHERE 1=1");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        assert!(result.diagnostics[0].message.contains("weird_metric"));
        assert!(!result.has_errors());
    }

    #[test]
    fn test_unknown_unit_bounds_are_null() {
        let result = substitute(
            "$__timeField BETWEEN $__timeFrom AND $__timeTo",
            Some("weird_metric"),
            ColumnClassification::Epoch { unit: None },
            january(),
        );
        assert_eq!(result.query, "weird_metric BETWEEN NULL AND NULL");
    }

    #[test]
    fn test_no_column() {
        let result = substitute(
            "SELECT $__timeField FROM t WHERE $__timeFilter",
            None,
            ColumnClassification::Temporal,
            january(),
        );
        assert_eq!(result.query, "SELECT NULL FROM t WHERE 1=1");
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("No time column"));

        // A blank column name counts as no column
        let result = substitute(FILTER_QUERY, Some("  "), ColumnClassification::Temporal, january());
        assert_eq!(result.query, "SELECT * FROM t WHERE 1=1");
    }

    #[test]
    fn test_not_time_like_keeps_field_name() {
        let result = substitute(
            "SELECT $__timeField FROM t WHERE $__timeFilter",
            Some("message"),
            ColumnClassification::NotTimeLike,
            january(),
        );
        assert_eq!(result.query, "SELECT message FROM t WHERE 1=1");
        assert!(result.diagnostics[0].message.contains("'message' is not a time column"));
    }

    #[test]
    fn test_field_only_with_unknown_unit_has_no_diagnostic() {
        let result = substitute(
            "SELECT $__timeField FROM t",
            Some("weird_metric"),
            ColumnClassification::Epoch { unit: None },
            january(),
        );
        assert_eq!(result.query, "SELECT weird_metric FROM t");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_strict_mode_reports_errors() {
        let engine = MacroEngine::new(EngineOptions {
            strict_epoch_units: true,
            ..Default::default()
        });
        let result = engine.substitute(
            FILTER_QUERY,
            Some("weird_metric"),
            ColumnClassification::Epoch { unit: None },
            january(),
        );
        assert!(result.has_errors());
        assert_eq!(result.with_severity(Severity::Error).count(), 1);
    }

    #[test]
    fn test_whole_token_matching() {
        let query = "SELECT my_timeField_extra, $__timeField_extra FROM t WHERE $__timeFilter";
        let result = substitute(query, Some("ts"), epoch(TimeUnit::Seconds), january());
        assert_eq!(
            result.query,
            "SELECT my_timeField_extra, $__timeField_extra FROM t \
             WHERE ts >= 1704067200 AND ts <= 1706659200"
        );
    }

    #[test]
    fn test_repeated_tokens_share_one_range() {
        let result = substitute(
            "$__timeFilter OR $__timeFilter",
            Some("ts"),
            epoch(TimeUnit::Seconds),
            january(),
        );
        assert_eq!(
            result.query,
            "ts >= 1704067200 AND ts <= 1706659200 OR ts >= 1704067200 AND ts <= 1706659200"
        );
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let first = substitute(FILTER_QUERY, Some("ts"), epoch(TimeUnit::Millis), january());
        assert!(!check_for_macros(&first.query));

        let second = substitute(&first.query, Some("ts"), epoch(TimeUnit::Millis), january());
        assert_eq!(second.query, first.query);
        assert!(second.diagnostics.is_empty());
    }

    #[test]
    fn test_nanos_scenario() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let range = ResolvedRange::new(now - Duration::minutes(5), now);
        let result = substitute(FILTER_QUERY, Some("__timestamp"), epoch(TimeUnit::Nanos), range);

        let bounds: Vec<i128> = result
            .query
            .split_whitespace()
            .filter_map(|word| word.parse().ok())
            .collect();
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[1] - bounds[0], 5 * 60 * 1_000_000_000);
    }
}
