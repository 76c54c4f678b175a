//! Schema snapshot
//!
//! Read-only view of the table → columns mapping supplied by the schema cache.
//! Freshness and eviction belong to the cache; a snapshot is never mutated
//! after it is built and is simply replaced when the schema is refreshed.

use std::collections::HashMap;

use super::classifier::classify;
use super::types::{ColumnClassification, ColumnDescriptor};

/// Immutable table → columns mapping
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    tables: HashMap<String, Vec<ColumnDescriptor>>,
}

impl SchemaSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a table and its columns
    ///
    /// `table` may be qualified (`database.table`); lookups accept either form.
    pub fn table(mut self, table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        self.tables.insert(table.into().to_lowercase(), columns);
        self
    }

    /// Number of tables in the snapshot
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the snapshot has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Columns of a table, looked up by `database.table` first and then by bare name
    pub fn columns(&self, database: Option<&str>, table: &str) -> Option<&[ColumnDescriptor]> {
        let table = table.to_lowercase();

        database
            .and_then(|db| self.tables.get(&format!("{}.{}", db.to_lowercase(), table)))
            .or_else(|| self.tables.get(&table))
            .map(|columns| columns.as_slice())
    }

    /// Find a column by name (case-insensitive)
    pub fn column(
        &self,
        database: Option<&str>,
        table: &str,
        name: &str,
    ) -> Option<&ColumnDescriptor> {
        self.columns(database, table)?
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Columns that can carry a concrete time filter, in declaration order
    pub fn time_columns(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> Vec<(&ColumnDescriptor, ColumnClassification)> {
        self.columns(database, table)
            .unwrap_or_default()
            .iter()
            .map(|c| (c, classify(c)))
            .filter(|(_, classification)| classification.is_filterable())
            .collect()
    }

    /// Pick a time column when the user has not chosen one
    ///
    /// Prefers the first native date/time column, then the first epoch column
    /// whose unit could be inferred.
    pub fn default_time_column(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> Option<&ColumnDescriptor> {
        let candidates = self.time_columns(database, table);

        candidates
            .iter()
            .find(|(_, classification)| *classification == ColumnClassification::Temporal)
            .or_else(|| candidates.first())
            .map(|(column, _)| *column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> SchemaSnapshot {
        SchemaSnapshot::new()
            .table(
                "logs.events",
                vec![
                    ColumnDescriptor::new("id", "BIGINT"),
                    ColumnDescriptor::new("message", "VARCHAR"),
                    ColumnDescriptor::new("__timestamp", "BIGINT"),
                    ColumnDescriptor::new("event_date", "DATE"),
                ],
            )
            .table(
                "metrics",
                vec![
                    ColumnDescriptor::new("value", "DOUBLE"),
                    ColumnDescriptor::new("ts_ms", "BIGINT"),
                ],
            )
    }

    #[test]
    fn test_qualified_and_bare_lookup() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.columns(Some("logs"), "events").is_some());
        assert!(snapshot.columns(None, "events").is_none());
        assert!(snapshot.columns(Some("other"), "metrics").is_some());
        assert!(snapshot.columns(None, "METRICS").is_some());
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let snapshot = sample_snapshot();
        let column = snapshot.column(Some("logs"), "events", "EVENT_DATE").unwrap();
        assert_eq!(column.declared_type, "DATE");
        assert!(snapshot.column(Some("logs"), "events", "missing").is_none());
    }

    #[test]
    fn test_time_columns() {
        let snapshot = sample_snapshot();
        let names: Vec<&str> = snapshot
            .time_columns(Some("logs"), "events")
            .iter()
            .map(|(c, _)| c.name.as_str())
            .collect();
        // `id` is numeric but carries no unit hint, so it is not a candidate
        assert_eq!(names, vec!["__timestamp", "event_date"]);
    }

    #[test]
    fn test_default_time_column_prefers_temporal() {
        let snapshot = sample_snapshot();
        let column = snapshot.default_time_column(Some("logs"), "events").unwrap();
        assert_eq!(column.name, "event_date");

        let column = snapshot.default_time_column(None, "metrics").unwrap();
        assert_eq!(column.name, "ts_ms");

        assert!(snapshot.default_time_column(None, "unknown").is_none());
    }
}
