//! Query Processor
//!
//! Single entry point used by the execution pipeline: classify the selected
//! time column, resolve the range, substitute the macros, and split the
//! diagnostics into blocking errors and non-blocking warnings.
//!
//! # Example
//!
//! ```rust
//! use timebound::processor::{ProcessRequest, QueryProcessor};
//! use timebound::range::TimeRangeSpec;
//! use timebound::schema::ColumnDescriptor;
//!
//! let processor = QueryProcessor::default();
//! let request = ProcessRequest::new("SELECT * FROM logs WHERE $__timeFilter", TimeRangeSpec::last(1, 'h'))
//!     .time_column(ColumnDescriptor::new("created_at", "BIGINT"));
//!
//! let result = processor.process(&request);
//! assert!(result.errors.is_empty());
//! assert!(result.query.starts_with("SELECT * FROM logs WHERE created_at >= "));
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProcessorConfig;
use crate::macros::{check_for_macros, MacroEngine, Severity};
use crate::range::{resolve, TimeRangeSpec};
use crate::schema::{classify, ColumnClassification, ColumnDescriptor, SchemaSnapshot};

/// Everything needed to prepare one query for execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Raw query text as written by the user
    pub query: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    /// Selected time column; an empty declared type is filled in from the schema
    #[serde(default)]
    pub time_column: Option<ColumnDescriptor>,
    pub range: TimeRangeSpec,
    /// Overrides the range spec's timezone when set
    #[serde(default)]
    pub timezone: Option<String>,
    /// Downsampling hint, passed through untouched
    #[serde(default)]
    pub max_data_points: Option<u32>,
}

impl ProcessRequest {
    /// Create a request for a query and range
    pub fn new(query: impl Into<String>, range: TimeRangeSpec) -> Self {
        Self {
            query: query.into(),
            database: None,
            table: None,
            time_column: None,
            range,
            timezone: None,
            max_data_points: None,
        }
    }

    /// Builder method: set the selected time column
    pub fn time_column(mut self, column: ColumnDescriptor) -> Self {
        self.time_column = Some(column);
        self
    }

    /// Builder method: set the database and table the query targets
    pub fn table(mut self, database: Option<&str>, table: impl Into<String>) -> Self {
        self.database = database.map(str::to_string);
        self.table = Some(table.into());
        self
    }

    /// Builder method: set the timezone
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Builder method: set the max data points hint
    pub fn max_data_points(mut self, max: u32) -> Self {
        self.max_data_points = Some(max);
        self
    }
}

/// Final query text, or the reasons it must not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub query: String,
    /// Non-empty means the query must not be executed
    pub errors: Vec<String>,
    /// Degraded filtering the user should be told about
    pub warnings: Vec<String>,
    pub max_data_points: Option<u32>,
}

impl ProcessResult {
    fn passthrough(request: &ProcessRequest) -> Self {
        Self {
            query: request.query.clone(),
            errors: Vec::new(),
            warnings: Vec::new(),
            max_data_points: request.max_data_points,
        }
    }

    /// Whether the query must not be executed
    pub fn is_blocked(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Prepares queries for execution
#[derive(Debug, Clone, Default)]
pub struct QueryProcessor {
    config: ProcessorConfig,
    engine: MacroEngine,
    schema: Option<Arc<SchemaSnapshot>>,
}

impl QueryProcessor {
    /// Create a processor from configuration
    pub fn new(config: ProcessorConfig) -> Self {
        let engine = MacroEngine::new(config.engine_options());
        Self {
            config,
            engine,
            schema: None,
        }
    }

    /// Attach a schema snapshot used to complete or pick the time column
    pub fn with_schema(mut self, schema: Arc<SchemaSnapshot>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replace the schema snapshot after a refresh
    pub fn set_schema(&mut self, schema: Arc<SchemaSnapshot>) {
        self.schema = Some(schema);
    }

    /// Processor configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process a request against the current time
    pub fn process(&self, request: &ProcessRequest) -> ProcessResult {
        self.process_at(request, Utc::now())
    }

    /// Process a request with an explicit "now"
    pub fn process_at(&self, request: &ProcessRequest, now: DateTime<Utc>) -> ProcessResult {
        if !check_for_macros(&request.query) {
            tracing::debug!("No time macros in query, passing through");
            return ProcessResult::passthrough(request);
        }

        let column = self.select_column(request);
        let classification = column
            .as_ref()
            .map(classify)
            .unwrap_or(ColumnClassification::NotTimeLike);

        let spec = self.effective_spec(request);
        let range = match resolve(&spec, now) {
            Ok(range) => range,
            Err(e) => {
                tracing::error!(range = %spec, error = %e, "Failed to resolve time range");
                return ProcessResult {
                    errors: vec![format!("Invalid time range '{}': {}", spec, e)],
                    ..ProcessResult::passthrough(request)
                };
            }
        };

        let mut warnings = Vec::new();
        if range.swapped {
            tracing::warn!(range = %spec, "Time range start is after its end, swapping");
            warnings.push(format!(
                "Time range '{}' starts after it ends; the start and end were swapped",
                spec
            ));
        }

        let substitution = self.engine.substitute(
            &request.query,
            column.as_ref().map(|c| c.name.as_str()),
            classification,
            range,
        );

        let mut errors = Vec::new();
        for diagnostic in substitution.diagnostics {
            match diagnostic.severity {
                Severity::Error => errors.push(diagnostic.message),
                Severity::Warning => warnings.push(diagnostic.message),
            }
        }

        tracing::debug!(
            column = ?column.as_ref().map(|c| c.name.as_str()),
            %classification,
            %range,
            errors = errors.len(),
            warnings = warnings.len(),
            "Processed query"
        );

        ProcessResult {
            query: substitution.query,
            errors,
            warnings,
            max_data_points: request.max_data_points,
        }
    }

    /// Selected column, completed from the schema where possible
    fn select_column(&self, request: &ProcessRequest) -> Option<ColumnDescriptor> {
        let schema = self.schema.as_deref();
        let table = request.table.as_deref();
        let database = request.database.as_deref();

        match (&request.time_column, schema, table) {
            (Some(column), Some(schema), Some(table)) if column.declared_type.trim().is_empty() => {
                schema
                    .column(database, table, &column.name)
                    .cloned()
                    .or_else(|| Some(column.clone()))
            }
            (Some(column), _, _) => Some(column.clone()),
            (None, Some(schema), Some(table)) => {
                let picked = schema.default_time_column(database, table).cloned();
                if let Some(column) = &picked {
                    tracing::debug!(column = %column.name, table, "Picked default time column");
                }
                picked
            }
            (None, _, _) => None,
        }
    }

    /// Range spec with the request or default timezone applied
    fn effective_spec(&self, request: &ProcessRequest) -> TimeRangeSpec {
        let mut spec = request.range.clone();

        if let Some(timezone) = request.timezone.as_deref().filter(|tz| !tz.trim().is_empty()) {
            spec.timezone = timezone.to_string();
        }
        if spec.timezone.trim().is_empty() {
            spec.timezone = self.config.default_timezone.clone();
        }

        spec
    }
}
