//! # Timebound
//!
//! Time-range macro resolution and substitution for SQL queries against
//! observability databases.
//!
//! A query written against `$__timeFilter`, `$__timeField`, `$__timeFrom`
//! and `$__timeTo` is turned into concrete SQL for the selected time column,
//! whatever its storage: native temporal types or integer epochs in seconds,
//! milliseconds, microseconds or nanoseconds.
//!
//! ## Modules
//!
//! - [`schema`]: Column classification and epoch unit inference
//! - [`range`]: Time range parsing and resolution
//! - [`macros`]: Macro scanning and substitution
//! - [`processor`]: End-to-end query processing
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust
//! use timebound::{ColumnDescriptor, ProcessRequest, QueryProcessor, TimeRangeSpec};
//!
//! let processor = QueryProcessor::default();
//! let request = ProcessRequest::new(
//!     "SELECT count(*) FROM logs WHERE $__timeFilter",
//!     TimeRangeSpec::last(15, 'm'),
//! )
//! .time_column(ColumnDescriptor::new("__timestamp", "BIGINT"));
//!
//! let result = processor.process(&request);
//! assert!(!result.is_blocked());
//! assert!(!result.query.contains("$__time"));
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod macros;
pub mod processor;
pub mod range;
pub mod schema;

// Re-export top-level types for convenience
pub use schema::{
    classify, infer_unit, ColumnClassification, ColumnDescriptor, SchemaSnapshot, TimeUnit,
};

pub use range::{resolve, ParseError, RangeEndpoint, ResolvedRange, TimeRangeSpec, Zone};

pub use macros::{
    check_for_macros, substitute, Diagnostic, EngineOptions, MacroEngine, MacroToken, Severity,
    SubstitutionResult, TimestampStyle,
};

pub use processor::{ProcessRequest, ProcessResult, QueryProcessor};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, ProcessorConfig};
