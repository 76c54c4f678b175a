//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::processor::ProcessResult;
use crate::range::ResolvedRange;
use crate::schema::{ColumnClassification, ColumnDescriptor};

// ============================================
// PROCESS DTOs
// ============================================

/// Query processing request
#[derive(Debug, Deserialize)]
pub struct ProcessRequestDto {
    /// Raw query text
    pub query: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    /// Selected time column
    #[serde(default)]
    pub time_column: Option<ColumnDescriptor>,
    /// Range start, e.g. "now-1h" or "2024-01-01"
    pub from: String,
    /// Range end
    pub to: String,
    /// Timezone for absolute times; server default when omitted
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub max_data_points: Option<u32>,
}

/// Query processing response
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub query: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub max_data_points: Option<u32>,
    /// True when errors prevent execution
    pub blocked: bool,
}

impl From<ProcessResult> for ProcessResponse {
    fn from(result: ProcessResult) -> Self {
        Self {
            blocked: result.is_blocked(),
            query: result.query,
            errors: result.errors,
            warnings: result.warnings,
            max_data_points: result.max_data_points,
        }
    }
}

// ============================================
// CLASSIFY DTOs
// ============================================

/// Column classification response
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub column: ColumnDescriptor,
    pub classification: ColumnClassification,
    /// Whether a time filter can be built on this column
    pub filterable: bool,
}

// ============================================
// RESOLVE DTOs
// ============================================

/// Range resolution request
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Resolved range response
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub from_millis: i64,
    pub to_millis: i64,
    pub swapped: bool,
}

impl From<ResolvedRange> for ResolveResponse {
    fn from(range: ResolvedRange) -> Self {
        Self {
            from: range.from,
            to: range.to,
            from_millis: range.from_millis(),
            to_millis: range.to_millis(),
            swapped: range.swapped,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy"
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub default_timezone: String,
}
