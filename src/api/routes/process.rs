//! Process Routes
//!
//! Endpoint for preparing a query for execution.
//!
//! - POST /api/v1/process - Substitute time macros in a query

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{ProcessRequestDto, ProcessResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::processor::{ProcessRequest, ProcessResult};
use crate::range::TimeRangeSpec;

/// POST /api/v1/process
///
/// Range parse failures come back as blocking errors in the body, the same
/// way resolution failures do.
pub async fn process_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequestDto>,
) -> ApiResult<Json<ProcessResponse>> {
    if req.query.trim().is_empty() {
        return Err(ApiError::Validation("query cannot be empty".to_string()));
    }

    let timezone = req.timezone.clone().unwrap_or_default();
    let range = match TimeRangeSpec::parse(&req.from, &req.to, &timezone) {
        Ok(range) => range,
        Err(e) => {
            tracing::warn!(from = %req.from, to = %req.to, error = %e, "Rejected time range");
            return Ok(Json(ProcessResponse::from(ProcessResult {
                query: req.query,
                errors: vec![format!("Invalid time range '{} to {}': {}", req.from, req.to, e)],
                warnings: Vec::new(),
                max_data_points: req.max_data_points,
            })));
        }
    };

    let request = ProcessRequest {
        query: req.query,
        database: req.database,
        table: req.table,
        time_column: req.time_column,
        range,
        timezone: req.timezone,
        max_data_points: req.max_data_points,
    };

    let result = state.processor.process(&request);
    Ok(Json(ProcessResponse::from(result)))
}
