//! Classify Routes
//!
//! - POST /api/v1/classify - Classify a column as temporal, epoch or neither

use axum::Json;

use crate::api::dto::ClassifyResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::schema::{classify, ColumnDescriptor};

/// POST /api/v1/classify
pub async fn classify_column(Json(column): Json<ColumnDescriptor>) -> ApiResult<Json<ClassifyResponse>> {
    if column.name.trim().is_empty() {
        return Err(ApiError::Validation("name cannot be empty".to_string()));
    }

    let classification = classify(&column);

    Ok(Json(ClassifyResponse {
        filterable: classification.is_filterable(),
        column,
        classification,
    }))
}
