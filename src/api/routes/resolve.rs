//! Resolve Routes
//!
//! - POST /api/v1/resolve - Resolve a time range to concrete instants

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{ResolveRequest, ResolveResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::range::{resolve, TimeRangeSpec};

/// POST /api/v1/resolve
pub async fn resolve_range(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<Json<ResolveResponse>> {
    let timezone = req
        .timezone
        .filter(|tz| !tz.trim().is_empty())
        .unwrap_or_else(|| state.default_timezone().to_string());

    let spec = TimeRangeSpec::parse(&req.from, &req.to, &timezone)?;
    let range = resolve(&spec, Utc::now())?;

    tracing::debug!(%spec, %range, "Resolved time range");

    Ok(Json(ResolveResponse::from(range)))
}
