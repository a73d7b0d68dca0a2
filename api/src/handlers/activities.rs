use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;
use crate::models::{ActivityFilters, ActivityResp, Response};
use crate::services::activity_service;

/// GET /api/v1/activities?filters=<urlencoded JSON>
pub async fn get_activities(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Response<ActivityResp>>> {
    let raw = params.get("filters").ok_or(ApiError::FilterNil)?;
    let filters: ActivityFilters =
        serde_json::from_str(raw).map_err(|_| ApiError::FilterNil)?;

    let resp = activity_service::get_activities(&state, &filters).await?;
    Ok(Json(Response::ok(resp)))
}
