use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::handlers::AppState;
use crate::models::{CollectionRankingInfo, Response};
use crate::services::ranking_service;

fn default_range() -> String {
    "1d".to_string()
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// GET /api/v1/collections/ranking?range=1d&limit=10
pub async fn get_collection_ranking(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> ApiResult<Json<Response<Vec<CollectionRankingInfo>>>> {
    let ranking = ranking_service::get_ranking(&state, &params.range, params.limit).await?;
    Ok(Json(Response::ok(ranking)))
}
