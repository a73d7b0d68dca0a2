use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiResult;
use crate::handlers::AppState;
use crate::services::image_service::{self, ItemImage};

/// GET /api/v1/collections/{address}/{token_id}/image
///
/// Returns the bare metadata shape (not the envelope) so the response
/// cache can admit it through its name/image heuristic.
pub async fn get_item_image(
    State(state): State<AppState>,
    Path((address, token_id)): Path<(String, String)>,
) -> ApiResult<Json<ItemImage>> {
    let image = image_service::get_item_image(&state, &address, &token_id).await?;
    Ok(Json(image))
}
