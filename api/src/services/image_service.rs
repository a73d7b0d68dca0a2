//! Item image lookup backing the cached image endpoint.
//!
//! Served as a bare metadata object (`{name, image}`) rather than the
//! usual envelope; the response cache admits it through its NFT-metadata
//! heuristic.

use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;

#[derive(Debug, Serialize)]
pub struct ItemImage {
    pub name: String,
    pub image: String,
}

pub async fn get_item_image(
    state: &AppState,
    collection_address: &str,
    token_id: &str,
) -> ApiResult<ItemImage> {
    let collection_address = collection_address.to_lowercase();

    // The route carries no chain; take the first configured chain that
    // knows the item.
    for chain in &state.config.api_cfg.chains {
        let external = state
            .repositories
            .item_external
            .find_one(chain.id, &collection_address, token_id)
            .await?;

        if let Some(external) = external {
            let name = state
                .repositories
                .item
                .find_one(chain.id, &collection_address, token_id)
                .await?
                .and_then(|item| item.name)
                .unwrap_or_default();

            return Ok(ItemImage {
                name,
                image: external.display_image().unwrap_or_default().to_string(),
            });
        }
    }

    Err(ApiError::NotFound(format!(
        "item {collection_address}/{token_id}"
    )))
}
