//! The multi-chain activity feed: one filtered page over the activity
//! table, a 30s-cached total, and in-memory enrichment from the item,
//! item-external and collection tables.

use std::collections::HashMap;

use crate::config::ApiConfig;
use crate::db::repositories::ActivityQuery;
use crate::entity::activity;
use crate::error::ApiResult;
use crate::handlers::AppState;
use crate::models::{
    activity_count_cache_key, event_types, ActivityFilters, ActivityInfo, ActivityResp,
};

const COUNT_CACHE_TTL_SECONDS: u64 = 30;
const MAX_PAGE_SIZE: u64 = 100;

/// Resolve user-facing filters into a repository query: chain ids default
/// to every configured chain, event names map to ids (unknown names are
/// dropped), addresses are lowercased.
pub fn build_query(config: &ApiConfig, filters: &ActivityFilters) -> ActivityQuery {
    let chain_ids = if filters.chain_id.is_empty() {
        config.api_cfg.chains.iter().map(|c| c.id).collect()
    } else {
        filters.chain_id.clone()
    };

    ActivityQuery {
        chain_ids,
        collection_addresses: filters
            .collection_addresses
            .iter()
            .map(|a| a.to_lowercase())
            .collect(),
        token_id: filters.token_id.clone().filter(|t| !t.is_empty()),
        user_addresses: filters
            .user_addresses
            .iter()
            .map(|a| a.to_lowercase())
            .collect(),
        event_type_ids: filters
            .event_types
            .iter()
            .filter_map(|name| event_types::name_to_id(name))
            .collect(),
        page: filters.page.max(1),
        page_size: filters.page_size.clamp(1, MAX_PAGE_SIZE),
    }
}

pub async fn get_activities(
    state: &AppState,
    filters: &ActivityFilters,
) -> ApiResult<ActivityResp> {
    let query = build_query(&state.config, filters);

    let total = cached_count(state, filters, &query).await?;
    if total == 0 {
        return Ok(ActivityResp {
            result: Vec::new(),
            count: 0,
        });
    }

    let page = state.repositories.activity.query_page(&query).await?;
    let result = enrich(state, page).await?;
    Ok(ActivityResp {
        result,
        count: total,
    })
}

/// Total row count for the filter, cached for 30 seconds.
async fn cached_count(
    state: &AppState,
    filters: &ActivityFilters,
    query: &ActivityQuery,
) -> ApiResult<u64> {
    let cache_key = activity_count_cache_key(
        &query.collection_addresses,
        query.token_id.as_deref().unwrap_or(""),
        &filters.user_addresses,
        &filters.event_types,
    );

    if let Some(cached) = state.kv.get(&cache_key).await? {
        if let Ok(total) = cached.parse::<u64>() {
            return Ok(total);
        }
    }

    let total = state.repositories.activity.count(query).await?;
    state
        .kv
        .setex(&cache_key, &total.to_string(), COUNT_CACHE_TTL_SECONDS)
        .await?;
    Ok(total)
}

/// Left-join the page against item names, images and collection display
/// fields. The three lookups run concurrently; any failure fails the page.
async fn enrich(state: &AppState, page: Vec<activity::Model>) -> ApiResult<Vec<ActivityInfo>> {
    let mut item_keys: Vec<(i64, String, String)> = page
        .iter()
        .map(|row| {
            (
                row.chain_id,
                row.collection_address.clone(),
                row.token_id.clone(),
            )
        })
        .collect();
    item_keys.sort();
    item_keys.dedup();

    let mut collection_keys: Vec<(i64, String)> = page
        .iter()
        .map(|row| (row.chain_id, row.collection_address.clone()))
        .collect();
    collection_keys.sort();
    collection_keys.dedup();

    let (items, externals, collections) = tokio::try_join!(
        state.repositories.item.find_by_keys(&item_keys),
        state.repositories.item_external.find_by_keys(&item_keys),
        state.repositories.collection.find_by_keys(&collection_keys),
    )?;

    let item_names: HashMap<(i64, String, String), Option<String>> = items
        .into_iter()
        .map(|item| {
            (
                (item.chain_id, item.collection_address, item.token_id),
                item.name,
            )
        })
        .collect();
    let images: HashMap<(i64, String, String), Option<String>> = externals
        .into_iter()
        .map(|ext| {
            let image = ext.display_image().map(str::to_string);
            ((ext.chain_id, ext.collection_address, ext.token_id), image)
        })
        .collect();
    let collection_display: HashMap<(i64, String), (String, Option<String>)> = collections
        .into_iter()
        .map(|col| ((col.chain_id, col.address), (col.name, col.image_uri)))
        .collect();

    Ok(page
        .into_iter()
        .map(|row| {
            let item_key = (
                row.chain_id,
                row.collection_address.clone(),
                row.token_id.clone(),
            );
            let collection_key = (row.chain_id, row.collection_address.clone());
            let (collection_name, collection_image_uri) = collection_display
                .get(&collection_key)
                .cloned()
                .map(|(name, image)| (Some(name), image))
                .unwrap_or((None, None));

            ActivityInfo {
                chain_name: state
                    .config
                    .chain_name(row.chain_id)
                    .unwrap_or("unknown")
                    .to_string(),
                activity_type: event_types::id_to_name(row.activity_type).to_string(),
                maker: row.maker,
                taker: row.taker,
                collection_address: row.collection_address,
                token_id: row.token_id,
                currency_address: row.currency_address,
                price: row.price,
                block_number: row.block_number,
                tx_hash: row.tx_hash,
                event_time: row.event_time,
                item_name: item_names.get(&item_key).cloned().flatten(),
                image_uri: images.get(&item_key).cloned().flatten(),
                collection_name,
                collection_image_uri,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        toml::from_str(
            r#"
[api_cfg]
chains = [{ name = "eth", id = 1 }, { name = "sepolia", id = 11155111 }]

[db]
url = "postgres://localhost/test"

[kv]
redis_url = "redis://127.0.0.1:6379"

[project_cfg]
name = "openmart"
"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_chain_filter_means_all_configured_chains() {
        let query = build_query(&config(), &ActivityFilters::default());
        assert_eq!(query.chain_ids, vec![1, 11155111]);
    }

    #[test]
    fn addresses_are_lowercased_and_names_mapped() {
        let filters = ActivityFilters {
            chain_id: vec![1],
            collection_addresses: vec!["0xC1".to_string()],
            user_addresses: vec!["0xABC".to_string()],
            event_types: vec!["sale".to_string(), "bogus".to_string()],
            token_id: Some(String::new()),
            page: 0,
            page_size: 10_000,
        };
        let query = build_query(&config(), &filters);
        assert_eq!(query.collection_addresses, vec!["0xc1".to_string()]);
        assert_eq!(query.user_addresses, vec!["0xabc".to_string()]);
        assert_eq!(query.event_type_ids, vec![event_types::SALE]);
        // Unknown event names are dropped, empty token ids become None.
        assert_eq!(query.token_id, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, MAX_PAGE_SIZE);
    }
}
