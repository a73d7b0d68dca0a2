//! Collection ranking fan-out: one KV read per configured chain against
//! the precomputed ranking sets, merged and sorted by volume.

use futures::future::join_all;

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;
use crate::models::CollectionRankingInfo;

/// Ranking periods to the upstream job's 5-minute epoch counts.
pub fn period_to_epoch(period: &str) -> Option<u32> {
    match period {
        "15m" => Some(3),
        "1h" => Some(12),
        "6h" => Some(72),
        "24h" | "1d" => Some(288),
        "7d" => Some(2016),
        "30d" => Some(8640),
        _ => None,
    }
}

pub fn ranking_key(project: &str, chain: &str, epoch: u32) -> String {
    format!(
        "cache:{}:{}:ranking:volume:{}",
        project.to_lowercase(),
        chain.to_lowercase(),
        epoch
    )
}

/// Stable sort by volume descending; ties keep their per-chain order.
pub fn merge_rankings(
    mut entries: Vec<CollectionRankingInfo>,
    limit: usize,
) -> Vec<CollectionRankingInfo> {
    entries.sort_by(|a, b| b.volume.cmp(&a.volume));
    entries.truncate(limit);
    entries
}

pub async fn get_ranking(
    state: &AppState,
    period: &str,
    limit: usize,
) -> ApiResult<Vec<CollectionRankingInfo>> {
    let epoch = period_to_epoch(period)
        .ok_or_else(|| ApiError::InvalidRequest(format!("invalid period: {period}")))?;

    let reads = state.config.api_cfg.chains.iter().map(|chain| {
        let key = ranking_key(&state.config.project_cfg.name, &chain.name, epoch);
        let kv = state.kv.clone();
        let chain_name = chain.name.clone();
        async move {
            match kv.get(&key).await {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<CollectionRankingInfo>>(&raw) {
                    Ok(entries) => entries,
                    Err(e) => {
                        tracing::error!(chain = %chain_name, error = %e, "failed to decode ranking set");
                        Vec::new()
                    }
                },
                Ok(None) => Vec::new(),
                Err(e) => {
                    tracing::error!(chain = %chain_name, error = %e, "failed to read ranking set");
                    Vec::new()
                }
            }
        }
    });

    let merged: Vec<CollectionRankingInfo> =
        join_all(reads).await.into_iter().flatten().collect();
    Ok(merge_rankings(merged, limit))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn entry(address: &str, volume: i64) -> CollectionRankingInfo {
        CollectionRankingInfo {
            contract_address: address.to_string(),
            item_count: 10,
            volume: Decimal::from(volume),
            volume_change: 0,
            pre_floor_price: Decimal::ZERO,
            floor_change: 0,
        }
    }

    #[test]
    fn period_map_matches_the_upstream_epochs() {
        assert_eq!(period_to_epoch("15m"), Some(3));
        assert_eq!(period_to_epoch("1h"), Some(12));
        assert_eq!(period_to_epoch("6h"), Some(72));
        assert_eq!(period_to_epoch("24h"), Some(288));
        assert_eq!(period_to_epoch("1d"), Some(288));
        assert_eq!(period_to_epoch("7d"), Some(2016));
        assert_eq!(period_to_epoch("30d"), Some(8640));
        assert_eq!(period_to_epoch("2w"), None);
    }

    #[test]
    fn ranking_keys_are_lowercased() {
        assert_eq!(
            ranking_key("OpenMart", "ETH", 288),
            "cache:openmart:eth:ranking:volume:288"
        );
    }

    #[test]
    fn merge_sorts_by_volume_desc_and_truncates() {
        let merged = merge_rankings(
            vec![entry("0xa", 5), entry("0xb", 50), entry("0xc", 20)],
            2,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].contract_address, "0xb");
        assert_eq!(merged[1].contract_address, "0xc");
    }

    #[test]
    fn merge_is_stable_for_equal_volumes() {
        let merged = merge_rankings(vec![entry("0xa", 7), entry("0xb", 7)], 10);
        assert_eq!(merged[0].contract_address, "0xa");
        assert_eq!(merged[1].contract_address, "0xb");
    }
}
