// API request/response models and the event-type vocabulary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Uniform envelope; `code` is application-level, 200 on success.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response<T> {
    pub code: u16,
    pub msg: String,
    pub result: Option<T>,
}

impl<T> Response<T> {
    pub fn ok(result: T) -> Self {
        Self {
            code: 200,
            msg: "success".to_string(),
            result: Some(result),
        }
    }
}

/// `filters` query parameter of GET /api/v1/activities, urlencoded JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilters {
    #[serde(default)]
    pub chain_id: Vec<i64>,
    #[serde(default)]
    pub collection_addresses: Vec<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub user_addresses: Vec<String>,
    #[serde(default)]
    pub event_types: Vec<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

/// One enriched activity feed row.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityInfo {
    pub chain_name: String,
    pub activity_type: String,
    pub maker: String,
    pub taker: String,
    pub collection_address: String,
    pub token_id: String,
    pub currency_address: String,
    pub price: Decimal,
    pub block_number: i64,
    pub tx_hash: String,
    pub event_time: i64,
    pub item_name: Option<String>,
    pub image_uri: Option<String>,
    pub collection_name: Option<String>,
    pub collection_image_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResp {
    pub result: Vec<ActivityInfo>,
    pub count: u64,
}

/// Precomputed per-collection ranking entry as cached by the upstream job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRankingInfo {
    pub contract_address: String,
    pub item_count: i64,
    pub volume: Decimal,
    pub volume_change: i32,
    pub pre_floor_price: Decimal,
    pub floor_change: i32,
}

pub mod event_types {
    //! Activity-type ids as persisted by the indexer, and their wire names.
    //! The numbers are shared schema; never renumber.

    pub const LISTING: i32 = 1;
    pub const SALE: i32 = 2;
    pub const TRANSFER: i32 = 3;
    pub const MINT: i32 = 4;
    pub const CANCEL_LISTING: i32 = 5;
    pub const ITEM_BID: i32 = 6;
    pub const COLLECTION_BID: i32 = 7;
    pub const CANCEL_ITEM_BID: i32 = 8;
    pub const CANCEL_COLLECTION_BID: i32 = 9;
    pub const MAKE_OFFER: i32 = 10;
    pub const CANCEL_OFFER: i32 = 11;
    pub const BUY: i32 = 12;

    pub fn name_to_id(name: &str) -> Option<i32> {
        match name {
            "list" => Some(LISTING),
            "sale" => Some(SALE),
            "transfer" => Some(TRANSFER),
            "mint" => Some(MINT),
            "cancel_list" => Some(CANCEL_LISTING),
            "item_bid" => Some(ITEM_BID),
            "collection_bid" => Some(COLLECTION_BID),
            "cancel_item_bid" => Some(CANCEL_ITEM_BID),
            "cancel_collection_bid" => Some(CANCEL_COLLECTION_BID),
            "offer" => Some(MAKE_OFFER),
            "cancel_offer" => Some(CANCEL_OFFER),
            "buy" => Some(BUY),
            _ => None,
        }
    }

    pub fn id_to_name(id: i32) -> &'static str {
        match id {
            LISTING => "list",
            SALE => "sale",
            TRANSFER => "transfer",
            MINT => "mint",
            CANCEL_LISTING => "cancel_list",
            ITEM_BID => "item_bid",
            COLLECTION_BID => "collection_bid",
            CANCEL_ITEM_BID => "cancel_item_bid",
            CANCEL_COLLECTION_BID => "cancel_collection_bid",
            MAKE_OFFER => "offer",
            CANCEL_OFFER => "cancel_offer",
            BUY => "buy",
            _ => "unknown",
        }
    }
}

const ACTIVITY_COUNT_CACHE_PREFIX: &str = "cache:orderbookdex:activity:count:";

/// Canonical fingerprint of the count cache key. Field order is fixed by
/// the struct; users are sorted and lowercased so permutations of the
/// same filter share one entry.
#[derive(Serialize)]
struct ActivityCountFingerprint<'a> {
    chain: &'a str,
    collections: &'a [String],
    token_id: &'a str,
    user_addresses: Vec<String>,
    event_types: &'a [String],
}

pub fn activity_count_cache_key(
    collections: &[String],
    token_id: &str,
    user_addresses: &[String],
    event_types: &[String],
) -> String {
    let mut users: Vec<String> = user_addresses.iter().map(|u| u.to_lowercase()).collect();
    users.sort();

    let fingerprint = ActivityCountFingerprint {
        chain: "MultiChain",
        collections,
        token_id,
        user_addresses: users,
        event_types,
    };
    // Struct serialization cannot fail.
    let uid = serde_json::to_string(&fingerprint).unwrap_or_default();
    format!("{ACTIVITY_COUNT_CACHE_PREFIX}{uid}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse_with_defaults() {
        let filters: ActivityFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, 10);
        assert!(filters.chain_id.is_empty());

        let filters: ActivityFilters = serde_json::from_str(
            r#"{"chain_id":[1,11155111],"event_types":["sale"],"page":2,"page_size":15}"#,
        )
        .unwrap();
        assert_eq!(filters.chain_id, vec![1, 11155111]);
        assert_eq!(filters.page, 2);
        assert_eq!(filters.page_size, 15);
    }

    #[test]
    fn malformed_filters_fail_to_parse() {
        assert!(serde_json::from_str::<ActivityFilters>("not json").is_err());
        assert!(serde_json::from_str::<ActivityFilters>(r#"{"page":"x"}"#).is_err());
    }

    #[test]
    fn event_type_names_round_trip() {
        for name in [
            "list",
            "sale",
            "transfer",
            "mint",
            "cancel_list",
            "item_bid",
            "collection_bid",
            "cancel_item_bid",
            "cancel_collection_bid",
            "offer",
            "cancel_offer",
            "buy",
        ] {
            let id = event_types::name_to_id(name).unwrap();
            assert_eq!(event_types::id_to_name(id), name);
        }
        assert_eq!(event_types::name_to_id("nope"), None);
    }

    #[test]
    fn count_cache_key_is_canonical_over_user_order_and_case() {
        let a = activity_count_cache_key(
            &["0xc1".to_string()],
            "7",
            &["0xBBB".to_string(), "0xaaa".to_string()],
            &["sale".to_string()],
        );
        let b = activity_count_cache_key(
            &["0xc1".to_string()],
            "7",
            &["0xAAA".to_string(), "0xbbb".to_string()],
            &["sale".to_string()],
        );
        assert_eq!(a, b);
        assert!(a.starts_with("cache:orderbookdex:activity:count:"));
    }

    #[test]
    fn count_cache_key_distinguishes_filters() {
        let a = activity_count_cache_key(&[], "", &[], &["sale".to_string()]);
        let b = activity_count_cache_key(&[], "", &[], &["list".to_string()]);
        assert_ne!(a, b);
    }
}
