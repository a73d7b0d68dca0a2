//! Best-effort token metadata backfill.
//!
//! On first sight of an item: `tokenURI(tokenId)` via eth_call, HTTP GET
//! the JSON with a hard timeout, extract `image`, upsert the external row.
//! Every failure is logged and swallowed — metadata must never stall the
//! indexer.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use chrono::Utc;
use serde_json::Value;

use crate::domain::events::{getApprovedCall, tokenURICall};
use crate::infrastructure::chain::{ChainClient, ChainError};
use crate::infrastructure::persistence::repositories::ItemExternalRepository;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "openmart-sync/1.0";

/// Column width of meta_data_uri / image_uri.
const URI_MAX_BYTES: usize = 512;

/// Fire-and-forget backfill for one (collection, token).
pub fn spawn_backfill(
    chain_client: Arc<dyn ChainClient>,
    http: reqwest::Client,
    repo: ItemExternalRepository,
    chain_id: i64,
    collection_address: String,
    token_id: String,
) {
    tokio::spawn(async move {
        let mut meta_data_uri = None;
        let mut image_uri = None;

        match token_uri(chain_client.as_ref(), &collection_address, &token_id).await {
            Ok(uri) if !uri.is_empty() => {
                let uri = truncate_to_bytes(uri, URI_MAX_BYTES);
                match fetch_image(&http, &uri).await {
                    Ok(image) => image_uri = Some(truncate_to_bytes(image, URI_MAX_BYTES)),
                    Err(e) => {
                        tracing::warn!(
                            collection = %collection_address,
                            token_id = %token_id,
                            meta_data_uri = %uri,
                            error = %e,
                            "failed to get image from metadata"
                        );
                    }
                }
                meta_data_uri = Some(uri);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    collection = %collection_address,
                    token_id = %token_id,
                    error = %e,
                    "failed to get tokenURI"
                );
            }
        }

        // The row is written even when both lookups failed, so the item
        // is not retried on every Make.
        if let Err(e) = repo
            .insert_if_absent(
                chain_id,
                &collection_address,
                &token_id,
                meta_data_uri,
                image_uri,
                Utc::now().timestamp(),
            )
            .await
        {
            tracing::error!(
                collection = %collection_address,
                token_id = %token_id,
                error = %e,
                "failed to create item_external record"
            );
        }
    });
}

/// `tokenURI(uint256)` against the collection contract.
pub async fn token_uri(
    chain_client: &dyn ChainClient,
    collection_address: &str,
    token_id: &str,
) -> Result<String, MetadataError> {
    let to: Address = collection_address
        .parse()
        .map_err(|_| MetadataError::BadAddress(collection_address.to_string()))?;
    let token_id: U256 = token_id
        .parse()
        .map_err(|_| MetadataError::BadTokenId(token_id.to_string()))?;

    let calldata = tokenURICall { tokenId: token_id }.abi_encode();
    let raw = chain_client.call(to, calldata).await?;
    let decoded = tokenURICall::abi_decode_returns(&raw, false)
        .map_err(|e| MetadataError::Abi(e.to_string()))?;

    Ok(decoded._0.trim_end_matches('\0').trim().to_string())
}

/// `getApproved(uint256)`: the operator currently approved for a token.
pub async fn get_approved(
    chain_client: &dyn ChainClient,
    collection_address: &str,
    token_id: &str,
) -> Result<Address, MetadataError> {
    let to: Address = collection_address
        .parse()
        .map_err(|_| MetadataError::BadAddress(collection_address.to_string()))?;
    let token_id: U256 = token_id
        .parse()
        .map_err(|_| MetadataError::BadTokenId(token_id.to_string()))?;

    let calldata = getApprovedCall { tokenId: token_id }.abi_encode();
    let raw = chain_client.call(to, calldata).await?;
    let decoded = getApprovedCall::abi_decode_returns(&raw, false)
        .map_err(|e| MetadataError::Abi(e.to_string()))?;

    Ok(decoded._0)
}

/// Whether a token is approved to the marketplace vault, i.e. the market
/// contract could move it on a match.
pub async fn is_approved_for_vault(
    chain_client: &dyn ChainClient,
    collection_address: &str,
    token_id: &str,
    vault_address: &str,
) -> Result<bool, MetadataError> {
    let approved = get_approved(chain_client, collection_address, token_id).await?;
    Ok(format!("{approved:#x}") == vault_address.to_lowercase())
}

/// GET the metadata JSON and extract its `image` field.
async fn fetch_image(http: &reqwest::Client, uri: &str) -> Result<String, MetadataError> {
    let response = http
        .get(uri)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(MetadataError::Status(response.status().as_u16()));
    }

    let body: Value = response.json().await?;
    extract_image(&body)
}

pub(crate) fn extract_image(metadata: &Value) -> Result<String, MetadataError> {
    metadata
        .get("image")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(MetadataError::NoImage)
}

/// Byte-bounded truncation that never splits a UTF-8 character.
pub(crate) fn truncate_to_bytes(mut value: String, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes;
    while cut > 0 && !value.is_char_boundary(cut) {
        cut -= 1;
    }
    value.truncate(cut);
    value
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("bad collection address {0}")]
    BadAddress(String),
    #[error("bad token id {0}")]
    BadTokenId(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("abi decode failed: {0}")]
    Abi(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    Status(u16),
    #[error("image field not found in metadata")]
    NoImage,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infrastructure::chain::mock::MockChainClient;

    #[test]
    fn extracts_the_image_field() {
        let metadata = json!({"name": "Token #7", "image": "ipfs://Qm.../7.png"});
        assert_eq!(extract_image(&metadata).unwrap(), "ipfs://Qm.../7.png");
    }

    #[test]
    fn missing_or_non_string_image_is_an_error() {
        assert!(extract_image(&json!({"name": "x"})).is_err());
        assert!(extract_image(&json!({"image": 42})).is_err());
    }

    #[test]
    fn truncation_is_byte_bounded_and_char_safe() {
        let long = "a".repeat(600);
        assert_eq!(truncate_to_bytes(long, 512).len(), 512);

        let short = "ipfs://short".to_string();
        assert_eq!(truncate_to_bytes(short.clone(), 512), short);

        // Multibyte char straddling the cut is dropped whole.
        let mut tricky = "a".repeat(511);
        tricky.push('é');
        let truncated = truncate_to_bytes(tricky, 512);
        assert_eq!(truncated.len(), 511);
    }

    #[tokio::test]
    async fn token_uri_decodes_an_abi_string_return() {
        let mock = MockChainClient::default();
        // abi.encode("ipfs://x"): offset word, length word, padded bytes.
        let mut ret = Vec::new();
        ret.extend_from_slice(&U256::from(32u64).to_be_bytes::<32>());
        ret.extend_from_slice(&U256::from(8u64).to_be_bytes::<32>());
        let mut padded = [0u8; 32];
        padded[..8].copy_from_slice(b"ipfs://x");
        ret.extend_from_slice(&padded);
        *mock.call_result.lock().unwrap() = Some(ret);

        let uri = token_uri(
            &mock,
            "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512",
            "1",
        )
        .await
        .unwrap();
        assert_eq!(uri, "ipfs://x");
    }

    #[tokio::test]
    async fn vault_approval_check_compares_lowercased() {
        let mock = MockChainClient::default();
        let mut ret = [0u8; 32];
        ret[12..].copy_from_slice(
            alloy_primitives::address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb").as_slice(),
        );
        *mock.call_result.lock().unwrap() = Some(ret.to_vec());

        let approved = is_approved_for_vault(
            &mock,
            "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512",
            "1",
            "0x7D29d1860bD4d3A74bBD9a03C9B043d375311dCb",
        )
        .await
        .unwrap();
        assert!(approved);
    }

    #[tokio::test]
    async fn reverted_calls_surface_as_errors() {
        let mock = MockChainClient::default();
        assert!(
            token_uri(&mock, "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512", "1")
                .await
                .is_err()
        );
    }
}
