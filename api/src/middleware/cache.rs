//! Response cache keyed by request fingerprint.
//!
//! Key: `"apicache:" + path + "," + raw_query + body`, replaced by its
//! SHA-512 hex digest when longer than 128 bytes. Entries are written with
//! SET NX EX so a concurrent writer is never overwritten. A hit replays
//! the stored response byte-identically, but only when the stored payload
//! carries an application-level code of 200.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha512};

use crate::handlers::AppState;

const CACHE_API_PREFIX: &str = "apicache:";
const MAX_RAW_KEY_LEN: usize = 128;
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct CachedResponse {
    status: u16,
    content_type: String,
    body: String,
}

pub async fn cache_api(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .unwrap_or_default();

    let key = create_key(
        parts.uri.path(),
        parts.uri.query().unwrap_or(""),
        &body_bytes,
    );

    if let Ok(Some(raw)) = state.kv.get(&key).await {
        if let Some(response) = replay(&raw) {
            return response;
        }
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let response_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to buffer response for caching");
            return Response::from_parts(parts, Body::empty());
        }
    };

    if should_cache(&response_bytes) {
        let entry = CachedResponse {
            status: parts.status.as_u16(),
            content_type: parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("application/json")
                .to_string(),
            body: String::from_utf8_lossy(&response_bytes).into_owned(),
        };
        if let Ok(serialized) = serde_json::to_string(&entry) {
            if let Err(e) = state
                .kv
                .setnx_ex(&key, &serialized, state.config.api_cfg.cache_ttl_seconds)
                .await
            {
                tracing::warn!(error = %e, "failed to store response cache entry");
            }
        }
    }

    Response::from_parts(parts, Body::from(response_bytes))
}

/// Fingerprint of path + raw query + request body.
pub fn create_key(path: &str, raw_query: &str, body: &[u8]) -> String {
    let raw = format!("{path},{raw_query}{}", String::from_utf8_lossy(body));
    if raw.len() <= MAX_RAW_KEY_LEN {
        format!("{CACHE_API_PREFIX}{raw}")
    } else {
        let digest = Sha512::digest(raw.as_bytes());
        format!("{CACHE_API_PREFIX}{}", hex_encode(&digest))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Replay a stored entry. Entries admitted through the metadata heuristic
/// carry no `code` field and are stored but never replayed; kept as-is
/// for compatibility with existing cache contents.
fn replay(raw: &str) -> Option<Response> {
    let entry: CachedResponse = serde_json::from_str(raw).ok()?;
    let payload: Value = serde_json::from_str(&entry.body).ok()?;
    if payload.get("code").and_then(Value::as_u64) != Some(200) {
        return None;
    }

    Response::builder()
        .status(entry.status)
        .header(CONTENT_TYPE, entry.content_type)
        .body(Body::from(entry.body))
        .ok()
}

/// Admit a response: application code 200, or the NFT-metadata shape with
/// a non-empty name/image.
fn should_cache(body: &[u8]) -> bool {
    let Ok(payload) = serde_json::from_slice::<Value>(body) else {
        return false;
    };

    if payload.get("code").and_then(Value::as_u64) == Some(200) {
        return true;
    }

    let name = payload.get("name").and_then(Value::as_str).unwrap_or("");
    let image = payload.get("image").and_then(Value::as_str).unwrap_or("");
    !name.is_empty() || !image.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keys_stay_raw() {
        let key = create_key("/api/v1/collections/0xc/7/image", "", b"");
        assert_eq!(key, "apicache:/api/v1/collections/0xc/7/image,");
    }

    #[test]
    fn long_keys_collapse_to_sha512_hex() {
        let query = "filters=".to_string() + &"x".repeat(200);
        let key = create_key("/api/v1/activities", &query, b"");
        // "apicache:" + 128 hex chars (512 bits).
        assert_eq!(key.len(), CACHE_API_PREFIX.len() + 128);
        assert!(key
            .trim_start_matches(CACHE_API_PREFIX)
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identical_requests_share_a_key() {
        let a = create_key("/p", "q=1", b"body");
        let b = create_key("/p", "q=1", b"body");
        assert_eq!(a, b);
        assert_ne!(a, create_key("/p", "q=2", b"body"));
    }

    #[test]
    fn admits_success_envelopes() {
        assert!(should_cache(br#"{"code":200,"msg":"success","result":[]}"#));
        assert!(!should_cache(br#"{"code":500,"msg":"boom","result":null}"#));
        assert!(!should_cache(b"not json"));
    }

    #[test]
    fn admits_nft_metadata_without_a_code() {
        assert!(should_cache(br#"{"name":"Token #7","image":""}"#));
        assert!(should_cache(br#"{"name":"","image":"ipfs://x"}"#));
        assert!(!should_cache(br#"{"name":"","image":""}"#));
    }

    #[test]
    fn replays_only_success_payloads() {
        let hit = serde_json::to_string(&CachedResponse {
            status: 200,
            content_type: "application/json".into(),
            body: r#"{"code":200,"msg":"success","result":{}}"#.into(),
        })
        .unwrap();
        assert!(replay(&hit).is_some());

        let miss = serde_json::to_string(&CachedResponse {
            status: 200,
            content_type: "application/json".into(),
            body: r#"{"name":"Token #7","image":"ipfs://x"}"#.into(),
        })
        .unwrap();
        assert!(replay(&miss).is_none());
    }
}
