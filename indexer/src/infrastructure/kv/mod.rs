//! Shared cache/queue access.
//!
//! A thin string-KV surface over Redis: plain get/set, TTL'd set, SETNX+EX,
//! and list push for the cross-process queues the external order manager
//! consumes. Behind a trait so tests run against the in-memory store.

mod queue;

pub use queue::{
    push_order_expiry, push_update_price_event, OrderExpiryMessage, TradeEvent, TradeEventKind,
};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    async fn setex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError>;

    /// SET NX EX: returns true when the key was absent and has been written.
    async fn setnx_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, KvError>;

    /// RPUSH onto a list; the consumer owns the message lifecycle.
    async fn rpush(&self, key: &str, value: &str) -> Result<(), KvError>;
}

/// Redis-backed store shared by the indexer and the API layer.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, KvError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn setex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn setnx_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        let set: bool = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<Option<String>>(&mut conn)
            .await?
            .is_some();
        Ok(set)
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

/// In-memory store used by tests; honors TTLs and SETNX semantics.
#[derive(Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    values: std::collections::HashMap<String, (String, Option<std::time::Instant>)>,
    lists: std::collections::HashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a queue's contents, oldest first.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .lists
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

impl MemoryInner {
    fn live_value(&mut self, key: &str) -> Option<String> {
        match self.values.get(key) {
            Some((value, expiry)) => {
                if expiry.is_some_and(|at| at <= std::time::Instant::now()) {
                    self.values.remove(key);
                    None
                } else {
                    Some(value.clone())
                }
            }
            None => None,
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.inner.lock().unwrap().live_value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner
            .lock()
            .unwrap()
            .values
            .insert(key.to_string(), (value.to_string(), None));
        Ok(())
    }

    async fn setex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError> {
        let expiry = std::time::Instant::now() + std::time::Duration::from_secs(ttl_seconds);
        self.inner
            .lock()
            .unwrap()
            .values
            .insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(())
    }

    async fn setnx_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, KvError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.live_value(key).is_some() {
            return Ok(false);
        }
        let expiry = std::time::Instant::now() + std::time::Duration::from_secs(ttl_seconds);
        inner
            .values
            .insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(true)
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner
            .lock()
            .unwrap()
            .lists
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_setnx_respects_existing_keys() {
        let store = MemoryStore::new();
        assert!(store.setnx_ex("k", "first", 60).await.unwrap());
        assert!(!store.setnx_ex("k", "second", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn memory_store_expires_values() {
        let store = MemoryStore::new();
        store.setex("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        // An expired key is free for SETNX again.
        assert!(store.setnx_ex("k", "v2", 60).await.unwrap());
    }

    #[tokio::test]
    async fn memory_store_queues_preserve_order() {
        let store = MemoryStore::new();
        store.rpush("q", "a").await.unwrap();
        store.rpush("q", "b").await.unwrap();
        assert_eq!(store.list("q"), vec!["a".to_string(), "b".to_string()]);
    }
}
