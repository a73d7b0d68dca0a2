//! KV access for the read path: count caches, the response cache, and the
//! precomputed ranking sets.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn setex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError>;

    /// SET NX EX: true when the key was absent and has been written.
    async fn setnx_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, KvError>;
}

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
}

