//! EVM RPC access.
//!
//! The indexer consumes four capabilities: head block number, inclusive
//! log filtering, block timestamps, and `eth_call`. They are expressed as
//! a trait so the sync loop can run against a mock in tests.

mod client;

pub use client::HttpChainClient;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::events::RawLog;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error response: {0}")]
    Rpc(String),
    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

/// Minimal EVM JSON-RPC surface, at-least-once semantics.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head block number.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Logs emitted by `addresses` in `[from, to]`, both ends inclusive,
    /// in chain order.
    async fn filter_logs(
        &self,
        from: u64,
        to: u64,
        addresses: &[Address],
    ) -> Result<Vec<RawLog>, ChainError>;

    /// Timestamp of the given block.
    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Canned-response client for sync-loop and handler tests.
    #[derive(Default)]
    pub struct MockChainClient {
        pub head: Mutex<u64>,
        /// block number -> logs in that block
        pub logs: Mutex<HashMap<u64, Vec<RawLog>>>,
        /// block number -> timestamp
        pub timestamps: Mutex<HashMap<u64, u64>>,
        /// ranges that fail until narrowed to a single block
        pub failing_ranges: Mutex<Vec<(u64, u64)>>,
        pub call_result: Mutex<Option<Vec<u8>>>,
    }

    #[async_trait]
    impl ChainClient for MockChainClient {
        async fn block_number(&self) -> Result<u64, ChainError> {
            Ok(*self.head.lock().unwrap())
        }

        async fn filter_logs(
            &self,
            from: u64,
            to: u64,
            _addresses: &[Address],
        ) -> Result<Vec<RawLog>, ChainError> {
            if self
                .failing_ranges
                .lock()
                .unwrap()
                .iter()
                .any(|&(f, t)| f == from && t == to)
            {
                return Err(ChainError::Rpc("query returned more than results".into()));
            }
            let logs = self.logs.lock().unwrap();
            let mut out = Vec::new();
            for block in from..=to {
                if let Some(block_logs) = logs.get(&block) {
                    out.extend(block_logs.iter().cloned());
                }
            }
            Ok(out)
        }

        async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError> {
            self.timestamps
                .lock()
                .unwrap()
                .get(&number)
                .copied()
                .ok_or_else(|| ChainError::Malformed(format!("no timestamp for block {number}")))
        }

        async fn call(&self, _to: Address, _data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
            self.call_result
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ChainError::Rpc("execution reverted".into()))
        }
    }
}
