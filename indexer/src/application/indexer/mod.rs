//! The per-chain OrderBook event indexer.
//!
//! One long-lived sync task walks the chain in confirmed batches and feeds
//! decoded events through the order state machine; an independent task
//! maintains the collection floor-price time series. Both re-check the
//! shutdown signal every iteration.

mod floor;
mod handlers;
mod metadata;
mod reorg;
mod sync_loop;

pub use metadata::{get_approved, is_approved_for_vault, MetadataError};
pub use sync_loop::{next_batch_range, BATCH_SIZE, SLEEP_INTERVAL};

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::collection_filter::CollectionFilter;
use crate::config::Config;
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::kv::KvStore;
use crate::infrastructure::persistence::Repositories;

pub struct OrderBookIndexer {
    chain: String,
    chain_id: i64,
    dex_address: Address,
    vault_address: String,
    currency_address: String,
    chain_client: Arc<dyn ChainClient>,
    kv: Arc<dyn KvStore>,
    repos: Repositories,
    collection_filter: Arc<CollectionFilter>,
    http: reqwest::Client,
    shutdown: watch::Receiver<bool>,
}

impl OrderBookIndexer {
    pub fn new(
        config: &Config,
        chain_client: Arc<dyn ChainClient>,
        kv: Arc<dyn KvStore>,
        repos: Repositories,
        collection_filter: Arc<CollectionFilter>,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<Self> {
        let dex_address: Address = config.contract_cfg.dex_address.parse()?;

        Ok(Self {
            chain: config.chain_cfg.name.clone(),
            chain_id: config.chain_cfg.id,
            dex_address,
            vault_address: config.contract_cfg.vault_address.to_lowercase(),
            currency_address: config.contract_cfg.eth_address.to_lowercase(),
            chain_client,
            kv,
            repos,
            collection_filter,
            http: reqwest::Client::new(),
            shutdown,
        })
    }

    /// Spawn the sync loop and the floor maintenance loop.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let sync = {
            let indexer = Arc::clone(self);
            tokio::spawn(async move { indexer.sync_order_book_event_loop().await })
        };
        let floor = {
            let indexer = Arc::clone(self);
            tokio::spawn(async move { indexer.floor_maintenance_loop().await })
        };
        vec![sync, floor]
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep that returns early (true) when shutdown is signalled.
    async fn sleep_or_shutdown(&self, duration: Duration) -> bool {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = shutdown.changed() => true,
        }
    }
}
