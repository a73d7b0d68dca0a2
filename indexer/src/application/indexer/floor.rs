//! Collection floor-price maintenance.
//!
//! Two timers per chain: a daily retention sweep over the floor-price time
//! series and a periodic recompute of every collection's floor from active
//! listings still backed by the seller's ownership. LogMake(List) handling
//! additionally refreshes the affected collection immediately so UIs stay
//! fresh between sweeps.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use super::OrderBookIndexer;
use crate::domain::orders::OrderKind;
use crate::infrastructure::persistence::entities::indexed_status::COLLECTION_FLOOR_INDEX;
use crate::infrastructure::persistence::repositories::floor_price_repository::FloorPricePoint;

/// Retention window of the floor-price time series.
pub const FLOOR_RETENTION_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

/// Recompute cadence.
pub const FLOOR_RECOMPUTE_INTERVAL: Duration = Duration::from_secs(300);

const RETENTION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

impl OrderBookIndexer {
    pub(super) async fn floor_maintenance_loop(&self) {
        // The cursor row doubles as the feature switch: no row, no sweeps.
        match self
            .repos
            .indexed_status
            .read(self.chain_id, COLLECTION_FLOOR_INDEX)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::error!(
                    chain = %self.chain,
                    "no indexed_status row for floor maintenance"
                );
                return;
            }
            Err(e) => {
                tracing::error!(chain = %self.chain, error = %e, "failed to read floor status");
                return;
            }
        }

        let mut retention = tokio::time::interval(RETENTION_INTERVAL);
        let mut recompute = tokio::time::interval(FLOOR_RECOMPUTE_INTERVAL);
        // Skip the immediate first tick of both timers.
        retention.tick().await;
        recompute.tick().await;

        let mut shutdown = self.shutdown.clone();
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!(chain = %self.chain, "floor maintenance loop stopped");
                    return;
                }
                _ = retention.tick() => {
                    if let Err(e) = self.sweep_expired_floor_prices().await {
                        tracing::error!(chain = %self.chain, error = %e, "floor retention sweep failed");
                    }
                }
                _ = recompute.tick() => {
                    if let Err(e) = self.recompute_floor_prices().await {
                        tracing::error!(chain = %self.chain, error = %e, "floor recompute failed");
                    }
                }
            }
        }
    }

    async fn sweep_expired_floor_prices(&self) -> Result<(), crate::infrastructure::persistence::DbError> {
        let cutoff = Utc::now().timestamp() - FLOOR_RETENTION_WINDOW_SECS;
        let removed = self
            .repos
            .floor_price
            .delete_older_than(self.chain_id, cutoff)
            .await?;
        tracing::info!(chain = %self.chain, removed, "swept expired floor price rows");
        Ok(())
    }

    /// Owner-backed floor per collection: min price over Active, unexpired
    /// listings whose maker still owns the item.
    async fn recompute_floor_prices(&self) -> Result<(), crate::infrastructure::persistence::DbError> {
        let now = Utc::now().timestamp();
        let floors = self
            .repos
            .order
            .collections_floor(self.chain_id, OrderKind::Listing.as_i32(), now)
            .await?;
        if floors.is_empty() {
            return Ok(());
        }

        for row in &floors {
            self.repos
                .collection
                .update_floor_price(self.chain_id, &row.collection_address, Some(row.price))
                .await?;
        }

        // The time series only tracks imported collections.
        let points: Vec<FloorPricePoint> = floors
            .iter()
            .filter(|row| self.collection_filter.contains(&row.collection_address))
            .map(|row| FloorPricePoint {
                collection_address: row.collection_address.clone(),
                price: row.price,
                event_time: now,
            })
            .collect();
        self.repos.floor_price.upsert_batch(self.chain_id, &points).await?;

        tracing::info!(chain = %self.chain, collections = floors.len(), "recomputed floor prices");
        Ok(())
    }

    /// Immediate refresh on a new listing: make sure the collection and
    /// item rows exist, then pull the collection floor from item list
    /// prices. Failures are logged, never propagated — floor freshness is
    /// not worth failing a Make over.
    pub(super) async fn maintain_collection_and_item(
        &self,
        collection_address: &str,
        token_id: &str,
        price: Decimal,
    ) {
        let now = Utc::now().timestamp();

        if let Err(e) = self
            .repos
            .collection
            .ensure_exists(self.chain_id, collection_address, now)
            .await
        {
            tracing::error!(collection = collection_address, error = %e, "failed to ensure collection");
            return;
        }

        if let Err(e) = self
            .repos
            .item
            .update_listing_info(self.chain_id, collection_address, token_id, price, now)
            .await
        {
            tracing::error!(
                collection = collection_address,
                token_id,
                error = %e,
                "failed to update item listing info"
            );
            return;
        }

        match self
            .repos
            .item
            .min_list_price(self.chain_id, collection_address)
            .await
        {
            Ok(min_price) => {
                if let Err(e) = self
                    .repos
                    .collection
                    .update_floor_price(self.chain_id, collection_address, min_price)
                    .await
                {
                    tracing::error!(collection = collection_address, error = %e, "failed to update floor price");
                }
            }
            Err(e) => {
                tracing::error!(collection = collection_address, error = %e, "failed to query min list price");
            }
        }
    }
}
