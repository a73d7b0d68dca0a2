//! Reorg detection and rollback.
//!
//! A transaction observed at a different height than previously recorded
//! means the chain reorganised under us. All state derived from the old
//! position is unwound using the activity log as the undo journal, then
//! the new logs apply normally through the idempotent handlers.

use crate::domain::events::RawLog;
use crate::domain::orders::{ActivityKind, ZERO_ADDRESS};
use crate::infrastructure::persistence::entities::activity;
use crate::infrastructure::persistence::DbError;
use rust_decimal::Decimal;

use super::OrderBookIndexer;

/// One undo step derived from an orphaned activity row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackAction {
    /// Undo a Sale: order back to Active with one unit returned and the
    /// taker cleared, item ownership back to the seller.
    RestoreSale {
        maker: String,
        collection_address: String,
        token_id: String,
        price: Decimal,
    },
    /// Undo a Cancel*: the order never was cancelled.
    RestoreCancel {
        maker: String,
        collection_address: String,
        token_id: String,
        price: Decimal,
    },
}

/// Pure undo plan for a set of orphaned activity rows. Make-type rows need
/// no order rollback — deleting the activity suffices, the order row is
/// re-asserted when the log re-applies on the canonical branch.
pub fn rollback_plan(activities: &[activity::Model]) -> Vec<RollbackAction> {
    activities
        .iter()
        .filter_map(|row| match ActivityKind::from_i32(row.activity_type) {
            Some(ActivityKind::Sale) => Some(RollbackAction::RestoreSale {
                maker: row.maker.clone(),
                collection_address: row.collection_address.clone(),
                token_id: row.token_id.clone(),
                price: row.price,
            }),
            Some(
                ActivityKind::CancelListing
                | ActivityKind::CancelItemBid
                | ActivityKind::CancelCollectionBid,
            ) => Some(RollbackAction::RestoreCancel {
                maker: row.maker.clone(),
                collection_address: row.collection_address.clone(),
                token_id: row.token_id.clone(),
                price: row.price,
            }),
            _ => None,
        })
        .collect()
}

impl OrderBookIndexer {
    /// Detect a moved transaction and unwind it before the caller applies
    /// the new log. Runs at the top of every handler.
    pub(super) async fn check_and_handle_fork(&self, log: &RawLog) -> Result<(), DbError> {
        let tx_hash = format!("{:#x}", log.tx_hash);
        let moved = self
            .repos
            .activity
            .has_conflicting_tx(self.chain_id, &tx_hash, log.block_number as i64)
            .await?;
        if !moved {
            return Ok(());
        }

        tracing::warn!(
            chain = %self.chain,
            tx_hash = %tx_hash,
            new_block_number = log.block_number,
            "fork detected, rolling back transaction"
        );

        let orphaned = self.repos.activity.find_by_tx(self.chain_id, &tx_hash).await?;
        for action in rollback_plan(&orphaned) {
            match action {
                RollbackAction::RestoreSale {
                    maker,
                    collection_address,
                    token_id,
                    price,
                } => {
                    self.repos
                        .order
                        .restore_after_sale_rollback(
                            self.chain_id,
                            &maker,
                            &collection_address,
                            &token_id,
                            price,
                            ZERO_ADDRESS,
                        )
                        .await?;
                    self.repos
                        .item
                        .update_owner(self.chain_id, &collection_address, &token_id, &maker)
                        .await?;
                }
                RollbackAction::RestoreCancel {
                    maker,
                    collection_address,
                    token_id,
                    price,
                } => {
                    self.repos
                        .order
                        .restore_after_cancel_rollback(
                            self.chain_id,
                            &maker,
                            &collection_address,
                            &token_id,
                            price,
                        )
                        .await?;
                }
            }
        }

        self.repos.activity.delete_by_tx(self.chain_id, &tx_hash).await?;

        tracing::info!(
            chain = %self.chain,
            tx_hash = %tx_hash,
            new_block_number = log.block_number,
            "handled fork situation"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orders::MARKET_ORDER_BOOK;

    fn activity_row(activity_type: ActivityKind, maker: &str) -> activity::Model {
        activity::Model {
            id: 1,
            chain_id: 11155111,
            activity_type: activity_type.as_i32(),
            maker: maker.to_string(),
            taker: "0xbbb0000000000000000000000000000000000bbb".to_string(),
            marketplace_id: MARKET_ORDER_BOOK,
            collection_address: "0xccc0000000000000000000000000000000000ccc".to_string(),
            token_id: "7".to_string(),
            currency_address: ZERO_ADDRESS.to_string(),
            price: Decimal::from(1_000_000u64),
            block_number: 110,
            tx_hash: format!("0x{}", "0b".repeat(32)),
            log_index: 1,
            event_time: 1_700_000_000,
        }
    }

    #[test]
    fn sale_rolls_back_order_and_ownership() {
        let rows = vec![activity_row(
            ActivityKind::Sale,
            "0xaaa0000000000000000000000000000000000aaa",
        )];
        let plan = rollback_plan(&rows);
        assert_eq!(
            plan,
            vec![RollbackAction::RestoreSale {
                maker: "0xaaa0000000000000000000000000000000000aaa".to_string(),
                collection_address: "0xccc0000000000000000000000000000000000ccc".to_string(),
                token_id: "7".to_string(),
                price: Decimal::from(1_000_000u64),
            }]
        );
    }

    #[test]
    fn every_cancel_variant_restores_the_order() {
        for kind in [
            ActivityKind::CancelListing,
            ActivityKind::CancelItemBid,
            ActivityKind::CancelCollectionBid,
        ] {
            let plan = rollback_plan(&[activity_row(
                kind,
                "0xaaa0000000000000000000000000000000000aaa",
            )]);
            assert!(matches!(plan[0], RollbackAction::RestoreCancel { .. }));
        }
    }

    #[test]
    fn make_type_rows_need_no_order_rollback() {
        for kind in [
            ActivityKind::Listing,
            ActivityKind::ItemBid,
            ActivityKind::CollectionBid,
            ActivityKind::Transfer,
            ActivityKind::Mint,
        ] {
            assert!(rollback_plan(&[activity_row(
                kind,
                "0xaaa0000000000000000000000000000000000aaa"
            )])
            .is_empty());
        }
    }

    #[test]
    fn one_restore_per_sale_row() {
        // A tx with two partial-fill Sales yields two single-unit
        // restores, not one double restore.
        let rows = vec![
            activity_row(ActivityKind::Sale, "0xaaa0000000000000000000000000000000000aaa"),
            activity_row(ActivityKind::Sale, "0xaaa0000000000000000000000000000000000aaa"),
        ];
        let plan = rollback_plan(&rows);
        assert_eq!(plan.len(), 2);
        assert!(plan
            .iter()
            .all(|action| matches!(action, RollbackAction::RestoreSale { .. })));
    }
}
