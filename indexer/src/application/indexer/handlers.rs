//! Event handlers: the order state machine's database side-effects.
//!
//! Every write is idempotent — activities are keyed by
//! (chain, tx_hash, log_index) and order mutations are keyed by order_id
//! with monotonic status guards — so replaying a batch after a crash
//! converges to the same state.

use chrono::Utc;

use super::{metadata, OrderBookIndexer};
use crate::domain::events::{
    format_address, format_order_id, ApprovalEvent, CancelEvent, MakeEvent, MatchEvent, RawLog,
};
use crate::domain::orders::{
    cancel_activity_kind, derive_match_roles, make_activity_kind, order_kind_for,
    partial_fill_step, wei_to_decimal, ActivityKind, OrderKind, PartialFillStep, Side,
    MARKET_ORDER_BOOK, ZERO_ADDRESS,
};
use crate::infrastructure::chain::ChainError;
use crate::infrastructure::kv::{
    push_order_expiry, push_update_price_event, OrderExpiryMessage, TradeEvent, TradeEventKind,
};
use crate::infrastructure::persistence::repositories::activity_repository::new_activity_model;
use crate::infrastructure::persistence::repositories::item_repository::new_item_model;
use crate::infrastructure::persistence::repositories::order_repository::new_order_model;
use crate::infrastructure::persistence::DbError;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("price {0} does not fit the decimal range")]
    Price(u128),
}

impl OrderBookIndexer {
    /// LogMake: a new listing or bid entered the book.
    pub(super) async fn handle_make(
        &self,
        log: &RawLog,
        event: MakeEvent,
    ) -> Result<(), HandlerError> {
        self.check_and_handle_fork(log).await?;

        let order_id = format_order_id(&event.order_key);
        let maker = format_address(&event.maker);
        let collection = format_address(&event.collection);
        let token_id = event.token_id.to_string();
        let price = wei_to_decimal(event.price).ok_or(HandlerError::Price(event.price))?;
        let now = Utc::now().timestamp();

        let kind = order_kind_for(event.side, event.sale_kind);
        self.repos
            .order
            .insert_new(new_order_model(
                self.chain_id,
                order_id.clone(),
                collection.clone(),
                token_id.clone(),
                MARKET_ORDER_BOOK,
                kind.as_i32(),
                price,
                self.currency_address.clone(),
                maker.clone(),
                ZERO_ADDRESS.to_string(),
                event.amount,
                event.salt as i64,
                now,
                event.expiry as i64,
            ))
            .await?;

        let (list_price, list_time) = if event.side == Side::List {
            (Some(price), Some(now))
        } else {
            (None, None)
        };
        self.repos
            .item
            .insert_if_absent(new_item_model(
                self.chain_id,
                collection.clone(),
                token_id.clone(),
                maker.clone(),
                event.amount,
                list_price,
                list_time,
                now,
            ))
            .await?;

        // Best-effort metadata backfill; never delays the cursor.
        metadata::spawn_backfill(
            self.chain_client.clone(),
            self.http.clone(),
            self.repos.item_external.clone(),
            self.chain_id,
            collection.clone(),
            token_id.clone(),
        );

        let event_time = self.chain_client.block_timestamp(log.block_number).await? as i64;
        self.repos
            .activity
            .insert(new_activity_model(
                self.chain_id,
                make_activity_kind(event.side, event.sale_kind).as_i32(),
                maker.clone(),
                ZERO_ADDRESS.to_string(),
                MARKET_ORDER_BOOK,
                collection.clone(),
                token_id.clone(),
                self.currency_address.clone(),
                price,
                log.block_number as i64,
                format!("{:#x}", log.tx_hash),
                log.log_index as i64,
                event_time,
            ))
            .await?;

        // Hand the order to the external expiry tracker.
        if let Err(e) = push_order_expiry(
            self.kv.as_ref(),
            &OrderExpiryMessage {
                order_id: order_id.clone(),
                expire_time: event.expiry as i64,
                collection_address: collection.clone(),
                token_id: token_id.clone(),
                price: price.to_string(),
                maker: maker.clone(),
            },
            &self.chain,
        )
        .await
        {
            tracing::error!(order_id = %order_id, error = %e, "failed to enqueue order for expiry tracking");
        }

        if event.side == Side::List {
            self.maintain_collection_and_item(&collection, &token_id, price)
                .await;
        }

        Ok(())
    }

    /// LogMatch: two orders crossed on-chain.
    pub(super) async fn handle_match(
        &self,
        log: &RawLog,
        event: MatchEvent,
    ) -> Result<(), HandlerError> {
        self.check_and_handle_fork(log).await?;

        let roles = derive_match_roles(&event);
        let fill_price =
            wei_to_decimal(event.fill_price).ok_or(HandlerError::Price(event.fill_price))?;

        // The sell side fills in one shot; a missing row (order made before
        // indexing started) is a no-op, not a failure.
        self.repos
            .order
            .mark_filled(self.chain_id, &roles.sell_order_id, &roles.to)
            .await?;

        // The buy side may fill over several matches.
        match self
            .repos
            .order
            .find_by_order_id(self.chain_id, &roles.buy_order_id)
            .await?
        {
            Some(buy_order) => match partial_fill_step(buy_order.quantity_remaining) {
                PartialFillStep::Decrement { new_remaining } => {
                    self.repos
                        .order
                        .set_quantity_remaining(self.chain_id, &roles.buy_order_id, new_remaining)
                        .await?;
                }
                PartialFillStep::Fill => {
                    self.repos
                        .order
                        .mark_filled_keep_taker(self.chain_id, &roles.buy_order_id)
                        .await?;
                }
            },
            None => {
                tracing::warn!(
                    chain = %self.chain,
                    order_id = %roles.buy_order_id,
                    "buy order not found, skipping quantity arithmetic"
                );
            }
        }

        let event_time = self.chain_client.block_timestamp(log.block_number).await? as i64;
        self.repos
            .activity
            .insert(new_activity_model(
                self.chain_id,
                ActivityKind::Sale.as_i32(),
                format_address(&event.make_order.maker),
                format_address(&event.take_order.maker),
                MARKET_ORDER_BOOK,
                roles.collection.clone(),
                roles.token_id.clone(),
                self.currency_address.clone(),
                fill_price,
                log.block_number as i64,
                format!("{:#x}", log.tx_hash),
                log.log_index as i64,
                event_time,
            ))
            .await?;

        self.repos
            .item
            .update_owner(
                self.chain_id,
                &roles.collection,
                &roles.token_id,
                &roles.new_owner,
            )
            .await?;

        if let Err(e) = push_update_price_event(
            self.kv.as_ref(),
            &TradeEvent {
                event_type: TradeEventKind::Buy,
                order_id: roles.sell_order_id.clone(),
                collection_address: roles.collection.clone(),
                token_id: roles.token_id.clone(),
                from: Some(roles.from.clone()),
                to: Some(roles.to.clone()),
            },
            &self.chain,
        )
        .await
        {
            tracing::error!(
                order_id = %roles.sell_order_id,
                error = %e,
                "failed to enqueue trade event for sale"
            );
        }

        Ok(())
    }

    /// LogCancel: the maker withdrew an order.
    pub(super) async fn handle_cancel(
        &self,
        log: &RawLog,
        event: CancelEvent,
    ) -> Result<(), HandlerError> {
        self.check_and_handle_fork(log).await?;

        let order_id = format_order_id(&event.order_key);

        // Monotonic: an already-Filled order ignores a late Cancel log.
        self.repos
            .order
            .cancel_if_not_filled(self.chain_id, &order_id)
            .await?;

        // The activity row and trade event copy type and price from the
        // stored order; without the row there is nothing to copy.
        let Some(order) = self
            .repos
            .order
            .find_by_order_id(self.chain_id, &order_id)
            .await?
        else {
            tracing::warn!(
                chain = %self.chain,
                order_id = %order_id,
                "cancelled order not found, skipping activity"
            );
            return Ok(());
        };

        let kind = OrderKind::from_i32(order.order_type).unwrap_or(OrderKind::ItemBid);
        let event_time = self.chain_client.block_timestamp(log.block_number).await? as i64;
        self.repos
            .activity
            .insert(new_activity_model(
                self.chain_id,
                cancel_activity_kind(kind).as_i32(),
                order.maker.clone(),
                ZERO_ADDRESS.to_string(),
                MARKET_ORDER_BOOK,
                order.collection_address.clone(),
                order.token_id.clone(),
                self.currency_address.clone(),
                order.price,
                log.block_number as i64,
                format!("{:#x}", log.tx_hash),
                log.log_index as i64,
                event_time,
            ))
            .await?;

        if let Err(e) = push_update_price_event(
            self.kv.as_ref(),
            &TradeEvent {
                event_type: TradeEventKind::Cancel,
                order_id: order.order_id.clone(),
                collection_address: order.collection_address.clone(),
                token_id: order.token_id.clone(),
                from: None,
                to: None,
            },
            &self.chain,
        )
        .await
        {
            tracing::error!(
                order_id = %order.order_id,
                error = %e,
                "failed to enqueue trade event for cancel"
            );
        }

        Ok(())
    }

    /// ERC-721 Approval: informational; recorded for audit only.
    // TODO: give approvals their own activity kind instead of reusing
    // Listing; downstream readers currently cannot tell them apart.
    pub(super) async fn handle_approval(
        &self,
        log: &RawLog,
        event: ApprovalEvent,
    ) -> Result<(), HandlerError> {
        self.check_and_handle_fork(log).await?;

        let approved = format_address(&event.approved);
        tracing::info!(
            chain = %self.chain,
            collection = %format_address(&event.collection),
            token_id = %event.token_id,
            owner = %format_address(&event.owner),
            approved = %approved,
            is_vault_approved = approved == self.vault_address,
            "erc721 approval observed"
        );

        let event_time = self.chain_client.block_timestamp(log.block_number).await? as i64;
        self.repos
            .activity
            .insert(new_activity_model(
                self.chain_id,
                ActivityKind::Listing.as_i32(),
                format_address(&event.owner),
                approved,
                MARKET_ORDER_BOOK,
                format_address(&event.collection),
                event.token_id.to_string(),
                self.currency_address.clone(),
                rust_decimal::Decimal::ZERO,
                log.block_number as i64,
                format!("{:#x}", log.tx_hash),
                log.log_index as i64,
                event_time,
            ))
            .await?;

        Ok(())
    }
}
