use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, Statement,
};

use crate::domain::orders::OrderStatus;
use crate::infrastructure::persistence::entities::order;
use crate::infrastructure::persistence::error::DbError;

/// One row of the owner-backed floor recompute.
#[derive(Debug, Clone, FromQueryResult)]
pub struct CollectionFloorRow {
    pub collection_address: String,
    pub price: Decimal,
}

/// Repository for ob_order. Status writes are monotonic where the state
/// machine requires it; the reorg guard is the only caller allowed to move
/// an order backwards.
#[derive(Clone)]
pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a fresh order; a replayed LogMake collapses to a no-op on
    /// the (chain_id, order_id) unique key.
    pub async fn insert_new(&self, model: order::ActiveModel) -> Result<(), DbError> {
        let result = order::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([order::Column::ChainId, order::Column::OrderId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_order_id(
        &self,
        chain_id: i64,
        order_id: &str,
    ) -> Result<Option<order::Model>, DbError> {
        Ok(order::Entity::find()
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::OrderId.eq(order_id))
            .one(&self.conn)
            .await?)
    }

    /// Fill the sell side of a match: Filled, nothing remaining, taker set.
    pub async fn mark_filled(
        &self,
        chain_id: i64,
        order_id: &str,
        taker: &str,
    ) -> Result<(), DbError> {
        order::Entity::update_many()
            .col_expr(
                order::Column::OrderStatus,
                Expr::value(OrderStatus::Filled.as_i32()),
            )
            .col_expr(order::Column::QuantityRemaining, Expr::value(0i64))
            .col_expr(order::Column::Taker, Expr::value(taker))
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::OrderId.eq(order_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Fill the buy side once its last unit is consumed.
    pub async fn mark_filled_keep_taker(
        &self,
        chain_id: i64,
        order_id: &str,
    ) -> Result<(), DbError> {
        order::Entity::update_many()
            .col_expr(
                order::Column::OrderStatus,
                Expr::value(OrderStatus::Filled.as_i32()),
            )
            .col_expr(order::Column::QuantityRemaining, Expr::value(0i64))
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::OrderId.eq(order_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_quantity_remaining(
        &self,
        chain_id: i64,
        order_id: &str,
        quantity_remaining: i64,
    ) -> Result<(), DbError> {
        order::Entity::update_many()
            .col_expr(
                order::Column::QuantityRemaining,
                Expr::value(quantity_remaining),
            )
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::OrderId.eq(order_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Cancel is monotonic: an already-Filled order stays Filled.
    pub async fn cancel_if_not_filled(
        &self,
        chain_id: i64,
        order_id: &str,
    ) -> Result<(), DbError> {
        order::Entity::update_many()
            .col_expr(
                order::Column::OrderStatus,
                Expr::value(OrderStatus::Cancelled.as_i32()),
            )
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::OrderId.eq(order_id))
            .filter(order::Column::OrderStatus.ne(OrderStatus::Filled.as_i32()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Reorg rollback of a Sale activity: back to Active, taker cleared,
    /// one consumed unit returned (capped at the order size).
    pub async fn restore_after_sale_rollback(
        &self,
        chain_id: i64,
        maker: &str,
        collection_address: &str,
        token_id: &str,
        price: Decimal,
        zero_address: &str,
    ) -> Result<(), DbError> {
        order::Entity::update_many()
            .col_expr(
                order::Column::OrderStatus,
                Expr::value(OrderStatus::Active.as_i32()),
            )
            .col_expr(
                order::Column::QuantityRemaining,
                Expr::cust("LEAST(size, quantity_remaining + 1)"),
            )
            .col_expr(order::Column::Taker, Expr::value(zero_address))
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::Maker.eq(maker))
            .filter(order::Column::CollectionAddress.eq(collection_address))
            .filter(order::Column::TokenId.eq(token_id))
            .filter(order::Column::Price.eq(price))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Reorg rollback of a Cancel* activity: the order never was cancelled.
    pub async fn restore_after_cancel_rollback(
        &self,
        chain_id: i64,
        maker: &str,
        collection_address: &str,
        token_id: &str,
        price: Decimal,
    ) -> Result<(), DbError> {
        order::Entity::update_many()
            .col_expr(
                order::Column::OrderStatus,
                Expr::value(OrderStatus::Active.as_i32()),
            )
            .filter(order::Column::ChainId.eq(chain_id))
            .filter(order::Column::Maker.eq(maker))
            .filter(order::Column::CollectionAddress.eq(collection_address))
            .filter(order::Column::TokenId.eq(token_id))
            .filter(order::Column::Price.eq(price))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Per-collection floor over active listings still backed by the
    /// seller's ownership: stale listings drop out via `maker = owner`.
    pub async fn collections_floor(
        &self,
        chain_id: i64,
        listing_order_type: i32,
        now: i64,
    ) -> Result<Vec<CollectionFloorRow>, DbError> {
        let rows = CollectionFloorRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT o.collection_address AS collection_address, MIN(o.price) AS price
               FROM ob_item AS i
               JOIN ob_order AS o
                 ON o.chain_id = i.chain_id
                AND o.collection_address = i.collection_address
                AND o.token_id = i.token_id
               WHERE o.chain_id = $1
                 AND o.order_type = $2
                 AND o.order_status = $3
                 AND o.expire_time > $4
                 AND o.maker = i.owner
               GROUP BY o.collection_address"#,
            [
                chain_id.into(),
                listing_order_type.into(),
                OrderStatus::Active.as_i32().into(),
                now.into(),
            ],
        ))
        .all(&self.conn)
        .await?;
        Ok(rows)
    }
}

/// Build the ActiveModel for a freshly made order.
#[allow(clippy::too_many_arguments)]
pub fn new_order_model(
    chain_id: i64,
    order_id: String,
    collection_address: String,
    token_id: String,
    marketplace_id: i32,
    order_type: i32,
    price: Decimal,
    currency_address: String,
    maker: String,
    taker: String,
    quantity: i64,
    salt: i64,
    event_time: i64,
    expire_time: i64,
) -> order::ActiveModel {
    order::ActiveModel {
        chain_id: Set(chain_id),
        order_id: Set(order_id),
        collection_address: Set(collection_address),
        token_id: Set(token_id),
        marketplace_id: Set(marketplace_id),
        order_type: Set(order_type),
        order_status: Set(OrderStatus::Active.as_i32()),
        price: Set(price),
        currency_address: Set(currency_address),
        maker: Set(maker),
        taker: Set(taker),
        quantity_remaining: Set(quantity),
        size: Set(quantity),
        salt: Set(salt),
        event_time: Set(event_time),
        expire_time: Set(expire_time),
        ..Default::default()
    }
}
