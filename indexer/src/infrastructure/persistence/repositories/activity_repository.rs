use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter,
};

use crate::infrastructure::persistence::entities::activity;
use crate::infrastructure::persistence::error::DbError;

/// Repository for the ob_activity append log.
#[derive(Clone)]
pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Idempotent append keyed on (chain_id, tx_hash, log_index).
    pub async fn insert(&self, model: activity::ActiveModel) -> Result<(), DbError> {
        let result = activity::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    activity::Column::ChainId,
                    activity::Column::TxHash,
                    activity::Column::LogIndex,
                ])
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

    /// Reorg probe: does this tx already have rows at a different height?
    pub async fn has_conflicting_tx(
        &self,
        chain_id: i64,
        tx_hash: &str,
        block_number: i64,
    ) -> Result<bool, DbError> {
        let count = activity::Entity::find()
            .filter(activity::Column::ChainId.eq(chain_id))
            .filter(activity::Column::TxHash.eq(tx_hash))
            .filter(activity::Column::BlockNumber.ne(block_number))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_by_tx(
        &self,
        chain_id: i64,
        tx_hash: &str,
    ) -> Result<Vec<activity::Model>, DbError> {
        Ok(activity::Entity::find()
            .filter(activity::Column::ChainId.eq(chain_id))
            .filter(activity::Column::TxHash.eq(tx_hash))
            .all(&self.conn)
            .await?)
    }

    pub async fn delete_by_tx(&self, chain_id: i64, tx_hash: &str) -> Result<(), DbError> {
        activity::Entity::delete_many()
            .filter(activity::Column::ChainId.eq(chain_id))
            .filter(activity::Column::TxHash.eq(tx_hash))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}

/// Build the ActiveModel for one activity row.
#[allow(clippy::too_many_arguments)]
pub fn new_activity_model(
    chain_id: i64,
    activity_type: i32,
    maker: String,
    taker: String,
    marketplace_id: i32,
    collection_address: String,
    token_id: String,
    currency_address: String,
    price: Decimal,
    block_number: i64,
    tx_hash: String,
    log_index: i64,
    event_time: i64,
) -> activity::ActiveModel {
    activity::ActiveModel {
        chain_id: Set(chain_id),
        activity_type: Set(activity_type),
        maker: Set(maker),
        taker: Set(taker),
        marketplace_id: Set(marketplace_id),
        collection_address: Set(collection_address),
        token_id: Set(token_id),
        currency_address: Set(currency_address),
        price: Set(price),
        block_number: Set(block_number),
        tx_hash: Set(tx_hash),
        log_index: Set(log_index),
        event_time: Set(event_time),
        ..Default::default()
    }
}
