//! SeaORM entity for the ob_activity table.
//! Append-mostly log; unique on (chain_id, tx_hash, log_index) so replays
//! collapse to no-ops. Rows of an orphaned tx are deleted by the reorg
//! guard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_activity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    pub activity_type: i32,
    #[sea_orm(column_type = "Text")]
    pub maker: String,
    #[sea_orm(column_type = "Text")]
    pub taker: String,
    pub marketplace_id: i32,
    #[sea_orm(column_type = "Text")]
    pub collection_address: String,
    #[sea_orm(column_type = "Text")]
    pub token_id: String,
    #[sea_orm(column_type = "Text")]
    pub currency_address: String,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub price: Decimal,
    pub block_number: i64,
    #[sea_orm(column_type = "Text")]
    pub tx_hash: String,
    pub log_index: i64,
    pub event_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
