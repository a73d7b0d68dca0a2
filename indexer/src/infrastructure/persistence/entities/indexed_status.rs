//! SeaORM entity for the indexed_status table: one cursor row per
//! (chain, index kind). The orderbook sync loop is kind 6, the floor
//! timeseries is kind 7.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ORDER_BOOK_EVENT_INDEX: i32 = 6;
pub const COLLECTION_FLOOR_INDEX: i32 = 7;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "indexed_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub chain_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub index_type: i32,
    pub last_indexed_block: i64,
    pub last_indexed_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
