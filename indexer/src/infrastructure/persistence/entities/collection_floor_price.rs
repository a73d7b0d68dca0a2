//! SeaORM entity for the ob_collection_floor_price time series.
//! Unique on (chain_id, collection_address, event_time); rows older than
//! the retention window are swept daily.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_collection_floor_price")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    #[sea_orm(column_type = "Text")]
    pub collection_address: String,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub price: Decimal,
    pub event_time: i64,
    pub create_time: i64,
    pub update_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
