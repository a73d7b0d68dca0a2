//! SeaORM entity for the ob_order table.
//! One row per on-chain OrderKey; unique on (chain_id, order_id).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_order")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    #[sea_orm(column_type = "Text")]
    pub order_id: String,
    #[sea_orm(column_type = "Text")]
    pub collection_address: String,
    #[sea_orm(column_type = "Text")]
    pub token_id: String,
    pub marketplace_id: i32,
    pub order_type: i32,
    pub order_status: i32,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Text")]
    pub currency_address: String,
    #[sea_orm(column_type = "Text")]
    pub maker: String,
    #[sea_orm(column_type = "Text")]
    pub taker: String,
    pub quantity_remaining: i64,
    pub size: i64,
    pub salt: i64,
    pub event_time: i64,
    pub expire_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
