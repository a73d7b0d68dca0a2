//! SeaORM entity for the ob_collection table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_collection")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub symbol: String,
    #[sea_orm(column_type = "Text")]
    pub creator: String,
    pub token_standard: i32,
    pub owner_amount: i64,
    pub item_amount: i64,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub floor_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub sale_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub volume_total: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_uri: Option<String>,
    /// 1 when the collection is imported for indexing; read by the
    /// collection filter at startup.
    pub floor_price_status: i32,
    pub create_time: i64,
    pub update_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
