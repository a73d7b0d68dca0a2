use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    #[sea_orm(column_type = "Text")]
    pub collection_address: String,
    #[sea_orm(column_type = "Text")]
    pub token_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub owner: Option<String>,
    pub supply: i64,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub list_price: Option<Decimal>,
    pub list_time: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub sale_price: Option<Decimal>,
    pub create_time: i64,
    pub update_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
