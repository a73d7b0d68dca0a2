//! SeaORM entity for the ob_item_external table: best-effort token
//! metadata written once per (chain, collection, token).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ob_item_external")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    #[sea_orm(column_type = "Text")]
    pub collection_address: String,
    #[sea_orm(column_type = "Text")]
    pub token_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub meta_data_uri: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_uri: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub oss_uri: Option<String>,
    pub is_uploaded_oss: bool,
    pub upload_status: i32,
    pub create_time: i64,
    pub update_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
