use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait};

use crate::infrastructure::persistence::entities::item_external;
use crate::infrastructure::persistence::error::DbError;

/// Repository for ob_item_external, written once per item by the
/// metadata backfill.
#[derive(Clone)]
pub struct ItemExternalRepository {
    conn: DatabaseConnection,
}

impl ItemExternalRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert_if_absent(
        &self,
        chain_id: i64,
        collection_address: &str,
        token_id: &str,
        meta_data_uri: Option<String>,
        image_uri: Option<String>,
        now: i64,
    ) -> Result<(), DbError> {
        let model = item_external::ActiveModel {
            chain_id: Set(chain_id),
            collection_address: Set(collection_address.to_string()),
            token_id: Set(token_id.to_string()),
            meta_data_uri: Set(meta_data_uri),
            image_uri: Set(image_uri),
            oss_uri: Set(None),
            is_uploaded_oss: Set(false),
            upload_status: Set(0),
            create_time: Set(now),
            update_time: Set(now),
            ..Default::default()
        };

        let result = item_external::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    item_external::Column::ChainId,
                    item_external::Column::CollectionAddress,
                    item_external::Column::TokenId,
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
}
