use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::db::error::DbError;
use crate::entity::{item, item_external};

/// (chain_id, collection_address, token_id) lookup key.
pub type ItemKey = (i64, String, String);

fn item_condition(keys: &[ItemKey]) -> Condition {
    let mut any = Condition::any();
    for (chain_id, collection_address, token_id) in keys {
        any = any.add(
            Condition::all()
                .add(item::Column::ChainId.eq(*chain_id))
                .add(item::Column::CollectionAddress.eq(collection_address.clone()))
                .add(item::Column::TokenId.eq(token_id.clone())),
        );
    }
    any
}

fn item_external_condition(keys: &[ItemKey]) -> Condition {
    let mut any = Condition::any();
    for (chain_id, collection_address, token_id) in keys {
        any = any.add(
            Condition::all()
                .add(item_external::Column::ChainId.eq(*chain_id))
                .add(item_external::Column::CollectionAddress.eq(collection_address.clone()))
                .add(item_external::Column::TokenId.eq(token_id.clone())),
        );
    }
    any
}

pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Display rows for one page's worth of keys.
    pub async fn find_by_keys(&self, keys: &[ItemKey]) -> Result<Vec<item::Model>, DbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        Ok(item::Entity::find()
            .filter(item_condition(keys))
            .all(&self.conn)
            .await?)
    }

    pub async fn find_one(
        &self,
        chain_id: i64,
        collection_address: &str,
        token_id: &str,
    ) -> Result<Option<item::Model>, DbError> {
        Ok(item::Entity::find()
            .filter(item::Column::ChainId.eq(chain_id))
            .filter(item::Column::CollectionAddress.eq(collection_address))
            .filter(item::Column::TokenId.eq(token_id))
            .one(&self.conn)
            .await?)
    }
}

pub struct ItemExternalRepository {
    conn: DatabaseConnection,
}

impl ItemExternalRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_keys(
        &self,
        keys: &[ItemKey],
    ) -> Result<Vec<item_external::Model>, DbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        Ok(item_external::Entity::find()
            .filter(item_external_condition(keys))
            .all(&self.conn)
            .await?)
    }

    pub async fn find_one(
        &self,
        chain_id: i64,
        collection_address: &str,
        token_id: &str,
    ) -> Result<Option<item_external::Model>, DbError> {
        Ok(item_external::Entity::find()
            .filter(item_external::Column::ChainId.eq(chain_id))
            .filter(item_external::Column::CollectionAddress.eq(collection_address))
            .filter(item_external::Column::TokenId.eq(token_id))
            .one(&self.conn)
            .await?)
    }
}
