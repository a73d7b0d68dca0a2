use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::db::error::DbError;
use crate::entity::collection;

pub struct CollectionRepository {
    conn: DatabaseConnection,
}

impl CollectionRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Display rows for a page's referenced (chain_id, address) pairs.
    pub async fn find_by_keys(
        &self,
        keys: &[(i64, String)],
    ) -> Result<Vec<collection::Model>, DbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut any = Condition::any();
        for (chain_id, address) in keys {
            any = any.add(
                Condition::all()
                    .add(collection::Column::ChainId.eq(*chain_id))
                    .add(collection::Column::Address.eq(address.clone())),
            );
        }

        Ok(collection::Entity::find()
            .filter(any)
            .all(&self.conn)
            .await?)
    }
}
