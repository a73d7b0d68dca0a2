use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::infrastructure::persistence::entities::indexed_status;
use crate::infrastructure::persistence::error::DbError;

/// Repository for the per-(chain, kind) sync cursors. `advance` is the
/// commit point of each batch: it runs strictly after the batch's effects
/// are durable, so a crash replays and converges.
#[derive(Clone)]
pub struct IndexedStatusRepository {
    conn: DatabaseConnection,
}

impl IndexedStatusRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn read(
        &self,
        chain_id: i64,
        index_type: i32,
    ) -> Result<Option<indexed_status::Model>, DbError> {
        Ok(indexed_status::Entity::find()
            .filter(indexed_status::Column::ChainId.eq(chain_id))
            .filter(indexed_status::Column::IndexType.eq(index_type))
            .one(&self.conn)
            .await?)
    }

    pub async fn advance(
        &self,
        chain_id: i64,
        index_type: i32,
        last_indexed_block: i64,
    ) -> Result<(), DbError> {
        indexed_status::Entity::update_many()
            .col_expr(
                indexed_status::Column::LastIndexedBlock,
                Expr::value(last_indexed_block),
            )
            .col_expr(
                indexed_status::Column::LastIndexedTime,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(indexed_status::Column::ChainId.eq(chain_id))
            .filter(indexed_status::Column::IndexType.eq(index_type))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
