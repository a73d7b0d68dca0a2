use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
};

use crate::domain::orders::ZERO_ADDRESS;
use crate::infrastructure::persistence::entities::collection;
use crate::infrastructure::persistence::error::DbError;

/// Collections marked with this status are loaded into the tracked set.
pub const FLOOR_PRICE_IMPORTED: i32 = 1;

/// Repository for ob_collection.
#[derive(Clone)]
pub struct CollectionRepository {
    conn: DatabaseConnection,
}

impl CollectionRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a placeholder row the first time a collection trades; real
    /// metadata arrives later through admin imports.
    pub async fn ensure_exists(
        &self,
        chain_id: i64,
        address: &str,
        now: i64,
    ) -> Result<(), DbError> {
        let existing = collection::Entity::find()
            .filter(collection::Column::ChainId.eq(chain_id))
            .filter(collection::Column::Address.eq(address))
            .count(&self.conn)
            .await?;
        if existing > 0 {
            return Ok(());
        }

        let model = collection::ActiveModel {
            chain_id: Set(chain_id),
            address: Set(address.to_string()),
            name: Set("Unknown Collection".to_string()),
            symbol: Set("Unknown".to_string()),
            creator: Set(ZERO_ADDRESS.to_string()),
            token_standard: Set(721),
            owner_amount: Set(0),
            item_amount: Set(0),
            floor_price: Set(None),
            sale_price: Set(None),
            volume_total: Set(Decimal::ZERO),
            image_uri: Set(None),
            floor_price_status: Set(0),
            create_time: Set(now),
            update_time: Set(now),
            ..Default::default()
        };
        collection::Entity::insert(model).exec(&self.conn).await?;
        tracing::info!(collection = address, "created placeholder collection row");
        Ok(())
    }

    pub async fn update_floor_price(
        &self,
        chain_id: i64,
        address: &str,
        floor_price: Option<Decimal>,
    ) -> Result<(), DbError> {
        collection::Entity::update_many()
            .col_expr(collection::Column::FloorPrice, Expr::value(floor_price))
            .col_expr(
                collection::Column::UpdateTime,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(collection::Column::ChainId.eq(chain_id))
            .filter(collection::Column::Address.eq(address))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Addresses eligible for indexing, used to seed the collection filter.
    pub async fn sync_enabled_addresses(&self, chain_id: i64) -> Result<Vec<String>, DbError> {
        let addresses: Vec<String> = collection::Entity::find()
            .select_only()
            .column(collection::Column::Address)
            .filter(collection::Column::ChainId.eq(chain_id))
            .filter(collection::Column::FloorPriceStatus.eq(FLOOR_PRICE_IMPORTED))
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(addresses)
    }
}
