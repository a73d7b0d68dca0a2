use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::infrastructure::persistence::entities::collection_floor_price;
use crate::infrastructure::persistence::error::DbError;

/// Upsert batch cap, keeps a single statement's bind list bounded.
pub const BATCH_SIZE_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct FloorPricePoint {
    pub collection_address: String,
    pub price: Decimal,
    pub event_time: i64,
}

/// Repository for the ob_collection_floor_price time series.
#[derive(Clone)]
pub struct FloorPriceRepository {
    conn: DatabaseConnection,
}

impl FloorPriceRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Batched upsert on (chain_id, collection_address, event_time); a
    /// sweep that lands on an existing timestamp only bumps update_time.
    pub async fn upsert_batch(
        &self,
        chain_id: i64,
        points: &[FloorPricePoint],
    ) -> Result<(), DbError> {
        let now_millis = chrono::Utc::now().timestamp_millis();

        for chunk in points.chunks(BATCH_SIZE_LIMIT) {
            let models = chunk.iter().map(|point| collection_floor_price::ActiveModel {
                chain_id: Set(chain_id),
                collection_address: Set(point.collection_address.clone()),
                price: Set(point.price),
                event_time: Set(point.event_time),
                create_time: Set(now_millis),
                update_time: Set(now_millis),
                ..Default::default()
            });

            let result = collection_floor_price::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        collection_floor_price::Column::ChainId,
                        collection_floor_price::Column::CollectionAddress,
                        collection_floor_price::Column::EventTime,
                    ])
                    .update_column(collection_floor_price::Column::UpdateTime)
                    .to_owned(),
                )
                .exec(&self.conn)
                .await;

            match result {
                Ok(_) | Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Retention sweep: drop points older than the window.
    pub async fn delete_older_than(&self, chain_id: i64, cutoff: i64) -> Result<u64, DbError> {
        let result = collection_floor_price::Entity::delete_many()
            .filter(collection_floor_price::Column::ChainId.eq(chain_id))
            .filter(collection_floor_price::Column::EventTime.lt(cutoff))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_stay_under_the_statement_cap() {
        let points: Vec<FloorPricePoint> = (0..1201)
            .map(|i| FloorPricePoint {
                collection_address: format!("0x{i:040x}"),
                price: Decimal::from(i),
                event_time: 1_700_000_000,
            })
            .collect();

        let chunks: Vec<usize> = points
            .chunks(BATCH_SIZE_LIMIT)
            .map(|chunk| chunk.len())
            .collect();
        assert_eq!(chunks, vec![500, 500, 201]);
    }
}
