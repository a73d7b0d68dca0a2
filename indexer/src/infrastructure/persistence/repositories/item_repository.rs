use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect,
};

use crate::infrastructure::persistence::entities::item;
use crate::infrastructure::persistence::error::DbError;

/// Repository for ob_item.
#[derive(Clone)]
pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// First sight of an item creates it; an existing row is left alone so
    /// a Make never overwrites ownership derived from a later Sale.
    pub async fn insert_if_absent(&self, model: item::ActiveModel) -> Result<(), DbError> {
        let result = item::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    item::Column::ChainId,
                    item::Column::CollectionAddress,
                    item::Column::TokenId,
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

    pub async fn update_owner(
        &self,
        chain_id: i64,
        collection_address: &str,
        token_id: &str,
        owner: &str,
    ) -> Result<(), DbError> {
        item::Entity::update_many()
            .col_expr(item::Column::Owner, Expr::value(owner))
            .col_expr(
                item::Column::UpdateTime,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(item::Column::ChainId.eq(chain_id))
            .filter(item::Column::CollectionAddress.eq(collection_address))
            .filter(item::Column::TokenId.eq(token_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Refresh list_price/list_time; creates a stub row when the item has
    /// never been seen (update-then-insert, no upsert, so an existing
    /// row's other columns survive).
    pub async fn update_listing_info(
        &self,
        chain_id: i64,
        collection_address: &str,
        token_id: &str,
        price: Decimal,
        now: i64,
    ) -> Result<(), DbError> {
        let updated = item::Entity::update_many()
            .col_expr(item::Column::ListPrice, Expr::value(price))
            .col_expr(item::Column::ListTime, Expr::value(now))
            .col_expr(item::Column::UpdateTime, Expr::value(now))
            .filter(item::Column::ChainId.eq(chain_id))
            .filter(item::Column::CollectionAddress.eq(collection_address))
            .filter(item::Column::TokenId.eq(token_id))
            .exec(&self.conn)
            .await?;

        if updated.rows_affected == 0 {
            let stub = item::ActiveModel {
                chain_id: Set(chain_id),
                collection_address: Set(collection_address.to_string()),
                token_id: Set(token_id.to_string()),
                name: Set(Some(format!("Token #{token_id}"))),
                owner: Set(None),
                supply: Set(1),
                list_price: Set(Some(price)),
                list_time: Set(Some(now)),
                sale_price: Set(None),
                create_time: Set(now),
                update_time: Set(now),
                ..Default::default()
            };
            self.insert_if_absent(stub).await?;
        }
        Ok(())
    }

    /// Lowest live listing price across a collection's items.
    pub async fn min_list_price(
        &self,
        chain_id: i64,
        collection_address: &str,
    ) -> Result<Option<Decimal>, DbError> {
        let min: Option<Option<Decimal>> = item::Entity::find()
            .select_only()
            .column_as(item::Column::ListPrice.min(), "min_price")
            .filter(item::Column::ChainId.eq(chain_id))
            .filter(item::Column::CollectionAddress.eq(collection_address))
            .filter(item::Column::ListPrice.is_not_null())
            .filter(item::Column::ListPrice.gt(Decimal::ZERO))
            .into_tuple()
            .one(&self.conn)
            .await?;
        Ok(min.flatten())
    }
}

/// Build the ActiveModel for an item first seen through a Make event.
#[allow(clippy::too_many_arguments)]
pub fn new_item_model(
    chain_id: i64,
    collection_address: String,
    token_id: String,
    owner: String,
    supply: i64,
    list_price: Option<Decimal>,
    list_time: Option<i64>,
    now: i64,
) -> item::ActiveModel {
    item::ActiveModel {
        chain_id: Set(chain_id),
        collection_address: Set(collection_address),
        token_id: Set(token_id.clone()),
        name: Set(Some(format!("Token #{token_id}"))),
        owner: Set(Some(owner)),
        supply: Set(supply),
        list_price: Set(list_price),
        list_time: Set(list_time),
        sale_price: Set(None),
        create_time: Set(now),
        update_time: Set(now),
        ..Default::default()
    }
}
