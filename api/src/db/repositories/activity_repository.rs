use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::db::error::DbError;
use crate::entity::activity;

/// Resolved activity-feed predicate: ids already mapped, addresses
/// already lowercased, pagination already bounded.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub chain_ids: Vec<i64>,
    pub collection_addresses: Vec<String>,
    pub token_id: Option<String>,
    pub user_addresses: Vec<String>,
    pub event_type_ids: Vec<i32>,
    pub page: u64,
    pub page_size: u64,
}

impl ActivityQuery {
    pub fn offset(&self) -> u64 {
        self.page_size * self.page.saturating_sub(1)
    }
}

/// Repository for the activity feed, one query across all requested
/// chains ordered by (event_time DESC, id DESC).
pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn filtered(query: &ActivityQuery) -> sea_orm::Select<activity::Entity> {
        let mut select = activity::Entity::find();

        if !query.chain_ids.is_empty() {
            select = select.filter(activity::Column::ChainId.is_in(query.chain_ids.clone()));
        }
        if !query.collection_addresses.is_empty() {
            select = select.filter(
                activity::Column::CollectionAddress.is_in(query.collection_addresses.clone()),
            );
        }
        if let Some(token_id) = &query.token_id {
            select = select.filter(activity::Column::TokenId.eq(token_id.clone()));
        }
        if !query.event_type_ids.is_empty() {
            select =
                select.filter(activity::Column::ActivityType.is_in(query.event_type_ids.clone()));
        }
        if !query.user_addresses.is_empty() {
            select = select.filter(
                Condition::any()
                    .add(activity::Column::Maker.is_in(query.user_addresses.clone()))
                    .add(activity::Column::Taker.is_in(query.user_addresses.clone())),
            );
        }

        select
    }

    pub async fn query_page(
        &self,
        query: &ActivityQuery,
    ) -> Result<Vec<activity::Model>, DbError> {
        Ok(Self::filtered(query)
            .order_by_desc(activity::Column::EventTime)
            .order_by_desc(activity::Column::Id)
            .limit(query.page_size)
            .offset(query.offset())
            .all(&self.conn)
            .await?)
    }

    pub async fn count(&self, query: &ActivityQuery) -> Result<u64, DbError> {
        Ok(Self::filtered(query).count(&self.conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_pages() {
        let query = ActivityQuery {
            page: 1,
            page_size: 15,
            ..Default::default()
        };
        assert_eq!(query.offset(), 0);

        let query = ActivityQuery {
            page: 3,
            page_size: 15,
            ..Default::default()
        };
        assert_eq!(query.offset(), 30);
    }

    #[test]
    fn page_zero_does_not_underflow() {
        let query = ActivityQuery {
            page: 0,
            page_size: 15,
            ..Default::default()
        };
        assert_eq!(query.offset(), 0);
    }
}
