use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    ActivityRepository, CollectionRepository, FloorPriceRepository, IndexedStatusRepository,
    ItemExternalRepository, ItemRepository, OrderRepository, Repositories,
};

/// Factory for creating repositories.
pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn: DatabaseConnection = db_pool.get_connection().clone();

        Repositories {
            order: OrderRepository::new(conn.clone()),
            activity: ActivityRepository::new(conn.clone()),
            item: ItemRepository::new(conn.clone()),
            item_external: ItemExternalRepository::new(conn.clone()),
            collection: CollectionRepository::new(conn.clone()),
            floor_price: FloorPriceRepository::new(conn.clone()),
            indexed_status: IndexedStatusRepository::new(conn),
        }
    }
}
