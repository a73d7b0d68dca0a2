pub mod activity_repository;
pub mod collection_repository;
pub mod item_repository;

pub use activity_repository::{ActivityQuery, ActivityRepository};
pub use collection_repository::CollectionRepository;
pub use item_repository::{ItemExternalRepository, ItemRepository};

use sea_orm::DatabaseConnection;

/// Read-side repositories shared through the app state.
pub struct Repositories {
    pub activity: ActivityRepository,
    pub item: ItemRepository,
    pub item_external: ItemExternalRepository,
    pub collection: CollectionRepository,
}

impl Repositories {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            activity: ActivityRepository::new(conn.clone()),
            item: ItemRepository::new(conn.clone()),
            item_external: ItemExternalRepository::new(conn.clone()),
            collection: CollectionRepository::new(conn),
        }
    }
}
