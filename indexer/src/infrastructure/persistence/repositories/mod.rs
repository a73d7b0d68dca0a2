pub mod activity_repository;
pub mod collection_repository;
pub mod floor_price_repository;
pub mod indexed_status_repository;
pub mod item_external_repository;
pub mod item_repository;
pub mod order_repository;

pub use activity_repository::ActivityRepository;
pub use collection_repository::CollectionRepository;
pub use floor_price_repository::FloorPriceRepository;
pub use indexed_status_repository::IndexedStatusRepository;
pub use item_external_repository::ItemExternalRepository;
pub use item_repository::ItemRepository;
pub use order_repository::OrderRepository;

/// All repositories the indexer writes through, cloned freely across
/// tasks (each holds its own handle to the shared pool).
#[derive(Clone)]
pub struct Repositories {
    pub order: OrderRepository,
    pub activity: ActivityRepository,
    pub item: ItemRepository,
    pub item_external: ItemExternalRepository,
    pub collection: CollectionRepository,
    pub floor_price: FloorPriceRepository,
    pub indexed_status: IndexedStatusRepository,
}
