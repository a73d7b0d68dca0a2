pub use sea_orm_migration::prelude::*;

mod m20250610_000001_create_orderbook_tables;
mod m20250610_000002_create_activity_indexes;
mod m20250702_000001_add_floor_price_status;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250610_000001_create_orderbook_tables::Migration),
            Box::new(m20250610_000002_create_activity_indexes::Migration),
            Box::new(m20250702_000001_add_floor_price_status::Migration),
        ]
    }
}
