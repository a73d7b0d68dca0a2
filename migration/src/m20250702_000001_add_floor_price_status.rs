use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Sync flag read by the collection filter at indexer startup.
        // 0 = not tracked, 1 = imported (eligible for indexing).
        manager
            .alter_table(
                Table::alter()
                    .table(ObCollection::Table)
                    .add_column_if_not_exists(
                        ColumnDef::new(ObCollection::FloorPriceStatus)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ObCollection::Table)
                    .drop_column(ObCollection::FloorPriceStatus)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ObCollection {
    Table,
    FloorPriceStatus,
}
