use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Idempotence key: one activity row per on-chain log.
        manager
            .create_index(
                Index::create()
                    .name("uk_ob_activity_chain_tx_log")
                    .table(ObActivity::Table)
                    .col(ObActivity::ChainId)
                    .col(ObActivity::TxHash)
                    .col(ObActivity::LogIndex)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Feed ordering: (chain, event_time DESC, id DESC).
        manager
            .create_index(
                Index::create()
                    .name("idx_ob_activity_chain_event_time_id")
                    .table(ObActivity::Table)
                    .col(ObActivity::ChainId)
                    .col((ObActivity::EventTime, IndexOrder::Desc))
                    .col((ObActivity::Id, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Reorg detection probes by tx hash.
        manager
            .create_index(
                Index::create()
                    .name("idx_ob_activity_chain_tx_hash")
                    .table(ObActivity::Table)
                    .col(ObActivity::ChainId)
                    .col(ObActivity::TxHash)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // User-feed predicates.
        manager
            .create_index(
                Index::create()
                    .name("idx_ob_activity_maker")
                    .table(ObActivity::Table)
                    .col(ObActivity::ChainId)
                    .col(ObActivity::Maker)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_ob_activity_taker")
                    .table(ObActivity::Table)
                    .col(ObActivity::ChainId)
                    .col(ObActivity::Taker)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_ob_activity_taker",
            "idx_ob_activity_maker",
            "idx_ob_activity_chain_tx_hash",
            "idx_ob_activity_chain_event_time_id",
            "uk_ob_activity_chain_tx_log",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(ObActivity::Table)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ObActivity {
    Table,
    Id,
    ChainId,
    Maker,
    Taker,
    TxHash,
    LogIndex,
    EventTime,
}
