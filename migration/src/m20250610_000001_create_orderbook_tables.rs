use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Orderbook orders, one row per on-chain OrderKey.
        manager
            .create_table(
                Table::create()
                    .table(ObOrder::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObOrder::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ObOrder::ChainId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ObOrder::OrderId)
                            .string_len(66)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObOrder::CollectionAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObOrder::TokenId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(ObOrder::MarketplaceId)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(ObOrder::OrderType).integer().not_null())
                    .col(ColumnDef::new(ObOrder::OrderStatus).integer().not_null())
                    .col(
                        ColumnDef::new(ObOrder::Price)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObOrder::CurrencyAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObOrder::Maker).string_len(42).not_null())
                    .col(ColumnDef::new(ObOrder::Taker).string_len(42).not_null())
                    .col(
                        ColumnDef::new(ObOrder::QuantityRemaining)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObOrder::Size).big_integer().not_null())
                    .col(ColumnDef::new(ObOrder::Salt).big_integer().not_null())
                    .col(ColumnDef::new(ObOrder::EventTime).big_integer().not_null())
                    .col(
                        ColumnDef::new(ObOrder::ExpireTime)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_ob_order_chain_order_id")
                    .table(ObOrder::Table)
                    .col(ObOrder::ChainId)
                    .col(ObOrder::OrderId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Covers the floor-price recompute scan.
        manager
            .create_index(
                Index::create()
                    .name("idx_ob_order_collection_status")
                    .table(ObOrder::Table)
                    .col(ObOrder::ChainId)
                    .col(ObOrder::CollectionAddress)
                    .col(ObOrder::OrderStatus)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Append-mostly activity log, one row per on-chain log.
        manager
            .create_table(
                Table::create()
                    .table(ObActivity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObActivity::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::ActivityType)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObActivity::Maker).string_len(42).not_null())
                    .col(ColumnDef::new(ObActivity::Taker).string_len(42).not_null())
                    .col(
                        ColumnDef::new(ObActivity::MarketplaceId)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ObActivity::CollectionAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::TokenId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::CurrencyAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::Price)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::TxHash)
                            .string_len(66)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::LogIndex)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObActivity::EventTime)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // NFT items, one row per (chain, collection, token).
        manager
            .create_table(
                Table::create()
                    .table(ObItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObItem::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ObItem::ChainId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ObItem::CollectionAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObItem::TokenId).string_len(128).not_null())
                    .col(ColumnDef::new(ObItem::Name).string_len(256).null())
                    .col(ColumnDef::new(ObItem::Owner).string_len(42).null())
                    .col(
                        ColumnDef::new(ObItem::Supply)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(ObItem::ListPrice).decimal_len(78, 0).null())
                    .col(ColumnDef::new(ObItem::ListTime).big_integer().null())
                    .col(ColumnDef::new(ObItem::SalePrice).decimal_len(78, 0).null())
                    .col(
                        ColumnDef::new(ObItem::CreateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObItem::UpdateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_ob_item_chain_collection_token")
                    .table(ObItem::Table)
                    .col(ObItem::ChainId)
                    .col(ObItem::CollectionAddress)
                    .col(ObItem::TokenId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // External metadata, best-effort backfill.
        manager
            .create_table(
                Table::create()
                    .table(ObItemExternal::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObItemExternal::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::CollectionAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::TokenId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::MetaDataUri)
                            .string_len(512)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::ImageUri)
                            .string_len(512)
                            .null(),
                    )
                    .col(ColumnDef::new(ObItemExternal::OssUri).string_len(512).null())
                    .col(
                        ColumnDef::new(ObItemExternal::IsUploadedOss)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::UploadStatus)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::CreateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObItemExternal::UpdateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_ob_item_external_chain_collection_token")
                    .table(ObItemExternal::Table)
                    .col(ObItemExternal::ChainId)
                    .col(ObItemExternal::CollectionAddress)
                    .col(ObItemExternal::TokenId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Collections.
        manager
            .create_table(
                Table::create()
                    .table(ObCollection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObCollection::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::Address)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObCollection::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(ObCollection::Symbol)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::Creator)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::TokenStandard)
                            .integer()
                            .not_null()
                            .default(721),
                    )
                    .col(
                        ColumnDef::new(ObCollection::OwnerAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ObCollection::ItemAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ObCollection::FloorPrice)
                            .decimal_len(78, 0)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::SalePrice)
                            .decimal_len(78, 0)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::VolumeTotal)
                            .decimal_len(78, 0)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ObCollection::ImageUri).string_len(512).null())
                    .col(
                        ColumnDef::new(ObCollection::CreateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollection::UpdateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_ob_collection_chain_address")
                    .table(ObCollection::Table)
                    .col(ObCollection::ChainId)
                    .col(ObCollection::Address)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Floor price time series, trimmed by the retention sweep.
        manager
            .create_table(
                Table::create()
                    .table(ObCollectionFloorPrice::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::CollectionAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::Price)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::EventTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::CreateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ObCollectionFloorPrice::UpdateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_ob_collection_floor_price_point")
                    .table(ObCollectionFloorPrice::Table)
                    .col(ObCollectionFloorPrice::ChainId)
                    .col(ObCollectionFloorPrice::CollectionAddress)
                    .col(ObCollectionFloorPrice::EventTime)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Sync cursors, one row per (chain, index kind).
        manager
            .create_table(
                Table::create()
                    .table(IndexedStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndexedStatus::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexedStatus::IndexType)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexedStatus::LastIndexedBlock)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(IndexedStatus::LastIndexedTime)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(IndexedStatus::ChainId)
                            .col(IndexedStatus::IndexType),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IndexedStatus::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ObCollectionFloorPrice::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ObCollection::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ObItemExternal::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ObItem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ObActivity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ObOrder::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ObOrder {
    Table,
    Id,
    ChainId,
    OrderId,
    CollectionAddress,
    TokenId,
    MarketplaceId,
    OrderType,
    OrderStatus,
    Price,
    CurrencyAddress,
    Maker,
    Taker,
    QuantityRemaining,
    Size,
    Salt,
    EventTime,
    ExpireTime,
}

#[derive(DeriveIden)]
enum ObActivity {
    Table,
    Id,
    ChainId,
    ActivityType,
    Maker,
    Taker,
    MarketplaceId,
    CollectionAddress,
    TokenId,
    CurrencyAddress,
    Price,
    BlockNumber,
    TxHash,
    LogIndex,
    EventTime,
}

#[derive(DeriveIden)]
enum ObItem {
    Table,
    Id,
    ChainId,
    CollectionAddress,
    TokenId,
    Name,
    Owner,
    Supply,
    ListPrice,
    ListTime,
    SalePrice,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum ObItemExternal {
    Table,
    Id,
    ChainId,
    CollectionAddress,
    TokenId,
    MetaDataUri,
    ImageUri,
    OssUri,
    IsUploadedOss,
    UploadStatus,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum ObCollection {
    Table,
    Id,
    ChainId,
    Address,
    Name,
    Symbol,
    Creator,
    TokenStandard,
    OwnerAmount,
    ItemAmount,
    FloorPrice,
    SalePrice,
    VolumeTotal,
    ImageUri,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum ObCollectionFloorPrice {
    Table,
    Id,
    ChainId,
    CollectionAddress,
    Price,
    EventTime,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum IndexedStatus {
    Table,
    ChainId,
    IndexType,
    LastIndexedBlock,
    LastIndexedTime,
}
