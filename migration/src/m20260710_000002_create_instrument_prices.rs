use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InstrumentPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstrumentPrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstrumentPrices::InstrumentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstrumentPrices::MarketId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstrumentPrices::LocationId).integer().null())
                    .col(
                        ColumnDef::new(InstrumentPrices::Ts)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstrumentPrices::PriceType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstrumentPrices::UnitId).integer().not_null())
                    .col(
                        ColumnDef::new(InstrumentPrices::CurrencyId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstrumentPrices::Value)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstrumentPrices::Source)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstrumentPrices::ChangeValue)
                            .decimal_len(20, 6)
                            .null(),
                    )
                    .col(ColumnDef::new(InstrumentPrices::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(InstrumentPrices::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key. NULLS NOT DISTINCT so rows without a location (global
        // instruments) still collide, which the history upserts rely on.
        manager
            .create_index(
                Index::create()
                    .name("uq_instrument_prices_natural_key")
                    .table(InstrumentPrices::Table)
                    .col(InstrumentPrices::InstrumentId)
                    .col(InstrumentPrices::MarketId)
                    .col(InstrumentPrices::LocationId)
                    .col(InstrumentPrices::Ts)
                    .col(InstrumentPrices::PriceType)
                    .unique()
                    .nulls_not_distinct()
                    .to_owned(),
            )
            .await?;

        // Latest-value lookups by identity key: (instrument, market,
        // location, price_type) ordered by ts DESC.
        manager
            .create_index(
                Index::create()
                    .name("idx_instrument_prices_identity_ts")
                    .table(InstrumentPrices::Table)
                    .col(InstrumentPrices::InstrumentId)
                    .col(InstrumentPrices::MarketId)
                    .col(InstrumentPrices::LocationId)
                    .col(InstrumentPrices::PriceType)
                    .col((InstrumentPrices::Ts, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstrumentPrices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InstrumentPrices {
    Table,
    Id,
    InstrumentId,
    MarketId,
    LocationId,
    Ts,
    PriceType,
    UnitId,
    CurrencyId,
    Value,
    Source,
    ChangeValue,
    Metadata,
    CreatedAt,
}
