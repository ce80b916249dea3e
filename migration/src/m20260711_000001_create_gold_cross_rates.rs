use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GoldCrossRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoldCrossRates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GoldCrossRates::Ts)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(decimal(GoldCrossRates::XauUsdOzOpen))
                    .col(decimal(GoldCrossRates::XauUsdOzHigh))
                    .col(decimal(GoldCrossRates::XauUsdOzLow))
                    .col(decimal(GoldCrossRates::XauUsdOzClose))
                    .col(decimal(GoldCrossRates::FxUsdMmkOpen))
                    .col(decimal(GoldCrossRates::FxUsdMmkHigh))
                    .col(decimal(GoldCrossRates::FxUsdMmkLow))
                    .col(decimal(GoldCrossRates::FxUsdMmkClose))
                    .col(
                        ColumnDef::new(GoldCrossRates::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_gold_cross_rates_ts")
                    .table(GoldCrossRates::Table)
                    .col(GoldCrossRates::Ts)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoldCrossRates::Table).to_owned())
            .await
    }
}

fn decimal(col: GoldCrossRates) -> ColumnDef {
    ColumnDef::new(col).decimal_len(20, 6).not_null().take()
}

#[derive(Iden)]
enum GoldCrossRates {
    Table,
    Id,
    Ts,
    XauUsdOzOpen,
    XauUsdOzHigh,
    XauUsdOzLow,
    XauUsdOzClose,
    FxUsdMmkOpen,
    FxUsdMmkHigh,
    FxUsdMmkLow,
    FxUsdMmkClose,
    CreatedAt,
}
