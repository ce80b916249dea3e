use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, key) in [
            (RefTable::Markets, RefKey::Code),
            (RefTable::Instruments, RefKey::Code),
            (RefTable::Units, RefKey::Code),
            (RefTable::Currencies, RefKey::Code),
            (RefTable::Locations, RefKey::Slug),
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RefKey::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(key).string_len(64).not_null())
                        .col(ColumnDef::new(RefKey::Name).string_len(255).null())
                        .col(
                            ColumnDef::new(RefKey::CreatedAt)
                                .timestamp_with_time_zone()
                                .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                        )
                        .to_owned(),
                )
                .await?;

            // Lookup index only. Deliberately NOT unique: seed data has been
            // observed to carry duplicate codes, which the resolver handles
            // by taking the lowest id.
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_{}", table.to_string(), key.to_string()))
                        .table(table)
                        .col(key)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            RefTable::Locations,
            RefTable::Currencies,
            RefTable::Units,
            RefTable::Instruments,
            RefTable::Markets,
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden, Clone, Copy)]
enum RefTable {
    Markets,
    Instruments,
    Units,
    Currencies,
    Locations,
}

#[derive(Iden, Clone, Copy)]
enum RefKey {
    Id,
    Code,
    Slug,
    Name,
    CreatedAt,
}
