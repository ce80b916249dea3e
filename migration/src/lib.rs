pub use sea_orm_migration::prelude::*;

mod m20260710_000001_create_reference_tables;
mod m20260710_000002_create_instrument_prices;
mod m20260711_000001_create_gold_cross_rates;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260710_000001_create_reference_tables::Migration),
            Box::new(m20260710_000002_create_instrument_prices::Migration),
            Box::new(m20260711_000001_create_gold_cross_rates::Migration),
        ]
    }
}
