//! SeaORM entity for the implied USD/MMK rate derived from paired 24K gold
//! benchmarks. Append-only, keyed by timestamp.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gold_cross_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ts: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub xau_usd_oz_open: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub xau_usd_oz_high: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub xau_usd_oz_low: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub xau_usd_oz_close: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub fx_usd_mmk_open: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub fx_usd_mmk_high: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub fx_usd_mmk_low: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub fx_usd_mmk_close: Decimal,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
