//! SeaORM entity for normalized price observations.
//!
//! `(instrument_id, market_id, location_id, ts, price_type)` is the natural
//! key; the backing table carries a unique index over it (NULLS NOT
//! DISTINCT, so global rows with no location participate in uniqueness).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instrument_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub instrument_id: i32,
    pub market_id: i32,
    /// Absent for globally quoted instruments.
    pub location_id: Option<i32>,
    pub ts: DateTimeWithTimeZone,
    /// BUY | SELL | MID | OPEN | HIGH | LOW | CLOSE | RETAIL
    pub price_type: String,
    pub unit_id: i32,
    pub currency_id: i32,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub value: Decimal,
    /// Provenance tag of the extraction pipeline that produced the row.
    pub source: String,
    /// Signed delta versus the previous observation for the same
    /// `(instrument, market, location, price_type)` identity.
    #[sea_orm(column_type = "Decimal(Some((20, 6)))", nullable)]
    pub change_value: Option<Decimal>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
