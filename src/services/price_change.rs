//! Change detection for "latest" snapshot writes.
//!
//! A candidate observation is compared to the most recent stored row for the
//! same identity key `(instrument, market, location, price_type)`. Exact
//! repeats are suppressed; changed values carry the signed delta. A failed
//! lookup fails open: losing one delta annotation is better than silently
//! dropping data whenever the latest view is unavailable.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};

use crate::entities::{instrument_prices, prelude::*};

pub const VALUE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceType {
    Buy,
    Sell,
    Mid,
    Open,
    High,
    Low,
    Close,
    Retail,
}

impl PriceType {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceType::Buy => "BUY",
            PriceType::Sell => "SELL",
            PriceType::Mid => "MID",
            PriceType::Open => "OPEN",
            PriceType::High => "HIGH",
            PriceType::Low => "LOW",
            PriceType::Close => "CLOSE",
            PriceType::Retail => "RETAIL",
        }
    }
}

/// A normalized observation on its way to the store.
#[derive(Debug, Clone)]
pub struct PriceRow {
    pub instrument_id: i32,
    pub market_id: i32,
    pub location_id: Option<i32>,
    pub ts: DateTime<Utc>,
    pub price_type: PriceType,
    pub unit_id: i32,
    pub currency_id: i32,
    pub value: f64,
    pub source: &'static str,
    pub change_value: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

impl PriceRow {
    pub fn into_active_model(
        self,
    ) -> Result<instrument_prices::ActiveModel, Box<dyn std::error::Error + Send + Sync>> {
        let change_value = match self.change_value {
            Some(delta) => {
                Some(Decimal::from_f64_retain(delta).ok_or("invalid change value")?)
            }
            None => None,
        };

        Ok(instrument_prices::ActiveModel {
            instrument_id: Set(self.instrument_id),
            market_id: Set(self.market_id),
            location_id: Set(self.location_id),
            ts: Set(self.ts.into()),
            price_type: Set(self.price_type.as_str().to_string()),
            unit_id: Set(self.unit_id),
            currency_id: Set(self.currency_id),
            value: Set(Decimal::from_f64_retain(self.value).ok_or("invalid price value")?),
            source: Set(self.source.to_string()),
            change_value: Set(change_value),
            metadata: Set(self.metadata),
            ..Default::default()
        })
    }
}

pub fn is_same_value(a: f64, b: f64) -> bool {
    (a - b).abs() <= VALUE_EPSILON
}

/// Gate a candidate against the most recent stored observation for its
/// identity key. Returns `None` when the candidate is a redundant repeat.
pub async fn with_change_detection(db: &DatabaseConnection, row: PriceRow) -> Option<PriceRow> {
    let mut query = InstrumentPrices::find()
        .filter(instrument_prices::Column::InstrumentId.eq(row.instrument_id))
        .filter(instrument_prices::Column::MarketId.eq(row.market_id))
        .filter(instrument_prices::Column::PriceType.eq(row.price_type.as_str()));

    query = match row.location_id {
        Some(location_id) => {
            query.filter(instrument_prices::Column::LocationId.eq(location_id))
        }
        None => query.filter(instrument_prices::Column::LocationId.is_null()),
    };

    let previous = query
        .order_by(instrument_prices::Column::Ts, Order::Desc)
        .limit(1)
        .one(db)
        .await;

    let previous = match previous {
        Ok(previous) => previous,
        Err(e) => {
            tracing::warn!("Latest price lookup failed, passing candidate through: {}", e);
            return Some(row);
        }
    };

    let Some(prev_value) = previous.and_then(|p| p.value.to_f64()) else {
        return Some(row);
    };

    if is_same_value(prev_value, row.value) {
        tracing::debug!(
            "Suppressing unchanged value {} for instrument {} ({})",
            row.value,
            row.instrument_id,
            row.price_type.as_str()
        );
        return None;
    }

    Some(PriceRow {
        change_value: Some(row.value - prev_value),
        ..row
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

    fn candidate(value: f64) -> PriceRow {
        PriceRow {
            instrument_id: 1,
            market_id: 2,
            location_id: None,
            ts: Utc::now(),
            price_type: PriceType::Buy,
            unit_id: 3,
            currency_id: 4,
            value,
            source: "TEST",
            change_value: None,
            metadata: None,
        }
    }

    fn stored(value: Decimal) -> instrument_prices::Model {
        instrument_prices::Model {
            id: 10,
            instrument_id: 1,
            market_id: 2,
            location_id: None,
            ts: Utc::now().into(),
            price_type: "BUY".to_string(),
            unit_id: 3,
            currency_id: 4,
            value,
            source: "TEST".to_string(),
            change_value: None,
            metadata: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_equal_value_is_suppressed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored(dec!(4400))]])
            .into_connection();

        assert!(with_change_detection(&db, candidate(4400.0)).await.is_none());
    }

    #[tokio::test]
    async fn test_within_epsilon_is_suppressed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored(dec!(4400))]])
            .into_connection();

        let gated = with_change_detection(&db, candidate(4400.0 + 1e-7)).await;
        assert!(gated.is_none());
    }

    #[tokio::test]
    async fn test_changed_value_carries_signed_delta() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored(dec!(4400))]])
            .into_connection();

        let gated = with_change_detection(&db, candidate(4380.5)).await.unwrap();
        assert_eq!(gated.change_value, Some(4380.5 - 4400.0));
    }

    #[tokio::test]
    async fn test_no_previous_row_passes_through() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<instrument_prices::Model>::new()])
            .into_connection();

        let gated = with_change_detection(&db, candidate(4400.0)).await.unwrap();
        assert_eq!(gated.change_value, None);
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_open() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "latest view unavailable".to_string(),
            ))])
            .into_connection();

        let gated = with_change_detection(&db, candidate(4400.0)).await.unwrap();
        assert_eq!(gated.value, 4400.0);
        assert_eq!(gated.change_value, None);
    }
}
