//! Batch persistence. Latest snapshot rows are plain inserts (duplicates are
//! prevented upstream by the change-detection gate); history backfills
//! upsert on the natural key so re-running a job is idempotent.

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::entities::{gold_cross_rates, instrument_prices, prelude::*};
use crate::services::cross_rate::CrossRatePoint;
use crate::services::price_change::PriceRow;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn natural_key_columns() -> [instrument_prices::Column; 5] {
    [
        instrument_prices::Column::InstrumentId,
        instrument_prices::Column::MarketId,
        instrument_prices::Column::LocationId,
        instrument_prices::Column::Ts,
        instrument_prices::Column::PriceType,
    ]
}

fn into_models(
    rows: Vec<PriceRow>,
) -> Result<Vec<instrument_prices::ActiveModel>, BoxError> {
    rows.into_iter().map(PriceRow::into_active_model).collect()
}

/// Insert gated latest rows. Returns the number of rows written.
pub async fn insert_rows(db: &DatabaseConnection, rows: Vec<PriceRow>) -> Result<u64, BoxError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let inserted = InstrumentPrices::insert_many(into_models(rows)?)
        .exec_without_returning(db)
        .await?;

    Ok(inserted)
}

/// Upsert history rows on the natural key. `update_on_conflict` controls
/// whether an existing row's value is refreshed (exchange history, where the
/// source revises recent days) or left alone (gold history, append-only).
pub async fn upsert_history_rows(
    db: &DatabaseConnection,
    rows: Vec<PriceRow>,
    update_on_conflict: bool,
) -> Result<u64, BoxError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut conflict = OnConflict::columns(natural_key_columns());
    if update_on_conflict {
        conflict.update_columns([
            instrument_prices::Column::Value,
            instrument_prices::Column::Source,
        ]);
    } else {
        conflict.do_nothing();
    }

    let written = InstrumentPrices::insert_many(into_models(rows)?)
        .on_conflict(conflict.to_owned())
        .exec_without_returning(db)
        .await?;

    Ok(written)
}

/// Upsert derived cross-rate rows keyed by timestamp; existing timestamps
/// are never mutated.
pub async fn upsert_cross_rates(
    db: &DatabaseConnection,
    points: Vec<CrossRatePoint>,
) -> Result<u64, BoxError> {
    if points.is_empty() {
        return Ok(0);
    }

    let models = points
        .into_iter()
        .map(CrossRatePoint::into_active_model)
        .collect::<Result<Vec<_>, _>>()?;

    let written = GoldCrossRates::insert_many(models)
        .on_conflict(
            OnConflict::column(gold_cross_rates::Column::Ts)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(written)
}
