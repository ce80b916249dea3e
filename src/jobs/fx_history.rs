//! Exchange-rate history backfill. The source revises recent days, so the
//! upsert refreshes values on conflict instead of skipping them.

use crate::config::{fx_pair_code, FX_CURRENCIES, FX_MARKET_CODE, MMK_CODE, UNIT_BASE_CURRENCY};
use crate::scrapers::dates::midnight_utc;
use crate::scrapers::exchange::fetch_fx_history;
use crate::services::persist::upsert_history_rows;
use crate::services::price_change::{PriceRow, PriceType};
use crate::AppState;

use super::fx_market::SOURCE;

pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("[FX_HISTORY] Job start");

    let (market_id, mmk_id, unit_id) = tokio::try_join!(
        state.resolver.market_id(&state.db, FX_MARKET_CODE),
        state.resolver.currency_id(&state.db, MMK_CODE),
        state.resolver.unit_id(&state.db, UNIT_BASE_CURRENCY),
    )?;

    for currency in FX_CURRENCIES {
        let history = match fetch_fx_history(&state.http, currency.slugs).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("[FX_HISTORY] Fetch failed for {}: {}", currency.code, e);
                continue;
            }
        };

        if history.is_empty() {
            tracing::error!("[FX_HISTORY] No history rows for {}", currency.code);
            continue;
        }

        let Ok(instrument_id) = state
            .resolver
            .instrument_id(&state.db, &fx_pair_code(currency.code))
            .await
        else {
            continue;
        };

        let rows: Vec<PriceRow> = history
            .iter()
            .flat_map(|point| {
                let ts = midnight_utc(point.date);
                [(PriceType::Buy, point.buy), (PriceType::Sell, point.sell)].map(
                    |(price_type, value)| PriceRow {
                        instrument_id,
                        market_id,
                        location_id: None,
                        ts,
                        price_type,
                        unit_id,
                        currency_id: mmk_id,
                        value,
                        source: SOURCE,
                        change_value: None,
                        metadata: None,
                    },
                )
            })
            .collect();

        let row_count = rows.len();
        match upsert_history_rows(&state.db, rows, true).await {
            Ok(_) => tracing::info!(
                "[FX_HISTORY] Upserted {} rows for {}",
                row_count,
                currency.code
            ),
            Err(e) => {
                tracing::error!("[FX_HISTORY] Upsert error for {}: {}", currency.code, e);
                continue;
            }
        }
    }

    Ok(())
}
