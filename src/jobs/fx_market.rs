//! Latest open-market exchange rates: one BUY and one SELL observation per
//! tracked currency, gated through change detection.

use chrono::Utc;

use crate::config::{fx_pair_code, FX_CURRENCIES, FX_MARKET_CODE, MMK_CODE, UNIT_BASE_CURRENCY};
use crate::scrapers::exchange::fetch_fx_latest;
use crate::services::persist::insert_rows;
use crate::services::price_change::{with_change_detection, PriceRow, PriceType};
use crate::AppState;

pub const SOURCE: &str = "HELLOLINKER_FX_HISTORY";

pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("[FX_MARKET] Job start");

    let (market_id, mmk_id, unit_id) = tokio::try_join!(
        state.resolver.market_id(&state.db, FX_MARKET_CODE),
        state.resolver.currency_id(&state.db, MMK_CODE),
        state.resolver.unit_id(&state.db, UNIT_BASE_CURRENCY),
    )?;

    let now = Utc::now();
    let mut rows = Vec::new();

    for currency in FX_CURRENCIES {
        let latest = match fetch_fx_latest(&state.http, currency.slugs).await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                tracing::error!("[FX_MARKET] No data for currency {}", currency.code);
                continue;
            }
            Err(e) => {
                tracing::error!("[FX_MARKET] Fetch failed for {}: {}", currency.code, e);
                continue;
            }
        };

        let Ok(instrument_id) = state
            .resolver
            .instrument_id(&state.db, &fx_pair_code(currency.code))
            .await
        else {
            // Already reported by the resolver; skip this pair only.
            continue;
        };

        for (price_type, value) in [(PriceType::Buy, latest.buy), (PriceType::Sell, latest.sell)] {
            let candidate = PriceRow {
                instrument_id,
                market_id,
                location_id: None,
                ts: now,
                price_type,
                unit_id,
                currency_id: mmk_id,
                value,
                source: SOURCE,
                change_value: None,
                metadata: None,
            };

            if let Some(row) = with_change_detection(&state.db, candidate).await {
                rows.push(row);
            }
        }
    }

    if rows.is_empty() {
        tracing::info!("[FX_MARKET] No rows to insert");
        return Ok(());
    }

    let inserted = insert_rows(&state.db, rows).await?;
    tracing::info!("[FX_MARKET] Inserted {} rows", inserted);
    Ok(())
}
