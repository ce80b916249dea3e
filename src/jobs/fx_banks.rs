//! Latest bank counter rates. One page serves every institution; each
//! bank's rows are gated and inserted as an independent batch so a failure
//! at one bank does not abort the others.

use chrono::Utc;

use crate::config::{fx_pair_code, BANK_MARKET_CODES, MMK_CODE, UNIT_BASE_CURRENCY};
use crate::scrapers::bank::fetch_bank_rates;
use crate::services::persist::insert_rows;
use crate::services::price_change::{with_change_detection, PriceRow, PriceType};
use crate::AppState;

pub const SOURCE: &str = "HELLOLINKER_BANK_SCRAPE";

pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("[FX_BANK] Job start");

    let (mmk_id, unit_id) = tokio::try_join!(
        state.resolver.currency_id(&state.db, MMK_CODE),
        state.resolver.unit_id(&state.db, UNIT_BASE_CURRENCY),
    )?;

    let bank_data = fetch_bank_rates(&state.http).await?;
    let now = Utc::now();

    for &bank_code in BANK_MARKET_CODES {
        let Ok(market_id) = state.resolver.market_id(&state.db, bank_code).await else {
            continue;
        };

        let Some(rates) = bank_data.get(bank_code) else {
            tracing::error!("[FX_BANK] No data for bank {}", bank_code);
            continue;
        };

        let mut rows = Vec::new();

        for (currency, rate) in rates {
            let Ok(instrument_id) = state
                .resolver
                .instrument_id(&state.db, &fx_pair_code(currency))
                .await
            else {
                continue;
            };

            let quotes = [
                (PriceType::Buy, rate.buy),
                (PriceType::Sell, rate.sell),
            ];
            for (price_type, value) in quotes {
                let Some(value) = value else { continue };

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
            tracing::info!("[FX_BANK] No rows for bank {}", bank_code);
            continue;
        }

        let row_count = rows.len();
        match insert_rows(&state.db, rows).await {
            Ok(_) => {
                tracing::info!("[FX_BANK] Inserted {} rows for bank {}", row_count, bank_code)
            }
            Err(e) => {
                tracing::error!("[FX_BANK] Insert error for bank {}: {}", bank_code, e);
                continue;
            }
        }
    }

    Ok(())
}
