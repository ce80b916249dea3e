//! Gold OHLC history backfill for both benchmark markets, plus the derived
//! USD/MMK cross-rate history from the paired 24K series. History rows are
//! append-only: the upsert leaves existing natural keys untouched.

use crate::config::{
    MMK_CODE, MM_GOLD_INSTRUMENTS, MM_GOLD_MARKET_CODE, UNIT_KYAT_THA, UNIT_OUNCE, USD_CODE,
    WORLD_GOLD_INSTRUMENTS, WORLD_GOLD_MARKET_CODE,
};
use crate::scrapers::dates::midnight_utc;
use crate::scrapers::gold::fetch_gold_history;
use crate::scrapers::{GoldCurrency, GoldHistoryPoint};
use crate::services::cross_rate::derive_cross_rate_history;
use crate::services::persist::{upsert_cross_rates, upsert_history_rows};
use crate::services::price_change::{PriceRow, PriceType};
use crate::AppState;

use super::gold_spot::parse_karat;

pub const SOURCE: &str = "HELLOLINKER_GOLD_HISTORY";

fn ohlc_rows(
    point: &GoldHistoryPoint,
    instrument_id: i32,
    market_id: i32,
    unit_id: i32,
    currency_id: i32,
) -> [PriceRow; 4] {
    let ts = midnight_utc(point.date);
    [
        (PriceType::Open, point.open),
        (PriceType::High, point.high),
        (PriceType::Low, point.low),
        (PriceType::Close, point.close),
    ]
    .map(|(price_type, value)| PriceRow {
        instrument_id,
        market_id,
        location_id: None,
        ts,
        price_type,
        unit_id,
        currency_id,
        value,
        source: SOURCE,
        change_value: None,
        metadata: None,
    })
}

pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("[GOLD_HISTORY] Job start");

    let (world_market_id, mm_market_id, usd_id, mmk_id, unit_oz_id, unit_kyat_id) = tokio::try_join!(
        state.resolver.market_id(&state.db, WORLD_GOLD_MARKET_CODE),
        state.resolver.market_id(&state.db, MM_GOLD_MARKET_CODE),
        state.resolver.currency_id(&state.db, USD_CODE),
        state.resolver.currency_id(&state.db, MMK_CODE),
        state.resolver.unit_id(&state.db, UNIT_OUNCE),
        state.resolver.unit_id(&state.db, UNIT_KYAT_THA),
    )?;

    struct HistoryTask {
        instruments: &'static [&'static str],
        currency: GoldCurrency,
        market_id: i32,
        currency_id: i32,
        unit_id: i32,
    }

    let tasks = [
        HistoryTask {
            instruments: WORLD_GOLD_INSTRUMENTS,
            currency: GoldCurrency::Usd,
            market_id: world_market_id,
            currency_id: usd_id,
            unit_id: unit_oz_id,
        },
        HistoryTask {
            instruments: MM_GOLD_INSTRUMENTS,
            currency: GoldCurrency::Mmk,
            market_id: mm_market_id,
            currency_id: mmk_id,
            unit_id: unit_kyat_id,
        },
    ];

    // The 24K series feed the cross-rate derivation after the loop.
    let mut world_24k: Option<Vec<GoldHistoryPoint>> = None;
    let mut domestic_24k: Option<Vec<GoldHistoryPoint>> = None;

    for task in &tasks {
        for &code in task.instruments {
            let Some(karat) = parse_karat(code) else {
                tracing::error!("[GOLD_HISTORY] Cannot parse karat from {}", code);
                continue;
            };

            let history = match fetch_gold_history(&state.http, karat, task.currency).await {
                Ok(history) => history,
                Err(e) => {
                    tracing::error!("[GOLD_HISTORY] History fetch failed for {}: {}", code, e);
                    continue;
                }
            };

            if history.is_empty() {
                tracing::error!("[GOLD_HISTORY] Empty history for {}", code);
                continue;
            }

            if karat == 24 {
                match task.currency {
                    GoldCurrency::Usd => world_24k = Some(history.clone()),
                    GoldCurrency::Mmk => domestic_24k = Some(history.clone()),
                }
            }

            let Ok(instrument_id) = state.resolver.instrument_id(&state.db, code).await else {
                continue;
            };

            let rows: Vec<PriceRow> = history
                .iter()
                .flat_map(|point| {
                    ohlc_rows(point, instrument_id, task.market_id, task.unit_id, task.currency_id)
                })
                .collect();

            let row_count = rows.len();
            match upsert_history_rows(&state.db, rows, false).await {
                Ok(_) => {
                    tracing::info!("[GOLD_HISTORY] Upserted {} rows for {}", row_count, code)
                }
                Err(e) => {
                    tracing::error!("[GOLD_HISTORY] Upsert error for {}: {}", code, e);
                    continue;
                }
            }
        }
    }

    if let (Some(world), Some(domestic)) = (world_24k, domestic_24k) {
        let points = derive_cross_rate_history(&world, &domestic);
        if points.is_empty() {
            tracing::warn!("[GOLD_HISTORY] No overlapping dates for cross rate derivation");
        } else {
            let point_count = points.len();
            let written = upsert_cross_rates(&state.db, points).await?;
            tracing::info!(
                "[GOLD_HISTORY] Upserted {} of {} cross rate rows",
                written,
                point_count
            );
        }
    }

    Ok(())
}
