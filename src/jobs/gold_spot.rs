//! Latest gold spot prices for both benchmark markets (world, USD/oz and
//! domestic, MMK/kyat tha), plus the point-in-time implied USD/MMK cross
//! rate from the 24K pair.

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::config::{
    MMK_CODE, MM_GOLD_INSTRUMENTS, MM_GOLD_MARKET_CODE, UNIT_KYAT_THA, UNIT_OUNCE, USD_CODE,
    WORLD_GOLD_INSTRUMENTS, WORLD_GOLD_MARKET_CODE,
};
use crate::scrapers::gold::fetch_gold_spot;
use crate::services::cross_rate::CrossRatePoint;
use crate::services::persist::{insert_rows, upsert_cross_rates};
use crate::services::price_change::{with_change_detection, PriceRow, PriceType};
use crate::AppState;

pub const SOURCE: &str = "HELLOLINKER_GOLD_SCRAPE";

lazy_static! {
    static ref KARAT_RE: Regex = Regex::new(r"(\d+)K").unwrap();
}

pub(super) fn parse_karat(code: &str) -> Option<u32> {
    KARAT_RE.captures(code).and_then(|caps| caps[1].parse().ok())
}

pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("[GOLD_SPOT] Job start");

    let (world_market_id, mm_market_id, usd_id, mmk_id, unit_oz_id, unit_kyat_id) = tokio::try_join!(
        state.resolver.market_id(&state.db, WORLD_GOLD_MARKET_CODE),
        state.resolver.market_id(&state.db, MM_GOLD_MARKET_CODE),
        state.resolver.currency_id(&state.db, USD_CODE),
        state.resolver.currency_id(&state.db, MMK_CODE),
        state.resolver.unit_id(&state.db, UNIT_OUNCE),
        state.resolver.unit_id(&state.db, UNIT_KYAT_THA),
    )?;

    let prices = fetch_gold_spot(&state.http).await?;
    let now = Utc::now();

    struct SpotBatch<'a> {
        instruments: &'a [&'a str],
        prices: &'a HashMap<u32, f64>,
        market_id: i32,
        currency_id: i32,
        unit_id: i32,
    }

    let batches = [
        SpotBatch {
            instruments: WORLD_GOLD_INSTRUMENTS,
            prices: &prices.world,
            market_id: world_market_id,
            currency_id: usd_id,
            unit_id: unit_oz_id,
        },
        SpotBatch {
            instruments: MM_GOLD_INSTRUMENTS,
            prices: &prices.domestic,
            market_id: mm_market_id,
            currency_id: mmk_id,
            unit_id: unit_kyat_id,
        },
    ];

    let mut rows = Vec::new();

    for batch in &batches {
        for &code in batch.instruments {
            let value = parse_karat(code).and_then(|karat| batch.prices.get(&karat).copied());
            let Some(value) = value else {
                tracing::error!("[GOLD_SPOT] No data for instrument {}", code);
                continue;
            };

            let Ok(instrument_id) = state.resolver.instrument_id(&state.db, code).await else {
                continue;
            };

            let candidate = PriceRow {
                instrument_id,
                market_id: batch.market_id,
                location_id: None,
                ts: now,
                price_type: PriceType::Mid,
                unit_id: batch.unit_id,
                currency_id: batch.currency_id,
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
        tracing::info!("[GOLD_SPOT] No rows to insert");
    } else {
        let inserted = insert_rows(&state.db, rows).await?;
        tracing::info!("[GOLD_SPOT] Inserted {} rows", inserted);
    }

    // Implied USD/MMK from the paired 24K benchmarks, when both sides are
    // present on the page.
    if let (Some(&world_24k), Some(&domestic_24k)) =
        (prices.world.get(&24), prices.domestic.get(&24))
    {
        if let Some(point) = CrossRatePoint::from_spot(now, world_24k, domestic_24k) {
            let written = upsert_cross_rates(&state.db, vec![point]).await?;
            tracing::info!("[GOLD_SPOT] Wrote {} cross rate row", written);
        } else {
            tracing::warn!(
                "[GOLD_SPOT] Cross rate not derivable from world={} domestic={}",
                world_24k,
                domestic_24k
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_karat() {
        assert_eq!(parse_karat("GOLD_24K"), Some(24));
        assert_eq!(parse_karat("MM_GOLD_14K"), Some(14));
        assert_eq!(parse_karat("FUEL_DIESEL"), None);
    }
}
