//! Latest retail fuel prices per tracked location. The row timestamp is the
//! page's own "Last Updated" stamp when it parses, else the fetch time; the
//! raw stamp and filter parameters ride along as metadata.

use chrono::Utc;
use serde_json::json;

use crate::config::{FUEL_INSTRUMENTS, FUEL_MARKET_CODE, MMK_CODE, UNIT_LITRE};
use crate::scrapers::fuel::{
    fetch_fuel_snapshot, fetch_location_filters, location_slug_from_filter, map_fuel_instrument,
};
use crate::services::persist::insert_rows;
use crate::services::price_change::{with_change_detection, PriceRow, PriceType};
use crate::AppState;

pub const SOURCE: &str = "HELLOLINKER_FUEL_SCRAPE";

pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("[FUEL] Job start");

    let (market_id, mmk_id, unit_id) = tokio::try_join!(
        state.resolver.market_id(&state.db, FUEL_MARKET_CODE),
        state.resolver.currency_id(&state.db, MMK_CODE),
        state.resolver.unit_id(&state.db, UNIT_LITRE),
    )?;

    let filters = fetch_location_filters(&state.http).await?;
    if filters.is_empty() {
        tracing::error!("[FUEL] No location filters found");
        return Ok(());
    }

    for filter_city in &filters {
        let snapshot = match fetch_fuel_snapshot(&state.http, filter_city).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("[FUEL] Fetch failed for {}: {}", filter_city, e);
                continue;
            }
        };

        let ts = snapshot.last_updated.unwrap_or_else(Utc::now);

        let slug = location_slug_from_filter(filter_city);
        let Ok(location_id) = state.resolver.location_id(&state.db, &slug).await else {
            // Untracked township; the resolver reported it once.
            continue;
        };

        let mut rows = Vec::new();

        for (grade, price) in &snapshot.prices {
            let instrument_code = match map_fuel_instrument(grade) {
                Some(code) if FUEL_INSTRUMENTS.contains(&code) => code,
                _ => continue,
            };

            let Ok(instrument_id) =
                state.resolver.instrument_id(&state.db, instrument_code).await
            else {
                continue;
            };

            let candidate = PriceRow {
                instrument_id,
                market_id,
                location_id: Some(location_id),
                ts,
                price_type: PriceType::Retail,
                unit_id,
                currency_id: mmk_id,
                value: *price,
                source: SOURCE,
                change_value: None,
                metadata: Some(json!({
                    "filterCity": snapshot.filter_city,
                    "region": snapshot.region,
                    "township": snapshot.township,
                    "source_last_updated": snapshot.last_updated_text,
                })),
            };

            if let Some(row) = with_change_detection(&state.db, candidate).await {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            continue;
        }

        let row_count = rows.len();
        match insert_rows(&state.db, rows).await {
            Ok(_) => tracing::info!("[FUEL] Inserted {} rows for {}", row_count, filter_city),
            Err(e) => tracing::error!("[FUEL] Insert error for {}: {}", filter_city, e),
        }
    }

    Ok(())
}
