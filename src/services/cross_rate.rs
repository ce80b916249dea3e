//! Implied USD/MMK rate derived from two independently sourced 24K gold
//! benchmarks: the world price (USD per troy ounce) and the domestic price
//! (MMK per kyat tha), bridged through fixed physical weight constants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use std::collections::HashMap;

use crate::entities::gold_cross_rates;
use crate::scrapers::GoldHistoryPoint;

pub const TROY_OUNCE_GRAMS: f64 = 31.1035;
pub const KYAT_THA_GRAMS: f64 = 16.329_325_32;

/// Implied MMK-per-USD rate from matching-purity benchmark values. `None`
/// when either input, or the intermediate USD-per-kyat-tha price, is not a
/// positive number.
pub fn implied_usd_mmk(world_usd_per_oz: f64, domestic_mmk_per_kyat_tha: f64) -> Option<f64> {
    if world_usd_per_oz <= 0.0 || domestic_mmk_per_kyat_tha <= 0.0 {
        return None;
    }

    let usd_per_gram = world_usd_per_oz / TROY_OUNCE_GRAMS;
    let usd_per_kyat_tha = usd_per_gram * KYAT_THA_GRAMS;
    if usd_per_kyat_tha <= 0.0 {
        return None;
    }

    Some(domestic_mmk_per_kyat_tha / usd_per_kyat_tha)
}

/// One derived cross-rate row: the world benchmark OHLC alongside the
/// implied rate computed per component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossRatePoint {
    pub ts: DateTime<Utc>,
    pub xau_open: f64,
    pub xau_high: f64,
    pub xau_low: f64,
    pub xau_close: f64,
    pub fx_open: f64,
    pub fx_high: f64,
    pub fx_low: f64,
    pub fx_close: f64,
}

impl CrossRatePoint {
    /// Point-in-time derivation from a single pair of spot values; the OHLC
    /// components collapse to the one observed value.
    pub fn from_spot(
        ts: DateTime<Utc>,
        world_usd_per_oz: f64,
        domestic_mmk_per_kyat_tha: f64,
    ) -> Option<Self> {
        let rate = implied_usd_mmk(world_usd_per_oz, domestic_mmk_per_kyat_tha)?;
        Some(Self {
            ts,
            xau_open: world_usd_per_oz,
            xau_high: world_usd_per_oz,
            xau_low: world_usd_per_oz,
            xau_close: world_usd_per_oz,
            fx_open: rate,
            fx_high: rate,
            fx_low: rate,
            fx_close: rate,
        })
    }

    pub fn into_active_model(
        self,
    ) -> Result<gold_cross_rates::ActiveModel, Box<dyn std::error::Error + Send + Sync>> {
        let decimal = |v: f64| Decimal::from_f64_retain(v).ok_or("invalid cross rate value");

        Ok(gold_cross_rates::ActiveModel {
            ts: Set(self.ts.into()),
            xau_usd_oz_open: Set(decimal(self.xau_open)?),
            xau_usd_oz_high: Set(decimal(self.xau_high)?),
            xau_usd_oz_low: Set(decimal(self.xau_low)?),
            xau_usd_oz_close: Set(decimal(self.xau_close)?),
            fx_usd_mmk_open: Set(decimal(self.fx_open)?),
            fx_usd_mmk_high: Set(decimal(self.fx_high)?),
            fx_usd_mmk_low: Set(decimal(self.fx_low)?),
            fx_usd_mmk_close: Set(decimal(self.fx_close)?),
            ..Default::default()
        })
    }
}

/// Pair same-date points from the two benchmark series and derive the
/// implied rate per OHLC component. Dates present in only one series, and
/// rows where any component fails to derive, are dropped.
pub fn derive_cross_rate_history(
    world: &[GoldHistoryPoint],
    domestic: &[GoldHistoryPoint],
) -> Vec<CrossRatePoint> {
    let world_by_date: HashMap<_, _> = world.iter().map(|p| (p.date, p)).collect();

    domestic
        .iter()
        .filter_map(|dom| {
            let w = world_by_date.get(&dom.date)?;
            Some(CrossRatePoint {
                ts: crate::scrapers::dates::midnight_utc(dom.date),
                xau_open: w.open,
                xau_high: w.high,
                xau_low: w.low,
                xau_close: w.close,
                fx_open: implied_usd_mmk(w.open, dom.open)?,
                fx_high: implied_usd_mmk(w.high, dom.high)?,
                fx_low: implied_usd_mmk(w.low, dom.low)?,
                fx_close: implied_usd_mmk(w.close, dom.close)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flat_point(date: NaiveDate, value: f64) -> GoldHistoryPoint {
        GoldHistoryPoint {
            date,
            open: value,
            high: value,
            low: value,
            close: value,
        }
    }

    #[test]
    fn test_implied_usd_mmk_formula() {
        let rate = implied_usd_mmk(2000.0, 1_050_000.0).unwrap();
        let expected = 1_050_000.0 / ((2000.0 / 31.1035) * 16.32932532);
        assert!(rate > 0.0);
        assert!((rate - expected).abs() < 1e-9);
    }

    #[test]
    fn test_implied_usd_mmk_rejects_non_positive_inputs() {
        assert_eq!(implied_usd_mmk(0.0, 1_050_000.0), None);
        assert_eq!(implied_usd_mmk(-2000.0, 1_050_000.0), None);
        assert_eq!(implied_usd_mmk(2000.0, 0.0), None);
        assert_eq!(implied_usd_mmk(2000.0, -1.0), None);
    }

    #[test]
    fn test_derive_cross_rate_history_pairs_by_date() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();

        let world = vec![flat_point(d1, 2000.0), flat_point(d2, 2010.0)];
        let domestic = vec![
            flat_point(d1, 1_050_000.0),
            flat_point(d2, 1_060_000.0),
            flat_point(d3, 1_070_000.0),
        ];

        let points = derive_cross_rate_history(&world, &domestic);
        assert_eq!(points.len(), 2, "unpaired dates are dropped");
        assert_eq!(
            points[0].fx_open,
            implied_usd_mmk(2000.0, 1_050_000.0).unwrap()
        );
        assert_eq!(points[1].xau_close, 2010.0);
    }

    #[test]
    fn test_derive_cross_rate_history_drops_rows_with_bad_components() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        let mut world = flat_point(d1, 2000.0);
        world.low = 0.0;

        let points = derive_cross_rate_history(&[world], &[flat_point(d1, 1_050_000.0)]);
        assert!(points.is_empty());
    }

    #[test]
    fn test_from_spot_collapses_to_flat_components() {
        let ts = Utc::now();
        let point = CrossRatePoint::from_spot(ts, 2000.0, 1_050_000.0).unwrap();
        assert_eq!(point.xau_open, point.xau_close);
        assert_eq!(point.fx_high, point.fx_low);
        assert!(CrossRatePoint::from_spot(ts, 0.0, 1.0).is_none());
    }
}
