pub mod bank;
pub mod dates;
pub mod exchange;
pub mod fetch;
pub mod fuel;
pub mod gold;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("fetch failed: {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("no source url produced a page")]
    NoAlternates,

    #[error("embedded payload not found: {0}")]
    MissingPayload(&'static str),

    #[error("payload decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One day of a buy/sell exchange-rate series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxHistoryPoint {
    pub date: NaiveDate,
    pub buy: f64,
    pub sell: f64,
}

/// Buy/sell quote for one currency at one institution. Either side may be
/// missing on the source page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BankRate {
    pub buy: Option<f64>,
    pub sell: Option<f64>,
}

/// currency code -> rate
pub type BankRates = HashMap<String, BankRate>;
/// bank code -> per-currency rates
pub type BankRatesByCode = HashMap<String, BankRates>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldCurrency {
    Usd,
    Mmk,
}

impl GoldCurrency {
    pub fn path_segment(self) -> &'static str {
        match self {
            GoldCurrency::Usd => "USD",
            GoldCurrency::Mmk => "MMK",
        }
    }
}

/// Spot gold card prices keyed by karat, split into the ounce-denominated
/// world market (USD) and the kyat-tha-denominated domestic market (MMK).
#[derive(Debug, Clone, Default)]
pub struct GoldSpotPrices {
    pub world: HashMap<u32, f64>,
    pub domestic: HashMap<u32, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldHistoryPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Fuel card prices for one location filter, plus the page's advisory
/// "Last Updated" stamp (raw text and parsed instant).
#[derive(Debug, Clone)]
pub struct FuelSnapshot {
    pub filter_city: String,
    pub region: String,
    pub township: String,
    pub last_updated_text: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub prices: Vec<(String, f64)>,
}

/// Parse a displayed number, stripping thousands separators.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse().ok()
}

/// Chart payloads serve numbers either as JSON numbers or as quoted strings.
pub(crate) fn json_number(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(parse_number))
}

/// Embedded chart data arrives as a JS string literal holding escaped JSON:
/// `JSON.parse("[\"29 Dec\",...]")`. Unescape via a JSON string round trip,
/// then parse the payload itself.
pub(crate) fn decode_embedded_json<T: DeserializeOwned>(escaped: &str) -> Result<T, ScrapeError> {
    let unescaped: String = serde_json::from_str(&format!("\"{escaped}\""))?;
    Ok(serde_json::from_str(&unescaped)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_strips_separators() {
        assert_eq!(parse_number("1,050,000"), Some(1_050_000.0));
        assert_eq!(parse_number(" 4520.5 "), Some(4520.5));
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn test_json_number_accepts_both_encodings() {
        assert_eq!(json_number(&serde_json::json!(4520.5)), Some(4520.5));
        assert_eq!(json_number(&serde_json::json!("4,520.5")), Some(4520.5));
        assert_eq!(json_number(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_decode_embedded_json() {
        let labels: Vec<String> =
            decode_embedded_json(r#"[\"29 Dec\",\"02 Jan\"]"#).unwrap();
        assert_eq!(labels, vec!["29 Dec", "02 Jan"]);
    }
}
