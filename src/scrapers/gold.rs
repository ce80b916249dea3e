//! Gold price extraction. The landing page renders one anchor card per
//! karat/currency pair, linking to a history page whose chart data is
//! embedded as two JSON-escaped script payloads: a line series keyed by
//! dated labels and a candlestick array keyed by the same dates.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::HashMap;

use super::{
    decode_embedded_json, json_number, parse_number, GoldCurrency, GoldHistoryPoint,
    GoldSpotPrices, ScrapeError,
};
use crate::config::HELLOLINKER_BASE_URL;

lazy_static! {
    static ref CARD_SEL: Selector =
        Selector::parse("a[href*='/rates/gold-price/k_']").unwrap();
    static ref PRICE_SEL: Selector = Selector::parse("span[class*='text-base']").unwrap();
    static ref LINE_RE: Regex =
        Regex::new(r#"const goldLineChartData = JSON\.parse\("([^"]+)"\);"#).unwrap();
    static ref CANDLE_RE: Regex =
        Regex::new(r#"const candleChartData = JSON\.parse\("([^"]+)"\);"#).unwrap();
}

#[derive(Debug, Deserialize)]
struct LineChartData {
    labels: Vec<String>,
    values: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CandlePoint {
    x: String,
    #[serde(default)]
    y: Vec<serde_json::Value>,
}

fn parse_card_href(href: &str) -> Option<(u32, GoldCurrency)> {
    let rest = href.split("/rates/gold-price/k_").nth(1)?;
    let mut parts = rest.split('/');
    let karat = parts.next()?.parse().ok()?;
    let currency = match parts.next()?.split('?').next()? {
        "USD" => GoldCurrency::Usd,
        "MMK" => GoldCurrency::Mmk,
        _ => return None,
    };
    Some((karat, currency))
}

/// Pure extraction of the spot cards, split by quoting currency into the
/// world and domestic maps keyed by karat.
pub fn extract_gold_spot(html: &str) -> GoldSpotPrices {
    let document = Html::parse_document(html);
    let mut prices = GoldSpotPrices::default();

    for card in document.select(&CARD_SEL) {
        let Some((karat, currency)) = card.value().attr("href").and_then(parse_card_href)
        else {
            continue;
        };
        let Some(price) = card
            .select(&PRICE_SEL)
            .next()
            .and_then(|span| parse_number(&span.text().collect::<String>()))
        else {
            continue;
        };

        match currency {
            GoldCurrency::Usd => prices.world.insert(karat, price),
            GoldCurrency::Mmk => prices.domestic.insert(karat, price),
        };
    }

    prices
}

/// Pure extraction of one karat's history page. Both chart payloads must be
/// present; the candlestick value is preferred per label date, and a label
/// with only a line value degrades to a flat OHLC point. Labels that fail to
/// parse as dates, and entries with non-numeric values, are skipped.
pub fn extract_gold_history(html: &str) -> Result<Vec<GoldHistoryPoint>, ScrapeError> {
    let line_caps = LINE_RE
        .captures(html)
        .ok_or(ScrapeError::MissingPayload("goldLineChartData"))?;
    let candle_caps = CANDLE_RE
        .captures(html)
        .ok_or(ScrapeError::MissingPayload("candleChartData"))?;

    let line: LineChartData = decode_embedded_json(&line_caps[1])?;
    let candles: Vec<CandlePoint> = decode_embedded_json(&candle_caps[1])?;

    let mut candle_by_date: HashMap<NaiveDate, GoldHistoryPoint> = HashMap::new();
    for candle in candles {
        let Ok(date) = NaiveDate::parse_from_str(&candle.x, "%Y-%m-%d") else {
            continue;
        };
        let components: Vec<f64> = candle.y.iter().take(4).filter_map(json_number).collect();
        if components.len() < 4 {
            continue;
        }
        candle_by_date.insert(
            date,
            GoldHistoryPoint {
                date,
                open: components[0],
                high: components[1],
                low: components[2],
                close: components[3],
            },
        );
    }

    let mut out = Vec::new();
    for (i, label) in line.labels.iter().enumerate() {
        let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") else {
            continue;
        };
        let Some(value) = line.values.get(i).and_then(json_number) else {
            continue;
        };

        out.push(candle_by_date.get(&date).copied().unwrap_or(GoldHistoryPoint {
            date,
            open: value,
            high: value,
            low: value,
            close: value,
        }));
    }

    Ok(out)
}

pub async fn fetch_gold_spot(client: &Client) -> Result<GoldSpotPrices, ScrapeError> {
    let url = format!("{HELLOLINKER_BASE_URL}/rates/gold-price");
    let html = super::fetch::fetch_page(client, &url).await?;
    Ok(extract_gold_spot(&html))
}

pub async fn fetch_gold_history(
    client: &Client,
    karat: u32,
    currency: GoldCurrency,
) -> Result<Vec<GoldHistoryPoint>, ScrapeError> {
    let url = format!(
        "{HELLOLINKER_BASE_URL}/rates/gold-price/k_{karat}/{}",
        currency.path_segment()
    );
    let html = super::fetch::fetch_page(client, &url).await?;
    extract_gold_history(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPOT_PAGE: &str = r#"
        <a href="https://hellolinker.net/rates/gold-price/k_24/USD">
          <span class="text-base font-bold"> 2,000 </span>
          <span class="text-[10px]"> $ </span>
        </a>
        <a href="https://hellolinker.net/rates/gold-price/k_24/MMK">
          <span class="text-base font-bold"> 1,050,000 </span>
          <span class="text-[10px]"> Ks </span>
        </a>
        <a href="https://hellolinker.net/rates/gold-price/k_22/MMK">
          <span class="text-base font-bold"> 960,000 </span>
          <span class="text-[10px]"> Ks </span>
        </a>
        <a href="https://hellolinker.net/rates/gold-price/k_0/XYZ">
          <span class="text-base"> 1 </span>
        </a>
    "#;

    #[test]
    fn test_extract_gold_spot() {
        let prices = extract_gold_spot(SPOT_PAGE);
        assert_eq!(prices.world.get(&24), Some(&2000.0));
        assert_eq!(prices.domestic.get(&24), Some(&1_050_000.0));
        assert_eq!(prices.domestic.get(&22), Some(&960_000.0));
        assert_eq!(prices.world.len(), 1);
        assert_eq!(prices.domestic.len(), 2);
    }

    const HISTORY_PAGE: &str = r#"
        <script>
        const goldLineChartData = JSON.parse("{\"labels\":[\"2026-01-07\",\"2026-01-08\",\"2026-01-09\",\"bad\"],\"values\":[1990,2000,2010,2020]}");
        const candleChartData = JSON.parse("[{\"x\":\"2026-01-07\",\"y\":[1985,1995,1980,1990]},{\"x\":\"2026-01-09\",\"y\":[2005,2015]}]");
        </script>
    "#;

    #[test]
    fn test_extract_gold_history_prefers_candles() {
        let points = extract_gold_history(HISTORY_PAGE).unwrap();
        assert_eq!(points.len(), 3, "unparseable label is skipped");

        assert_eq!(
            points[0],
            GoldHistoryPoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(),
                open: 1985.0,
                high: 1995.0,
                low: 1980.0,
                close: 1990.0,
            }
        );

        // No candle for the 8th: flat point from the line value.
        assert_eq!(
            points[1],
            GoldHistoryPoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
                open: 2000.0,
                high: 2000.0,
                low: 2000.0,
                close: 2000.0,
            }
        );

        // Short candle (two components) is discarded, falls back flat too.
        assert_eq!(points[2].open, 2010.0);
        assert_eq!(points[2].close, 2010.0);
    }

    #[test]
    fn test_extract_gold_history_missing_payload_is_hard_failure() {
        let err = extract_gold_history("<html></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingPayload(_)));
    }

    #[test]
    fn test_parse_card_href() {
        assert_eq!(
            parse_card_href("https://hellolinker.net/rates/gold-price/k_24/USD"),
            Some((24, GoldCurrency::Usd))
        );
        assert_eq!(parse_card_href("/rates/gold-price/k_18/MMK"), Some((18, GoldCurrency::Mmk)));
        assert_eq!(parse_card_href("/rates/other"), None);
    }
}
