//! Exchange-rate page extraction. Each currency page embeds its chart data
//! as JSON-escaped arrays inside an inline script: an ordered label sequence
//! plus "Buying" and "Selling" value series, and a date-range picker whose
//! `startDate` anchors year inference for the labels.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;

use super::dates::label_dates;
use super::{decode_embedded_json, json_number, FxHistoryPoint, ScrapeError};
use crate::config::HELLOLINKER_BASE_URL;

lazy_static! {
    static ref LABELS_RE: Regex =
        Regex::new(r#"labels:\s*JSON\.parse\("([^"]+)"\)"#).unwrap();
    static ref BUY_RE: Regex =
        Regex::new(r#"(?s)label:\s*'Buying'.*?data:\s*JSON\.parse\("([^"]+)"\)"#).unwrap();
    static ref SELL_RE: Regex =
        Regex::new(r#"(?s)label:\s*'Selling'.*?data:\s*JSON\.parse\("([^"]+)"\)"#).unwrap();
    static ref RANGE_START_RE: Regex =
        Regex::new(r#"startDate:\s*moment\("([0-9-]+)\s"#).unwrap();
}

fn embedded_array(html: &str, re: &Regex) -> Result<Vec<serde_json::Value>, ScrapeError> {
    match re.captures(html) {
        Some(caps) => decode_embedded_json(&caps[1]),
        None => Ok(Vec::new()),
    }
}

/// The date-range picker's start date, when present. Only its year matters.
pub fn extract_range_start(html: &str) -> Option<NaiveDate> {
    RANGE_START_RE
        .captures(html)
        .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
}

/// Pure extraction of the buy/sell history series from one exchange page.
/// Output length is the minimum of the three aligned series; indices whose
/// label fails to resolve to a date, or whose values are non-numeric, are
/// dropped without shifting the others.
pub fn extract_fx_history(html: &str) -> Result<Vec<FxHistoryPoint>, ScrapeError> {
    let labels: Vec<String> = match LABELS_RE.captures(html) {
        Some(caps) => decode_embedded_json(&caps[1])?,
        None => Vec::new(),
    };
    let buy = embedded_array(html, &BUY_RE)?;
    let sell = embedded_array(html, &SELL_RE)?;

    let dates = label_dates(&labels, extract_range_start(html));

    let len = dates.len().min(buy.len()).min(sell.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let Some(date) = dates[i] else { continue };
        let (Some(buy), Some(sell)) = (json_number(&buy[i]), json_number(&sell[i])) else {
            continue;
        };
        out.push(FxHistoryPoint { date, buy, sell });
    }

    Ok(out)
}

fn exchange_urls(slugs: &[&str]) -> Vec<String> {
    slugs
        .iter()
        .map(|slug| format!("{HELLOLINKER_BASE_URL}/rates/exchange-price/{slug}"))
        .collect()
}

/// Fetch the exchange page for the first slug alternate that answers and
/// extract its history series.
pub async fn fetch_fx_history(
    client: &Client,
    slugs: &[&str],
) -> Result<Vec<FxHistoryPoint>, ScrapeError> {
    let html = super::fetch::fetch_first(client, &exchange_urls(slugs)).await?;
    extract_fx_history(&html)
}

/// Latest quote for a currency: the last point of its history series.
pub async fn fetch_fx_latest(
    client: &Client,
    slugs: &[&str],
) -> Result<Option<FxHistoryPoint>, ScrapeError> {
    Ok(fetch_fx_history(client, slugs).await?.last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <script>
          $('#range').daterangepicker({
            startDate: moment("2025-12-20 00:00:00"),
            endDate: moment("2026-01-05 00:00:00"),
          });
          const chart = new Chart(ctx, {
            data: {
              labels: JSON.parse("[\"29 Dec\",\"02 Jan\",\"05 Jan\"]"),
              datasets: [
                { label: 'Buying', data: JSON.parse("[4400,4410,4420]") },
                { label: 'Selling', data: JSON.parse("[4500,4510,4520]") }
              ]
            }
          });
        </script>
    "#;

    #[test]
    fn test_extract_fx_history() {
        let points = extract_fx_history(PAGE).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(
            points[0],
            FxHistoryPoint {
                date: NaiveDate::from_ymd_opt(2025, 12, 29).unwrap(),
                buy: 4400.0,
                sell: 4500.0,
            }
        );
        // Year rolls over at the Dec -> Jan boundary.
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(points[2].sell, 4520.0);
    }

    #[test]
    fn test_extract_range_start() {
        assert_eq!(
            extract_range_start(PAGE),
            NaiveDate::from_ymd_opt(2025, 12, 20)
        );
    }

    #[test]
    fn test_extract_fx_history_empty_page() {
        let points = extract_fx_history("<html></html>").unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_extract_fx_history_truncates_to_shortest_series() {
        let page = r#"
            labels: JSON.parse("[\"02 Jan\",\"03 Jan\",\"04 Jan\"]"),
            { label: 'Buying', data: JSON.parse("[1,2]") },
            { label: 'Selling', data: JSON.parse("[3,4,5]") }
        "#;
        let points = extract_fx_history(page).unwrap();
        assert_eq!(points.len(), 2);
    }
}
