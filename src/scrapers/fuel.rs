//! Retail fuel price extraction. One page per location filter
//! (`?filterCity=Region/Township`), with an option list enumerating the
//! available filters, a "Last Updated" stamp, and one heading card per fuel
//! grade.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use super::dates::parse_source_timestamp;
use super::{parse_number, FuelSnapshot, ScrapeError};
use crate::config::HELLOLINKER_BASE_URL;

lazy_static! {
    static ref OPTION_SEL: Selector = Selector::parse("option[value]").unwrap();
    static ref LAST_UPDATED_RE: Regex =
        Regex::new(r"(?s)Last Updated:.*?<span[^>]*>\s*([^<]+?)\s*</span>").unwrap();
    static ref CARD_RE: Regex =
        Regex::new(r#"(?s)<h3[^>]*>\s*([^<]+?)\s*</h3>.*?<span class="text-xl[^"]*">\s*([0-9.,]+)\s*</span>"#)
            .unwrap();
}

/// Enumerate the location filter values from the page's selector, first-seen
/// order, deduplicated.
pub fn extract_location_filters(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for option in document.select(&OPTION_SEL) {
        if let Some(value) = option.value().attr("value") {
            if !value.is_empty() && seen.insert(value.to_string()) {
                out.push(value.to_string());
            }
        }
    }

    out
}

/// Pure extraction of one location's fuel cards. Grade names are lowercased
/// for instrument mapping; cards with unparseable prices are dropped.
pub fn extract_fuel_snapshot(html: &str, filter_city: &str) -> FuelSnapshot {
    let mut parts = filter_city.splitn(2, '/');
    let region = parts.next().unwrap_or("").trim().to_string();
    let township = parts.next().unwrap_or("").trim().to_string();

    let last_updated_text = LAST_UPDATED_RE
        .captures(html)
        .map(|caps| caps[1].trim().to_string());
    let last_updated = last_updated_text
        .as_deref()
        .and_then(parse_source_timestamp);

    let mut prices = Vec::new();
    for caps in CARD_RE.captures_iter(html) {
        let name = caps[1].trim().to_lowercase();
        let Some(value) = parse_number(&caps[2]) else { continue };
        prices.push((name, value));
    }

    FuelSnapshot {
        filter_city: filter_city.to_string(),
        region,
        township,
        last_updated_text,
        last_updated,
        prices,
    }
}

/// Canonical instrument code for a source fuel grade name, or `None` for
/// grades this service does not track.
pub fn map_fuel_instrument(name: &str) -> Option<&'static str> {
    match name {
        "diesel" => Some("FUEL_DIESEL"),
        "premium diesel" => Some("FUEL_PREMIUM_DIESEL"),
        "octane 92" => Some("FUEL_OCTANE_92"),
        "octane 95" => Some("FUEL_OCTANE_95"),
        _ => {
            tracing::warn!("Unknown fuel grade '{}'", name);
            None
        }
    }
}

/// Location slug for a `Region/Township` filter value: the township part
/// (or the whole value when there is no region prefix), slugified.
pub fn location_slug_from_filter(filter_city: &str) -> String {
    let township = filter_city
        .split('/')
        .nth(1)
        .unwrap_or(filter_city)
        .trim();
    to_slug(township)
}

fn to_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub async fn fetch_location_filters(client: &Client) -> Result<Vec<String>, ScrapeError> {
    let url = format!("{HELLOLINKER_BASE_URL}/rates/petro-price");
    tracing::debug!("Fetching fuel location filters");
    let html = super::fetch::fetch_page(client, &url).await?;
    Ok(extract_location_filters(&html))
}

pub async fn fetch_fuel_snapshot(
    client: &Client,
    filter_city: &str,
) -> Result<FuelSnapshot, ScrapeError> {
    let url = format!("{HELLOLINKER_BASE_URL}/rates/petro-price");
    tracing::debug!("Fetching fuel prices for {}", filter_city);

    let response = client
        .get(&url)
        .query(&[("filterCity", filter_city)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ScrapeError::Http {
            status: response.status(),
            url,
        });
    }

    let html = response.text().await?;
    Ok(extract_fuel_snapshot(&html, filter_city))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <select name="filterCity">
          <option value="">All</option>
          <option value="Yangon/Yangon">Yangon</option>
          <option value="Mandalay/Mandalay">Mandalay</option>
          <option value="Yangon/Yangon">Yangon again</option>
        </select>
        <div>Last Updated: <span class="text-sm"> 09 Jan 2026, 08:29 PM </span></div>
        <div class="card"><h3> Diesel </h3>
          <span class="text-xl font-bold"> 2,605 </span></div>
        <div class="card"><h3> Premium Diesel </h3>
          <span class="text-xl font-bold"> 2,690 </span></div>
        <div class="card"><h3> Octane 92 </h3>
          <span class="text-xl font-bold"> 2,495 </span></div>
    "#;

    #[test]
    fn test_extract_location_filters_dedupes() {
        assert_eq!(
            extract_location_filters(PAGE),
            vec!["Yangon/Yangon", "Mandalay/Mandalay"]
        );
    }

    #[test]
    fn test_extract_fuel_snapshot() {
        let snapshot = extract_fuel_snapshot(PAGE, "Yangon/Yangon");
        assert_eq!(snapshot.region, "Yangon");
        assert_eq!(snapshot.township, "Yangon");
        assert_eq!(
            snapshot.last_updated_text.as_deref(),
            Some("09 Jan 2026, 08:29 PM")
        );
        assert!(snapshot.last_updated.is_some());
        assert_eq!(
            snapshot.prices,
            vec![
                ("diesel".to_string(), 2605.0),
                ("premium diesel".to_string(), 2690.0),
                ("octane 92".to_string(), 2495.0),
            ]
        );
    }

    #[test]
    fn test_extract_fuel_snapshot_without_stamp() {
        let snapshot = extract_fuel_snapshot("<html></html>", "Paung");
        assert!(snapshot.last_updated_text.is_none());
        assert!(snapshot.last_updated.is_none());
        assert!(snapshot.prices.is_empty());
        assert_eq!(snapshot.township, "");
        assert_eq!(snapshot.region, "Paung");
    }

    #[test]
    fn test_location_slug_from_filter() {
        assert_eq!(location_slug_from_filter("Yangon/Yangon"), "yangon");
        assert_eq!(location_slug_from_filter("Mon/Paung Township"), "paung-township");
        assert_eq!(location_slug_from_filter("Paung"), "paung");
    }

    #[test]
    fn test_map_fuel_instrument() {
        assert_eq!(map_fuel_instrument("diesel"), Some("FUEL_DIESEL"));
        assert_eq!(map_fuel_instrument("octane 95"), Some("FUEL_OCTANE_95"));
        assert_eq!(map_fuel_instrument("kerosene"), None);
    }
}
