//! Bank counter-rate extraction. The page renders one card per institution
//! (logo img alt carries the institution name) with a table of per-currency
//! buy/sell spans.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use super::{parse_number, BankRate, BankRates, BankRatesByCode, ScrapeError};
use crate::config::HELLOLINKER_BASE_URL;

lazy_static! {
    static ref CARD_SEL: Selector = Selector::parse("div[class*='premium-card']").unwrap();
    static ref LOGO_SEL: Selector = Selector::parse("img[alt]").unwrap();
    static ref ROW_SEL: Selector = Selector::parse("tr").unwrap();
    static ref ROW_CURRENCY_RE: Regex = Regex::new(r">\s*([A-Z]{3})\s*</div>").unwrap();
    static ref ROW_VALUE_RE: Regex =
        Regex::new(r#"<span class="block[^"]*">\s*([0-9.,]+)\s*</span>"#).unwrap();
}

/// Map an institution's display name to its canonical market code.
/// Names on the page vary ("KBZ Bank", "AYA Bank Limited"), so matching is
/// by substring; unrecognized institutions are dropped.
pub fn normalize_bank_code(name: &str) -> Option<&'static str> {
    let upper = name.to_uppercase();
    if upper.contains("AYA") {
        return Some("AYA");
    }
    if upper.contains("KBZ") {
        return Some("KBZ");
    }
    if upper.contains("YOMA") {
        return Some("YOMA");
    }
    if upper.contains("CB BANK") {
        return Some("CB");
    }
    if upper.contains("MCB") {
        return Some("MCB");
    }
    None
}

fn extract_row(row_html: &str) -> Option<(String, BankRate)> {
    let currency = ROW_CURRENCY_RE.captures(row_html)?[1].to_string();

    let mut values = ROW_VALUE_RE
        .captures_iter(row_html)
        .filter_map(|caps| parse_number(&caps[1]));
    let rate = BankRate {
        buy: values.next(),
        sell: values.next(),
    };

    if rate.buy.is_none() && rate.sell.is_none() {
        return None;
    }
    Some((currency, rate))
}

/// Pure extraction of all recognized institutions' rate tables.
pub fn extract_bank_rates(html: &str) -> BankRatesByCode {
    let document = Html::parse_document(html);
    let mut out = BankRatesByCode::new();

    for card in document.select(&CARD_SEL) {
        let Some(bank_code) = card
            .select(&LOGO_SEL)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .and_then(normalize_bank_code)
        else {
            continue;
        };

        let mut rates = BankRates::new();
        for row in card.select(&ROW_SEL) {
            if let Some((currency, rate)) = extract_row(&row.html()) {
                rates.insert(currency, rate);
            }
        }

        if !rates.is_empty() {
            out.insert(bank_code.to_string(), rates);
        }
    }

    out
}

pub async fn fetch_bank_rates(client: &Client) -> Result<BankRatesByCode, ScrapeError> {
    let url = format!("{HELLOLINKER_BASE_URL}/rates/bank-exchange-rates");
    let html = super::fetch::fetch_page(client, &url).await?;
    Ok(extract_bank_rates(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="premium-card rounded">
          <img src="/logos/kbz.png" alt="KBZ Bank">
          <table>
            <tr>
              <td><div> USD </div></td>
              <td><span class="block font-bold"> 4,400 </span></td>
              <td><span class="block font-bold"> 4,500 </span></td>
            </tr>
            <tr>
              <td><div> EUR </div></td>
              <td><span class="block font-bold"> 5,100.5 </span></td>
            </tr>
            <tr>
              <td><div>header</div></td>
            </tr>
          </table>
        </div>
        <div class="premium-card rounded">
          <img src="/logos/other.png" alt="Some Other Bank">
          <table><tr><td><div> USD </div></td>
            <td><span class="block"> 4,000 </span></td></tr></table>
        </div>
    "#;

    #[test]
    fn test_extract_bank_rates() {
        let banks = extract_bank_rates(PAGE);
        assert_eq!(banks.len(), 1, "unrecognized institutions are dropped");

        let kbz = &banks["KBZ"];
        assert_eq!(
            kbz["USD"],
            BankRate {
                buy: Some(4400.0),
                sell: Some(4500.0),
            }
        );
        // Missing sell is a row-level omission, not an error.
        assert_eq!(
            kbz["EUR"],
            BankRate {
                buy: Some(5100.5),
                sell: None,
            }
        );
        assert!(!kbz.contains_key("header"));
    }

    #[test]
    fn test_normalize_bank_code() {
        assert_eq!(normalize_bank_code("AYA Bank Limited"), Some("AYA"));
        assert_eq!(normalize_bank_code("cb bank"), Some("CB"));
        assert_eq!(normalize_bank_code("Unknown"), None);
    }
}
