use reqwest::Client;
use std::time::Duration;

use super::ScrapeError;

/// Upstream pages are slow but small; a request that has not answered in 15
/// seconds is abandoned and, where alternates exist, the next one is tried.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub fn build_client() -> Client {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .build()
        .unwrap()
}

pub async fn fetch_page(client: &Client, url: &str) -> Result<String, ScrapeError> {
    tracing::debug!("Fetching {}", url);
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(ScrapeError::Http {
            status: response.status(),
            url: url.to_string(),
        });
    }

    Ok(response.text().await?)
}

/// Try each url in order, returning the first page that fetches; if all
/// fail, surface the last failure.
pub async fn fetch_first(client: &Client, urls: &[String]) -> Result<String, ScrapeError> {
    let mut last_error = None;

    for url in urls {
        match fetch_page(client, url).await {
            Ok(html) => return Ok(html),
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(ScrapeError::NoAlternates))
}
