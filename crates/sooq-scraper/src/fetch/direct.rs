//! Strategy 1: direct HTTP GET with a browser-like header profile.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, UPGRADE_INSECURE_REQUESTS};
use reqwest::StatusCode;
use sooq_core::{ScraperConfig, StoreId};

use crate::error::ScrapeError;

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9,ar;q=0.8";

pub(super) async fn fetch(
    client: &reqwest::Client,
    config: &ScraperConfig,
    url: &str,
    store: StoreId,
) -> Result<String, ScrapeError> {
    let mut request = client
        .get(url)
        .header(ACCEPT, ACCEPT_VALUE)
        .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
        .header(UPGRADE_INSECURE_REQUESTS, "1")
        .timeout(Duration::from_secs(config.direct_timeout_secs));

    // Arriving from the site's own front page reads as organic navigation.
    if let Some(origin) = origin_of(url) {
        request = request.header(REFERER, origin);
    }

    let response = request.send().await?;
    let status = response.status();

    if matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    ) {
        return Err(ScrapeError::BotBlocked {
            store,
            url: url.to_string(),
        });
    }

    let response = response.error_for_status()?;
    Ok(response.text().await?)
}

fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{host}/", parsed.scheme()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path_and_query() {
        assert_eq!(
            origin_of("https://www.amazon.sa/dp/B0ABC?th=1").as_deref(),
            Some("https://www.amazon.sa/")
        );
        assert!(origin_of("not a url").is_none());
    }
}
