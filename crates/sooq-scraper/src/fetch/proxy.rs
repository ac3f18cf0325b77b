//! Strategy 2: rendering-proxy fetch with geo-country fallback.
//!
//! The proxy (ScraperAPI-compatible API) takes the target URL as a query
//! parameter and returns the rendered document. Stores that geo-gate their
//! catalog need a matching exit country; when the requested country yields
//! an interstitial instead of the product page, the fallback sequence is
//! tried before giving up.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use sooq_core::{ScraperConfig, SettingsSnapshot, StoreId};

use crate::error::ScrapeError;

use super::looks_like_country_interstitial;

/// Exit countries tried after the requested one, in order. The platform
/// ships to Saudi Arabia, so regional exits come before the generic pool.
const COUNTRY_FALLBACK: [&str; 3] = ["sa", "ae", "us"];

#[allow(clippy::too_many_arguments)]
pub(super) async fn fetch(
    client: &reqwest::Client,
    config: &ScraperConfig,
    settings: &SettingsSnapshot,
    url: &str,
    store: StoreId,
    render: bool,
    wait_ms: Option<u32>,
    country: Option<&str>,
) -> Result<String, ScrapeError> {
    let Some(api_key) = resolve_api_key(config, settings) else {
        return Err(ScrapeError::ProxyUnavailable);
    };

    let mut last_err: Option<ScrapeError> = None;
    for attempt_country in country_sequence(country) {
        match fetch_once(
            client,
            config,
            &api_key,
            url,
            render,
            wait_ms,
            attempt_country,
        )
        .await
        {
            Ok(html) => {
                if attempt_country.is_some() && looks_like_country_interstitial(&html) {
                    tracing::warn!(
                        %store,
                        country = attempt_country.unwrap_or_default(),
                        "proxy returned a geo interstitial, trying next exit country"
                    );
                    continue;
                }
                return Ok(html);
            }
            Err(err) => {
                tracing::warn!(
                    %store,
                    country = attempt_country.unwrap_or_default(),
                    error = %err,
                    "proxy fetch attempt failed"
                );
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or(ScrapeError::BotBlocked {
        store,
        url: url.to_string(),
    }))
}

async fn fetch_once(
    client: &reqwest::Client,
    config: &ScraperConfig,
    api_key: &str,
    url: &str,
    render: bool,
    wait_ms: Option<u32>,
    country: Option<&str>,
) -> Result<String, ScrapeError> {
    let mut endpoint = format!(
        "{}/?api_key={}&url={}",
        config.render_proxy_base.trim_end_matches('/'),
        api_key,
        utf8_percent_encode(url, NON_ALPHANUMERIC),
    );
    if render {
        endpoint.push_str("&render=true");
    }
    if let Some(wait) = wait_ms {
        endpoint.push_str(&format!("&wait_for={wait}"));
    }
    if let Some(cc) = country {
        endpoint.push_str(&format!("&country_code={cc}"));
    }

    let response = client
        .get(&endpoint)
        .timeout(Duration::from_secs(config.proxy_timeout_secs))
        .send()
        .await?;

    if response.status() == StatusCode::UNAUTHORIZED || response.status() == StatusCode::FORBIDDEN {
        // Bad or exhausted API key; retrying other countries cannot help
        // but the chain may still have a browser strategy left.
        return Err(ScrapeError::ProxyUnavailable);
    }

    let response = response.error_for_status()?;
    Ok(response.text().await?)
}

/// The operator-supplied key from settings wins; the env-configured key is
/// the fallback so development setups work without a settings store.
fn resolve_api_key(config: &ScraperConfig, settings: &SettingsSnapshot) -> Option<String> {
    if settings.render_proxy.enabled && !settings.render_proxy.api_key.trim().is_empty() {
        return Some(settings.render_proxy.api_key.trim().to_string());
    }
    config.render_proxy_api_key.clone()
}

/// Requested country first, then the fallback pool minus duplicates. No
/// requested country means a single country-less attempt.
fn country_sequence(requested: Option<&str>) -> Vec<Option<&str>> {
    let Some(first) = requested else {
        return vec![None];
    };
    let mut sequence = vec![Some(first)];
    for cc in COUNTRY_FALLBACK {
        if !cc.eq_ignore_ascii_case(first) {
            sequence.push(Some(cc));
        }
    }
    sequence
}
