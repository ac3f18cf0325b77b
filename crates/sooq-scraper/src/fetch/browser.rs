//! Strategy 3: full headless Chromium via the DevTools protocol.
//!
//! Heaviest and last: launches a browser per scrape, injects a stealth
//! script before navigation, and intercepts JSON API responses while the
//! page renders. The intercepted payloads matter as much as the final DOM —
//! storefronts that defeat the rendering proxy usually load the product
//! record through an XHR the state-JSON price stage can read directly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use futures::StreamExt;
use rand::Rng;
use sooq_core::ScraperConfig;

use crate::error::ScrapeError;

use super::FetchOutcome;

/// Cap on intercepted JSON bodies kept per scrape; product pages fire many
/// small telemetry XHRs that are not worth fetching bodies for.
const MAX_PAYLOADS: usize = 20;

/// Cap on a single intercepted body. Anything larger is a catalog dump or
/// bundle map, not a product record.
const MAX_PAYLOAD_BYTES: usize = 2 * 1024 * 1024;

const WAIT_SELECTOR_POLL: Duration = Duration::from_millis(500);
const WAIT_SELECTOR_POLLS: u32 = 20;

const STEALTH_JS: &str = r"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en', 'ar'] });
    window.chrome = { runtime: {} };
";

pub(super) async fn fetch(
    config: &ScraperConfig,
    url: &str,
    wait_selector: Option<&str>,
) -> Result<FetchOutcome, ScrapeError> {
    let budget = Duration::from_secs(config.browser_timeout_secs);
    match tokio::time::timeout(budget, fetch_inner(config, url, wait_selector)).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Browser {
            reason: format!("timed out after {}s", config.browser_timeout_secs),
        }),
    }
}

async fn fetch_inner(
    config: &ScraperConfig,
    url: &str,
    wait_selector: Option<&str>,
) -> Result<FetchOutcome, ScrapeError> {
    let browser_config = BrowserConfig::builder()
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--no-first-run")
        .arg(format!("--user-agent={}", config.user_agent))
        .window_size(1920, 1080)
        .build()
        .map_err(|e| ScrapeError::Browser {
            reason: format!("browser config: {e}"),
        })?;

    let (mut browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ScrapeError::Browser {
            reason: format!("launch failed: {e}"),
        })?;

    let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let result = drive_page(&browser, url, wait_selector).await;

    if let Err(e) = browser.close().await {
        tracing::debug!(error = %e, "browser close error");
    }
    handler_task.abort();

    result
}

async fn drive_page(
    browser: &Browser,
    url: &str,
    wait_selector: Option<&str>,
) -> Result<FetchOutcome, ScrapeError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| ScrapeError::Browser {
            reason: format!("new page: {e}"),
        })?;

    // Stealth script must be registered before any site script runs.
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_JS))
        .await
        .ok();
    page.execute(EnableParams::default())
        .await
        .map_err(|e| ScrapeError::Browser {
            reason: format!("network enable: {e}"),
        })?;

    // Record the request ids of JSON responses as they arrive; bodies are
    // only retrievable after the response finishes, so they are pulled
    // after the render wait.
    let json_requests: Arc<Mutex<Vec<RequestId>>> = Arc::new(Mutex::new(Vec::new()));
    let mut events = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(|e| ScrapeError::Browser {
            reason: format!("event listener: {e}"),
        })?;
    let recorder = Arc::clone(&json_requests);
    let listener_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if !event.response.mime_type.to_lowercase().contains("json") {
                continue;
            }
            if let Ok(mut ids) = recorder.lock() {
                if ids.len() < MAX_PAYLOADS {
                    ids.push(event.request_id.clone());
                }
            }
        }
    });

    page.goto(url).await.map_err(|e| ScrapeError::Browser {
        reason: format!("navigation: {e}"),
    })?;
    page.wait_for_navigation().await.ok();

    if let Some(selector) = wait_selector {
        wait_for_selector(&page, selector).await;
    }

    // Grace period for late XHRs, slightly randomized.
    let grace_ms = rand::rng().random_range(1_200..2_000);
    tokio::time::sleep(Duration::from_millis(grace_ms)).await;

    let html = page.content().await.map_err(|e| ScrapeError::Browser {
        reason: format!("content: {e}"),
    })?;

    listener_task.abort();
    let ids = json_requests
        .lock()
        .map(|ids| ids.clone())
        .unwrap_or_default();
    let payloads = collect_payloads(&page, ids).await;

    if let Err(e) = page.close().await {
        tracing::debug!(error = %e, "page close error");
    }

    Ok(FetchOutcome { html, payloads })
}

async fn wait_for_selector(page: &chromiumoxide::Page, selector: &str) {
    for _ in 0..WAIT_SELECTOR_POLLS {
        if page.find_element(selector).await.is_ok() {
            return;
        }
        tokio::time::sleep(WAIT_SELECTOR_POLL).await;
    }
    tracing::debug!(selector, "wait selector never appeared, proceeding with current DOM");
}

async fn collect_payloads(
    page: &chromiumoxide::Page,
    ids: Vec<RequestId>,
) -> Vec<serde_json::Value> {
    let mut payloads = Vec::new();
    for id in ids {
        let Ok(response) = page.execute(GetResponseBodyParams::new(id)).await else {
            continue;
        };
        // Base64 bodies are binary (images, fonts) mislabeled as JSON.
        if response.result.base64_encoded {
            continue;
        }
        let body = &response.result.body;
        if body.len() > MAX_PAYLOAD_BYTES {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            payloads.push(value);
        }
    }
    tracing::debug!(count = payloads.len(), "intercepted JSON payloads");
    payloads
}
