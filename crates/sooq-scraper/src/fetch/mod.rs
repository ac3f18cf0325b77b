//! Page fetching: the strategy chain.
//!
//! Every store declares an ordered fetch plan; [`Fetcher::run_chain`] runs
//! it until a strategy yields a plausible document. Strategy-level failures
//! (HTTP errors, bot blocks, proxy misconfiguration, browser crashes) fall
//! through to the next strategy; anything else aborts the scrape. A chain
//! that ends without a usable document reports [`ScrapeError::FetchExhausted`],
//! except when the last thing seen was an anti-bot challenge — that is
//! surfaced as [`ScrapeError::BotBlocked`] so the user gets the more
//! specific message.

mod browser;
mod direct;
mod proxy;

use std::time::Duration;

use rand::Rng;
use sooq_core::{ScraperConfig, SettingsSnapshot, StoreId};

use crate::error::ScrapeError;

/// Documents shorter than this are error stubs, empty shells, or redirect
/// interstitials, never a rendered product page.
const MIN_PLAUSIBLE_HTML_LEN: usize = 512;

/// One way of obtaining a product page. Const-constructible so store
/// profiles can declare their plan as a static slice.
#[derive(Debug, Clone, Copy)]
pub enum FetchStrategy {
    /// Plain HTTP GET with browser-profile headers.
    Direct,
    /// Rendering-proxy fetch, optionally with JS rendering, a render wait,
    /// and a geo exit country.
    RenderProxy {
        render: bool,
        wait_ms: Option<u32>,
        country: Option<&'static str>,
    },
    /// Full headless browser with network-payload interception.
    Browser { wait_selector: Option<&'static str> },
}

/// What a successful fetch hands to extraction.
#[derive(Debug)]
pub struct FetchOutcome {
    pub html: String,
    /// JSON response bodies intercepted during a browser fetch; empty for
    /// the other strategies. Fed to the state-JSON price stage.
    pub payloads: Vec<serde_json::Value>,
}

impl FetchOutcome {
    fn from_html(html: String) -> Self {
        Self {
            html,
            payloads: Vec::new(),
        }
    }
}

/// Shared HTTP client plus config, built once per application.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: ScraperConfig,
}

impl Fetcher {
    /// Builds the underlying HTTP client with the configured identity.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] when the TLS backend fails to
    /// initialize.
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Runs the plan in order until one strategy yields a usable document.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::BotBlocked`] when the final obstacle was an anti-bot
    /// challenge, [`ScrapeError::FetchExhausted`] when every strategy
    /// failed for other reasons, or a non-strategy error propagated from a
    /// strategy.
    pub async fn run_chain(
        &self,
        plan: &[FetchStrategy],
        url: &str,
        store: StoreId,
        settings: &SettingsSnapshot,
    ) -> Result<FetchOutcome, ScrapeError> {
        let mut last_err: Option<ScrapeError> = None;

        for (attempt, strategy) in plan.iter().enumerate() {
            if attempt > 0 {
                pause_between_strategies().await;
            }
            tracing::debug!(%store, ?strategy, attempt = attempt + 1, "running fetch strategy");

            let result = match strategy {
                FetchStrategy::Direct => direct::fetch(&self.client, &self.config, url, store)
                    .await
                    .map(FetchOutcome::from_html),
                FetchStrategy::RenderProxy {
                    render,
                    wait_ms,
                    country,
                } => proxy::fetch(
                    &self.client,
                    &self.config,
                    settings,
                    url,
                    store,
                    *render,
                    *wait_ms,
                    *country,
                )
                .await
                .map(FetchOutcome::from_html),
                FetchStrategy::Browser { wait_selector } => {
                    browser::fetch(&self.config, url, *wait_selector).await
                }
            };

            match result {
                Ok(outcome) => match sniff_outcome(&outcome) {
                    Sniff::BotChallenge => {
                        tracing::warn!(%store, ?strategy, "strategy returned a bot challenge page");
                        last_err = Some(ScrapeError::BotBlocked {
                            store,
                            url: url.to_string(),
                        });
                        continue;
                    }
                    Sniff::TooSmall => {
                        tracing::warn!(
                            %store,
                            ?strategy,
                            len = outcome.html.len(),
                            "strategy returned an implausibly small document"
                        );
                        continue;
                    }
                    Sniff::Usable => {
                        tracing::info!(%store, ?strategy, attempt = attempt + 1, "fetch succeeded");
                        return Ok(outcome);
                    }
                },
                Err(err) if err.is_strategy_level() => {
                    tracing::warn!(%store, ?strategy, error = %err, "fetch strategy failed");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        match last_err {
            Some(err @ ScrapeError::BotBlocked { .. }) => Err(err),
            _ => Err(ScrapeError::FetchExhausted {
                store,
                url: url.to_string(),
                attempts: plan.len(),
            }),
        }
    }
}

/// Verdict on a strategy's document before it is handed to extraction.
#[derive(Debug, PartialEq, Eq)]
enum Sniff {
    Usable,
    BotChallenge,
    TooSmall,
}

/// Intercepted JSON payloads carry the product record even when the
/// rendered DOM is a challenge page or a stub, so any outcome with payloads
/// is usable; bare HTML must pass the challenge and size checks.
fn sniff_outcome(outcome: &FetchOutcome) -> Sniff {
    if !outcome.payloads.is_empty() {
        return Sniff::Usable;
    }
    if looks_like_bot_challenge(&outcome.html) {
        return Sniff::BotChallenge;
    }
    if outcome.html.len() < MIN_PLAUSIBLE_HTML_LEN {
        return Sniff::TooSmall;
    }
    Sniff::Usable
}

/// Small randomized pause before escalating to the next strategy; keeps
/// request timing from looking machine-regular.
async fn pause_between_strategies() {
    let jitter_ms = rand::rng().random_range(150..450);
    tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
}

/// Phrases that identify an anti-bot challenge or access-denied page across
/// the supported storefronts and the common CDN guards in front of them.
fn looks_like_bot_challenge(html: &str) -> bool {
    const MARKERS: [&str; 8] = [
        "captcha",
        "access denied",
        "are you a robot",
        "unusual traffic",
        "attention required",
        "pardon our interruption",
        "verify you are human",
        "cf-challenge",
    ];
    // Challenge pages are small; scanning a rendered product page for these
    // words risks false hits in review text.
    if html.len() > 20_000 {
        return false;
    }
    let lowered = html.to_lowercase();
    MARKERS.iter().any(|m| lowered.contains(m))
}

/// Geo interstitials served instead of the product page when the exit
/// country is not served by the storefront.
fn looks_like_country_interstitial(html: &str) -> bool {
    const MARKERS: [&str; 4] = [
        "choose your country",
        "select your location",
        "select your country",
        "not available in your region",
    ];
    if html.len() > 20_000 {
        return false;
    }
    let lowered = html.to_lowercase();
    MARKERS.iter().any(|m| lowered.contains(m))
}
