//! The universal dispatcher: raw pasted text in, result contract out.
//!
//! `scrape_product` is the single entry point the host application calls.
//! It never panics and never returns a bare error: every internal failure
//! is folded into the failure side of [`ScrapeOutcome`], carrying whatever
//! partial fields extraction recovered along the way.

use sooq_core::{LocalStoreConfig, ScraperConfig, SettingsSnapshot, StoreId};

use crate::detect;
use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::stores::engine::{self, EngineFailure};
use crate::stores::profile_for;
use crate::types::{ScrapeFailure, ScrapeOutcome, ScrapedProduct};
use crate::urlnorm;

/// Longest input echo in an invalid-URL failure; pasted text can be a
/// whole paragraph.
const MAX_INPUT_ECHO: usize = 120;

/// The scraping core's front door. Cheap to clone; the underlying HTTP
/// client is shared.
#[derive(Debug, Clone)]
pub struct Scraper {
    fetcher: Fetcher,
}

impl Scraper {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] when the HTTP client cannot be built.
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
        })
    }

    /// Scrapes a product from raw user input (a URL, or prose containing
    /// one). The returned outcome is the complete result contract; this
    /// method never panics.
    pub async fn scrape_product(
        &self,
        raw_input: &str,
        settings: &SettingsSnapshot,
    ) -> ScrapeOutcome {
        match self.scrape_inner(raw_input, settings).await {
            Ok(product) => ScrapeOutcome::Success(product),
            Err(failure) => {
                tracing::warn!(error = %failure.error, "scrape failed");
                ScrapeOutcome::Failure(
                    ScrapeFailure::from_error(&failure.error)
                        .with_partials(failure.partial_name, failure.partial_image),
                )
            }
        }
    }

    /// Scrapes a normalized URL against an explicit store, bypassing
    /// detection. For callers that already know the store (re-scrapes of
    /// stored cart lines).
    pub async fn scrape_store(
        &self,
        store: StoreId,
        url: &str,
        settings: &SettingsSnapshot,
    ) -> ScrapeOutcome {
        let result = self.scrape_detected(store, None, url, settings).await;
        match result {
            Ok(product) => ScrapeOutcome::Success(product),
            Err(failure) => ScrapeOutcome::Failure(
                ScrapeFailure::from_error(&failure.error)
                    .with_partials(failure.partial_name, failure.partial_image),
            ),
        }
    }

    async fn scrape_inner(
        &self,
        raw_input: &str,
        settings: &SettingsSnapshot,
    ) -> Result<ScrapedProduct, EngineFailure> {
        let Some(url) = urlnorm::normalize_input(raw_input) else {
            return Err(ScrapeError::InvalidUrl {
                input: truncate_input(raw_input),
            }
            .into());
        };

        let detection = detect::detect_store(&url, settings);
        tracing::debug!(store = %detection.store, %url, "store detected");

        self.scrape_detected(detection.store, detection.local.as_ref(), &url, settings)
            .await
    }

    async fn scrape_detected(
        &self,
        store: StoreId,
        local: Option<&LocalStoreConfig>,
        url: &str,
        settings: &SettingsSnapshot,
    ) -> Result<ScrapedProduct, EngineFailure> {
        // `Other` is a terminal classification, never a scrapable store;
        // guarding here covers the explicit-store entry point too.
        if store == StoreId::Other {
            return Err(ScrapeError::UnsupportedStore {
                url: url.to_string(),
            }
            .into());
        }

        if store != StoreId::Local && !settings.is_store_enabled(store) {
            return Err(ScrapeError::StoreDisabled { store }.into());
        }

        if let Some(local) = local {
            check_category_allowed(local, url)?;
        }

        let profile = profile_for(store);
        engine::scrape_with_profile(&self.fetcher, &profile, url, settings).await
    }
}

/// Enforces a local store's category allow-list against the URL path.
///
/// Local storefronts put the category in the path (`/perfumes/oud-x`), so
/// a configured allow-list is matched against the path segments. A URL
/// with no recognizable category segments passes; the check exists to
/// block obviously out-of-scope products, not to be a gatekeeper.
fn check_category_allowed(local: &LocalStoreConfig, url: &str) -> Result<(), ScrapeError> {
    let Some(allowed) = &local.allowed_categories else {
        return Ok(());
    };
    if allowed.is_empty() {
        return Ok(());
    }

    let Ok(parsed) = url::Url::parse(url) else {
        return Ok(());
    };
    let segments: Vec<String> = parsed
        .path_segments()
        .map(|s| {
            s.filter(|seg| !seg.is_empty())
                .map(|seg| seg.replace('-', " ").to_lowercase())
                .collect()
        })
        .unwrap_or_default();

    // Nothing but a product slug (or an empty path): let it through.
    if segments.len() < 2 {
        return Ok(());
    }

    let matches_allowed = segments.iter().any(|seg| {
        allowed
            .iter()
            .any(|cat| seg.contains(&cat.trim().to_lowercase()))
    });
    if matches_allowed {
        return Ok(());
    }

    Err(ScrapeError::CategoryNotAllowed {
        store_name: local.name.clone(),
        category: segments.first().cloned().unwrap_or_default(),
    })
}

fn truncate_input(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= MAX_INPUT_ECHO {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_INPUT_ECHO).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_store(allowed: Option<Vec<String>>) -> LocalStoreConfig {
        LocalStoreConfig {
            name: "Oud House".to_string(),
            domain: "oudhouse.sa".to_string(),
            enabled: true,
            min_order_value: None,
            max_order_value: None,
            flat_shipping_fee: None,
            allowed_categories: allowed,
        }
    }

    #[test]
    fn no_allow_list_passes_everything() {
        let store = local_store(None);
        assert!(check_category_allowed(&store, "https://oudhouse.sa/electronics/tv-55").is_ok());
    }

    #[test]
    fn allowed_category_in_path_passes() {
        let store = local_store(Some(vec!["perfumes".to_string()]));
        assert!(check_category_allowed(&store, "https://oudhouse.sa/perfumes/oud-royal").is_ok());
    }

    #[test]
    fn disallowed_category_is_rejected() {
        let store = local_store(Some(vec!["perfumes".to_string()]));
        let err = check_category_allowed(&store, "https://oudhouse.sa/electronics/tv-55")
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::CategoryNotAllowed { ref store_name, .. } if store_name == "Oud House"
        ));
    }

    #[test]
    fn bare_product_slug_passes() {
        let store = local_store(Some(vec!["perfumes".to_string()]));
        assert!(check_category_allowed(&store, "https://oudhouse.sa/p12345").is_ok());
    }

    #[test]
    fn input_echo_is_bounded() {
        let long = "x".repeat(500);
        let echoed = truncate_input(&long);
        assert!(echoed.chars().count() <= MAX_INPUT_ECHO + 1);
    }
}
