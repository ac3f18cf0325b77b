use sooq_core::StoreId;
use thiserror::Error;

/// Internal error taxonomy for the scraping core.
///
/// None of these cross the dispatcher boundary: `Scraper::scrape_product`
/// maps every variant to the failure side of the result contract via
/// [`crate::types::ScrapeFailure::from_error`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no usable URL found in input \"{input}\"")]
    InvalidUrl { input: String },

    #[error("URL does not match any supported store: {url}")]
    UnsupportedStore { url: String },

    #[error("store {store} is disabled")]
    StoreDisabled { store: StoreId },

    #[error("category \"{category}\" is not allowed for store {store_name}")]
    CategoryNotAllowed {
        store_name: String,
        category: String,
    },

    #[error("app share link {host} cannot be scraped")]
    AppLinkRejected {
        store: StoreId,
        host: String,
        suggestion: &'static str,
    },

    #[error("all {attempts} fetch strategies failed for {url}")]
    FetchExhausted {
        store: StoreId,
        url: String,
        attempts: usize,
    },

    #[error("anti-bot block detected for {url}")]
    BotBlocked { store: StoreId, url: String },

    #[error("could not extract a product name for store {store}")]
    MissingName { store: StoreId },

    #[error("could not extract a plausible price for store {store}")]
    MissingPrice { store: StoreId },

    #[error("rendering proxy is not configured")]
    ProxyUnavailable,

    #[error("headless browser failure: {reason}")]
    Browser { reason: String },
}

impl ScrapeError {
    /// Whether this error means a fetch strategy should fall through to the
    /// next one in the chain rather than aborting the scrape.
    #[must_use]
    pub(crate) fn is_strategy_level(&self) -> bool {
        matches!(
            self,
            ScrapeError::Http(_)
                | ScrapeError::BotBlocked { .. }
                | ScrapeError::ProxyUnavailable
                | ScrapeError::Browser { .. }
        )
    }
}
