//! The scraping core's external result contract and internal price types.
//!
//! ## Result contract
//!
//! The only two shapes that ever leave the core are [`ScrapedProduct`] and
//! [`ScrapeFailure`], wrapped in [`ScrapeOutcome`]. A success never carries
//! `price <= 0.0` or a name of 3 characters or fewer — the cart layer
//! relies on this without re-validating. Failures carry a human-readable
//! `error`, an optional technical `details` string (the underlying error
//! text, for logs), and an optional `suggestion` (actionable remediation,
//! e.g. "copy the link from your browser, not the app").
//!
//! ## Candidate prices
//!
//! [`CandidatePrice`] is internal plumbing: every numeric value harvested
//! from any extraction stage becomes one candidate, and the disambiguation
//! engine reduces the set to at most one. Candidates live and die inside a
//! single scrape; they are never persisted.

use serde::Serialize;
use sooq_core::StoreId;

use crate::error::ScrapeError;

/// A successfully scraped, fully normalized product.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedProduct {
    /// Product display name. Always longer than 3 characters.
    pub name: String,
    /// Current sale price in the settlement currency. Always positive.
    pub price: f64,
    /// Settlement currency code (`"SAR"`). Present so the cart layer can
    /// stay currency-agnostic.
    pub currency: String,
    /// Primary product image URL. Empty string when no image was found —
    /// an image is not required for a usable cart line.
    pub image: String,
    pub store: StoreId,
    /// The normalized URL that was actually scraped.
    pub url: String,
}

/// A typed scrape failure, shaped for direct surfacing to the end user.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeFailure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Name recovered before the scrape failed, when extraction got that
    /// far (e.g. price missing but the page title parsed). For caller-side
    /// display and diagnostics only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_image: Option<String>,
}

/// The core's only output shape: success or typed failure, nothing else.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScrapeOutcome {
    Success(ScrapedProduct),
    Failure(ScrapeFailure),
}

impl ScrapeOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success(_))
    }

    #[must_use]
    pub fn as_product(&self) -> Option<&ScrapedProduct> {
        match self {
            ScrapeOutcome::Success(p) => Some(p),
            ScrapeOutcome::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn as_failure(&self) -> Option<&ScrapeFailure> {
        match self {
            ScrapeOutcome::Success(_) => None,
            ScrapeOutcome::Failure(f) => Some(f),
        }
    }
}

impl ScrapeFailure {
    /// Maps an internal [`ScrapeError`] to the user-facing failure shape.
    ///
    /// The `error` strings here are what the API layer surfaces verbatim in
    /// its 400 responses, so they name the store and stay free of
    /// implementation detail; the raw error text goes into `details`.
    #[must_use]
    pub fn from_error(err: &ScrapeError) -> Self {
        let (error, details, suggestion) = match err {
            ScrapeError::InvalidUrl { input } => (
                "No valid product link found in the pasted text.".to_string(),
                Some(format!("input: {input}")),
                Some("Paste the full product page link, starting with https://.".to_string()),
            ),
            ScrapeError::UnsupportedStore { url } => (
                "This store is not supported.".to_string(),
                Some(format!("url: {url}")),
                Some("Check the list of supported stores and try again.".to_string()),
            ),
            ScrapeError::StoreDisabled { store } => (
                format!("{} is currently unavailable.", store.display_name()),
                None,
                Some("This store has been temporarily disabled. Try again later.".to_string()),
            ),
            ScrapeError::CategoryNotAllowed {
                store_name,
                category,
            } => (
                format!("{store_name} does not accept products in this category."),
                Some(format!("category: {category}")),
                Some("Pick a product from one of the allowed categories.".to_string()),
            ),
            ScrapeError::AppLinkRejected {
                store,
                host,
                suggestion,
            } => (
                format!(
                    "This looks like a {} app share link, which cannot be read.",
                    store.display_name()
                ),
                Some(format!("host: {host}")),
                Some((*suggestion).to_string()),
            ),
            ScrapeError::FetchExhausted { store, url, .. } => (
                format!(
                    "Could not load the product page from {}.",
                    store.display_name()
                ),
                Some(format!("all fetch strategies failed for {url}")),
                Some("Make sure the link opens in your browser, then try again.".to_string()),
            ),
            ScrapeError::BotBlocked { store, .. } => (
                format!(
                    "{} is blocking automated access right now.",
                    store.display_name()
                ),
                Some(err.to_string()),
                Some("Try again in a few minutes.".to_string()),
            ),
            ScrapeError::MissingName { store } => (
                format!(
                    "Could not read the product name from {}.",
                    store.display_name()
                ),
                Some(err.to_string()),
                None,
            ),
            ScrapeError::MissingPrice { store } => (
                format!(
                    "Could not determine the product price on {}.",
                    store.display_name()
                ),
                Some(err.to_string()),
                Some("Open the product page and verify it shows a price, then try again."
                    .to_string()),
            ),
            ScrapeError::Http(_)
            | ScrapeError::ProxyUnavailable
            | ScrapeError::Browser { .. } => (
                "Something went wrong while reading the product page.".to_string(),
                Some(err.to_string()),
                Some("Try again in a moment.".to_string()),
            ),
        };

        Self {
            error,
            details,
            suggestion,
            partial_name: None,
            partial_image: None,
        }
    }

    #[must_use]
    pub(crate) fn with_partials(
        mut self,
        name: Option<String>,
        image: Option<String>,
    ) -> Self {
        self.partial_name = name;
        self.partial_image = image;
        self
    }
}

/// Where in the extraction cascade a candidate price came from.
/// Lower rank is higher confidence; the cascade stops at the first stage
/// that yields any surviving candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriceSource {
    /// Price encoded in a URL query parameter — mirrors exactly what the
    /// user's browser rendered, so it outranks everything.
    UrlParam,
    /// schema.org JSON-LD `Product`/`Offer` structured data.
    JsonLd,
    /// Known current-price DOM containers via CSS selectors.
    DomSelector,
    /// Embedded application-state JSON in inline scripts.
    StateJson,
    /// Free-text scan for a number adjacent to a currency token.
    TextScan,
}

/// One numeric value harvested during extraction, before disambiguation.
#[derive(Debug, Clone)]
pub struct CandidatePrice {
    pub value: f64,
    /// Detected currency code, when the source carried one.
    pub currency: Option<String>,
    pub source: PriceSource,
    /// Short provenance note for logs (selector, JSON key path, ...).
    pub context: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serialization_skips_absent_fields() {
        let failure = ScrapeFailure {
            error: "boom".to_string(),
            details: None,
            suggestion: None,
            partial_name: None,
            partial_image: None,
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }

    #[test]
    fn outcome_serializes_untagged() {
        let outcome = ScrapeOutcome::Success(ScrapedProduct {
            name: "Vitamin C 1000mg".to_string(),
            price: 49.0,
            currency: "SAR".to_string(),
            image: String::new(),
            store: StoreId::Iherb,
            url: "https://www.iherb.com/pr/x/1891".to_string(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["name"], "Vitamin C 1000mg");
        assert!(json.get("Success").is_none(), "must not be externally tagged");
    }

    #[test]
    fn app_link_failure_carries_suggestion() {
        let err = ScrapeError::AppLinkRejected {
            store: StoreId::Shein,
            host: "api-shein.shein.com".to_string(),
            suggestion: "Open the product in your browser and copy the address bar link.",
        };
        let failure = ScrapeFailure::from_error(&err);
        assert!(failure.suggestion.unwrap().contains("browser"));
    }
}
