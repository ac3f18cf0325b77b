//! Per-store tuning data for the price disambiguation engine.
//!
//! The cascade's control flow lives once in [`crate::price`]; everything
//! that differs between storefronts — selector lists, exclusion values,
//! plausibility windows, whether variant proximity applies — is data in a
//! [`PriceRules`] owned by the store profile. The magic numbers are
//! empirically tuned against observed storefront markup and have no
//! principled derivation; change them only against live pages.

use sooq_core::StoreId;

/// One CSS selector plus the attribute to read, if any. Attribute
/// extraction (`content`, `data-price`) runs before text-node extraction
/// because attributes are free of locale formatting noise.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSpec {
    pub css: &'static str,
    pub attr: Option<&'static str>,
}

/// Format of a URL query parameter that encodes the displayed price as a
/// delimited string, e.g. `goods_pr=SKC123!SAR!199!149` (code, currency,
/// base price, sale price).
#[derive(Debug, Clone, Copy)]
pub struct UrlParamFormat {
    pub param: &'static str,
    pub delimiter: char,
    /// Zero-based index of the currency code in the split.
    pub currency_index: usize,
    /// Zero-based index of the current/sale price in the split.
    pub sale_index: usize,
}

/// Store-tuned configuration for the disambiguation cascade.
#[derive(Debug, Clone, Copy)]
pub struct PriceRules {
    pub store: StoreId,
    /// Stage 1: authoritative URL-embedded price, when the store's share
    /// links carry one.
    pub url_param: Option<UrlParamFormat>,
    /// Stage 3 selectors in priority order.
    pub price_selectors: &'static [SelectorSpec],
    /// Inline-script globals worth parsing as application state (stage 4).
    /// Empty means: any sufficiently large inline JSON object qualifies.
    pub state_markers: &'static [&'static str],
    /// Values never accepted as a product price for this store — observed
    /// placeholder, shipping-threshold, and flat-fee numbers that show up
    /// adjacent to currency tokens.
    pub exclusion_list: &'static [f64],
    /// Plausibility window; candidates outside are discarded regardless of
    /// which stage produced them.
    pub plausible_min: f64,
    pub plausible_max: f64,
    /// Enable the variant-proximity tie-break (stores whose URLs encode a
    /// size/volume variant id that also appears near the matching price in
    /// the raw markup).
    pub variant_proximity: bool,
    /// Currency assumed for candidates that carry none (selector text with
    /// no symbol, bare state-JSON numbers).
    pub default_currency: &'static str,
}

/// Selectors that work on most conventional product pages; local stores
/// and generic fallbacks use these as-is, built-in stores prepend their
/// own known containers.
pub const GENERIC_PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: r#"meta[property="product:price:amount"]"#,
        attr: Some("content"),
    },
    SelectorSpec {
        css: r#"meta[itemprop="price"]"#,
        attr: Some("content"),
    },
    SelectorSpec {
        css: r#"[itemprop="price"]"#,
        attr: Some("content"),
    },
    SelectorSpec {
        css: "[data-price]",
        attr: Some("data-price"),
    },
    SelectorSpec {
        css: r#"[itemprop="price"]"#,
        attr: None,
    },
    SelectorSpec {
        css: ".sale-price, .special-price, .price-new, .current-price",
        attr: None,
    },
    SelectorSpec {
        css: ".product-price, .price",
        attr: None,
    },
];

/// Baseline decoy values seen across storefronts: rating counts, quantity
/// steppers, and "free shipping over N" callouts render as bare small
/// round numbers next to currency symbols.
pub const GENERIC_EXCLUSIONS: &[f64] = &[1.0, 2.0, 3.0, 5.0, 10.0];

impl PriceRules {
    /// Rules for operator-defined local stores: no store-specific
    /// selectors exist for arbitrary domains, so only the generic subset
    /// of the cascade applies.
    #[must_use]
    pub fn generic() -> Self {
        Self {
            store: StoreId::Local,
            url_param: None,
            price_selectors: GENERIC_PRICE_SELECTORS,
            state_markers: &[],
            exclusion_list: GENERIC_EXCLUSIONS,
            plausible_min: 0.5,
            plausible_max: 500_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        }
    }
}
