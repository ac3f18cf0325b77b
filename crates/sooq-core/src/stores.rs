//! Store identity and operator-defined local store configuration.
//!
//! `StoreId` is a closed enumeration: every URL entering the scraping core is
//! classified as exactly one of these before any network call is made.
//! `Other` is terminal — the core never attempts a full fetch chain against
//! an unclassified URL.

use serde::{Deserialize, Serialize};

/// Identity of the storefront a product URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreId {
    Amazon,
    Noon,
    Shein,
    Aliexpress,
    Temu,
    Iherb,
    Niceonesa,
    Namshi,
    Trendyol,
    /// Operator-configured store matched by domain substring.
    Local,
    /// No known or configured store matched. Terminal; rejected upstream.
    Other,
}

impl StoreId {
    /// All built-in storefronts, in detection order. `Local` and `Other`
    /// are excluded: local stores are matched against operator config
    /// before this list is consulted, and `Other` is the fallthrough.
    pub const KNOWN: [StoreId; 9] = [
        StoreId::Amazon,
        StoreId::Noon,
        StoreId::Shein,
        StoreId::Aliexpress,
        StoreId::Temu,
        StoreId::Iherb,
        StoreId::Niceonesa,
        StoreId::Namshi,
        StoreId::Trendyol,
    ];

    /// Human-readable store name for user-facing failure messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            StoreId::Amazon => "Amazon",
            StoreId::Noon => "Noon",
            StoreId::Shein => "SHEIN",
            StoreId::Aliexpress => "AliExpress",
            StoreId::Temu => "Temu",
            StoreId::Iherb => "iHerb",
            StoreId::Niceonesa => "NiceOne",
            StoreId::Namshi => "Namshi",
            StoreId::Trendyol => "Trendyol",
            StoreId::Local => "local store",
            StoreId::Other => "unsupported store",
        }
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StoreId::Amazon => "amazon",
            StoreId::Noon => "noon",
            StoreId::Shein => "shein",
            StoreId::Aliexpress => "aliexpress",
            StoreId::Temu => "temu",
            StoreId::Iherb => "iherb",
            StoreId::Niceonesa => "niceonesa",
            StoreId::Namshi => "namshi",
            StoreId::Trendyol => "trendyol",
            StoreId::Local => "local",
            StoreId::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// An operator-defined store, identified by domain substring rather than
/// built-in logic.
///
/// Min/max order value and flat shipping are enforced by the cart layer,
/// not the scraping core; they travel with the config so the caller can
/// apply them after a successful scrape. The category allow-list IS
/// checked inside the core (a scrape of a non-allowed category fails with
/// a suggestion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    pub name: String,
    /// Domain substring to match, e.g. `"https://www.example.sa/"` or
    /// `"example.sa"`. Scheme and trailing slash are stripped before
    /// matching.
    pub domain: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub min_order_value: Option<f64>,
    #[serde(default)]
    pub max_order_value: Option<f64>,
    #[serde(default)]
    pub flat_shipping_fee: Option<f64>,
    /// When present, only products whose detected category matches one of
    /// these (case-insensitive) may be scraped from this store.
    #[serde(default)]
    pub allowed_categories: Option<Vec<String>>,
}

impl LocalStoreConfig {
    /// The configured domain with scheme and trailing slash stripped,
    /// lowercased, ready for substring matching against a URL.
    #[must_use]
    pub fn match_key(&self) -> String {
        self.domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_lowercase()
    }
}

/// Default for `LocalStoreConfig::enabled` when the field is absent.
///
/// Serde's `default = "..."` attribute needs a function path; operators'
/// existing store entries predate the flag and should stay enabled.
fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_key_strips_scheme_and_trailing_slash() {
        let cfg = LocalStoreConfig {
            name: "Example".to_string(),
            domain: "https://www.Example.sa/".to_string(),
            enabled: true,
            min_order_value: None,
            max_order_value: None,
            flat_shipping_fee: None,
            allowed_categories: None,
        };
        assert_eq!(cfg.match_key(), "www.example.sa");
    }

    #[test]
    fn match_key_passes_through_bare_domain() {
        let cfg = LocalStoreConfig {
            name: "Example".to_string(),
            domain: "example.sa".to_string(),
            enabled: true,
            min_order_value: None,
            max_order_value: None,
            flat_shipping_fee: None,
            allowed_categories: None,
        };
        assert_eq!(cfg.match_key(), "example.sa");
    }

    #[test]
    fn store_id_serde_roundtrip_is_lowercase() {
        let json = serde_json::to_string(&StoreId::Aliexpress).unwrap();
        assert_eq!(json, "\"aliexpress\"");
        let back: StoreId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StoreId::Aliexpress);
    }

    #[test]
    fn enabled_defaults_to_true_when_absent() {
        let cfg: LocalStoreConfig =
            serde_json::from_str(r#"{"name":"X","domain":"x.sa"}"#).unwrap();
        assert!(cfg.enabled);
    }
}
