//! Store detection: classify a normalized URL into a [`StoreId`].
//!
//! Operator-configured local stores are checked before the built-in marker
//! lists so an operator can claim a domain the built-ins would otherwise
//! misread (or not read at all). Detection is total: any string input,
//! including garbage, resolves to a `Detection` — never a panic.

use sooq_core::{LocalStoreConfig, SettingsSnapshot, StoreId};

/// Result of store detection. When `store` is [`StoreId::Local`], `local`
/// carries the matching config so the caller can apply min/max order and
/// shipping rules after the scrape.
#[derive(Debug, Clone)]
pub struct Detection {
    pub store: StoreId,
    pub local: Option<LocalStoreConfig>,
}

/// Substring markers per built-in store. Short-link hosts count as the
/// store they belong to; whether that link is *scrapable* is the per-store
/// scraper's decision (some app share hosts are rejected outright).
const STORE_MARKERS: [(StoreId, &[&str]); 9] = [
    (StoreId::Amazon, &["amazon.", "amzn.to", "amzn.eu"]),
    (StoreId::Noon, &["noon.com"]),
    (
        StoreId::Shein,
        &["shein.com", "shein.top", "sheinoutlet.com", "api-shein"],
    ),
    (
        StoreId::Aliexpress,
        &["aliexpress.com", "aliexpress.us", "a.aliexpress"],
    ),
    (StoreId::Temu, &["temu.com", "temu.to"]),
    (StoreId::Iherb, &["iherb.com", "iherb.co"]),
    (StoreId::Niceonesa, &["niceonesa.com", "niceone.sa"]),
    (StoreId::Namshi, &["namshi.com"]),
    (
        StoreId::Trendyol,
        &["trendyol.com", "ty.gl", "tyml.page.link"],
    ),
];

/// Classifies `url` against operator local stores, then built-in markers.
///
/// First match wins in both phases. Unmatched URLs come back as
/// [`StoreId::Other`]; the dispatcher rejects those without any network
/// activity.
#[must_use]
pub fn detect_store(url: &str, settings: &SettingsSnapshot) -> Detection {
    let lowered = url.to_lowercase();

    for local in settings.enabled_local_stores() {
        let key = local.match_key();
        if !key.is_empty() && lowered.contains(&key) {
            return Detection {
                store: StoreId::Local,
                local: Some(local.clone()),
            };
        }
    }

    for (store, markers) in STORE_MARKERS {
        if markers.iter().any(|m| lowered.contains(m)) {
            return Detection {
                store,
                local: None,
            };
        }
    }

    Detection {
        store: StoreId::Other,
        local: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_local(domain: &str, enabled: bool) -> SettingsSnapshot {
        let mut settings = SettingsSnapshot::default();
        settings.local_stores.push(LocalStoreConfig {
            name: "Golden Rose".to_string(),
            domain: domain.to_string(),
            enabled,
            min_order_value: None,
            max_order_value: None,
            flat_shipping_fee: None,
            allowed_categories: None,
        });
        settings
    }

    #[test]
    fn detects_each_builtin_store() {
        let settings = SettingsSnapshot::default();
        let cases = [
            ("https://www.amazon.sa/dp/B0ABC123", StoreId::Amazon),
            ("https://amzn.eu/d/xyz", StoreId::Amazon),
            ("https://www.noon.com/saudi-en/p/N123", StoreId::Noon),
            ("https://ar.shein.com/item/1.html", StoreId::Shein),
            ("https://a.aliexpress.com/_mShort", StoreId::Aliexpress),
            ("https://www.temu.com/goods.html?id=1", StoreId::Temu),
            ("https://sa.iherb.com/pr/vit-c/1891", StoreId::Iherb),
            ("https://niceonesa.com/ar/perfume-x", StoreId::Niceonesa),
            ("https://www.namshi.com/buy-shoe/p/1", StoreId::Namshi),
            ("https://ty.gl/abcdef", StoreId::Trendyol),
        ];
        for (url, expected) in cases {
            assert_eq!(detect_store(url, &settings).store, expected, "{url}");
        }
    }

    #[test]
    fn local_store_wins_over_builtin_markers() {
        // Operator configures a domain that also contains "noon.com".
        let settings = settings_with_local("https://shop.noon.com.sa/", true);
        let detection = detect_store("https://shop.noon.com.sa/p/1", &settings);
        assert_eq!(detection.store, StoreId::Local);
        assert_eq!(detection.local.unwrap().name, "Golden Rose");
    }

    #[test]
    fn disabled_local_store_is_skipped() {
        let settings = settings_with_local("goldenrose.sa", false);
        let detection = detect_store("https://goldenrose.sa/p/1", &settings);
        assert_eq!(detection.store, StoreId::Other);
        assert!(detection.local.is_none());
    }

    #[test]
    fn local_match_is_case_insensitive() {
        let settings = settings_with_local("GoldenRose.sa", true);
        assert_eq!(
            detect_store("https://www.GOLDENROSE.SA/p/1", &settings).store,
            StoreId::Local
        );
    }

    #[test]
    fn detection_is_total_on_junk_input() {
        let settings = SettingsSnapshot::default();
        for url in ["", "not a url", "https://", "ftp://weird", "ع ر ب ي"] {
            assert_eq!(detect_store(url, &settings).store, StoreId::Other);
        }
    }
}
