//! Operator settings consumed by the scraping core.
//!
//! The core never fetches settings itself: the caller resolves them (from
//! its settings store, with whatever timeout it chooses) and passes a
//! [`SettingsSnapshot`] into each scrape. [`SettingsCache`] is the
//! caller-owned short-TTL cache that avoids a settings round-trip per
//! scrape; it replaces the hidden module-level timestamp cache of the
//! original platform with an explicit value the caller holds and
//! invalidates when settings change.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::stores::{LocalStoreConfig, StoreId};

/// Default cache lifetime. Settings change rarely; a minute keeps admin
/// edits visible without hammering the settings store.
pub const DEFAULT_SETTINGS_TTL: Duration = Duration::from_secs(60);

/// Rendering-proxy configuration (operator-supplied API key).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
}

/// A point-in-time view of all operator settings the scraping core reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Currency code → rate relative to the pivot currency (USD).
    /// The table stores pivot-per-unit: `amount * rate[code]` yields USD.
    #[serde(default)]
    pub currency_rates: HashMap<String, f64>,

    /// Per-store enabled toggles. A store absent from the map is enabled.
    #[serde(default)]
    pub store_enabled: HashMap<StoreId, bool>,

    #[serde(default)]
    pub local_stores: Vec<LocalStoreConfig>,

    #[serde(default)]
    pub render_proxy: RenderProxyConfig,
}

impl SettingsSnapshot {
    /// Whether a built-in store is administratively enabled.
    #[must_use]
    pub fn is_store_enabled(&self, store: StoreId) -> bool {
        self.store_enabled.get(&store).copied().unwrap_or(true)
    }

    /// Enabled local stores only, in configuration order.
    pub fn enabled_local_stores(&self) -> impl Iterator<Item = &LocalStoreConfig> {
        self.local_stores.iter().filter(|s| s.enabled)
    }
}

/// Caller-owned, short-TTL cache for a resolved [`SettingsSnapshot`].
///
/// Not shared between threads by the core; wrap it in whatever
/// synchronization the host application uses. `invalidate` is meant to be
/// called from the settings-update path so admin changes take effect
/// immediately rather than after TTL expiry.
#[derive(Debug)]
pub struct SettingsCache {
    entry: Option<(SettingsSnapshot, Instant)>,
    ttl: Duration,
}

impl SettingsCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// Returns the cached snapshot if present and not expired.
    #[must_use]
    pub fn get(&self) -> Option<&SettingsSnapshot> {
        match &self.entry {
            Some((snapshot, stored_at)) if stored_at.elapsed() < self.ttl => Some(snapshot),
            _ => None,
        }
    }

    pub fn store(&mut self, snapshot: SettingsSnapshot) {
        self.entry = Some((snapshot, Instant::now()));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_store_toggle_means_enabled() {
        let settings = SettingsSnapshot::default();
        assert!(settings.is_store_enabled(StoreId::Amazon));
    }

    #[test]
    fn explicit_toggle_is_respected() {
        let mut settings = SettingsSnapshot::default();
        settings.store_enabled.insert(StoreId::Temu, false);
        assert!(!settings.is_store_enabled(StoreId::Temu));
        assert!(settings.is_store_enabled(StoreId::Noon));
    }

    #[test]
    fn cache_returns_fresh_entry() {
        let mut cache = SettingsCache::new(Duration::from_secs(60));
        assert!(cache.get().is_none());
        cache.store(SettingsSnapshot::default());
        assert!(cache.get().is_some());
    }

    #[test]
    fn cache_expires_after_ttl() {
        let mut cache = SettingsCache::new(Duration::ZERO);
        cache.store(SettingsSnapshot::default());
        assert!(cache.get().is_none(), "zero TTL must expire immediately");
    }

    #[test]
    fn invalidate_clears_entry() {
        let mut cache = SettingsCache::new(Duration::from_secs(60));
        cache.store(SettingsSnapshot::default());
        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn enabled_local_stores_filters_disabled() {
        let mut settings = SettingsSnapshot::default();
        settings.local_stores.extend([
            LocalStoreConfig {
                name: "On".to_string(),
                domain: "on.sa".to_string(),
                enabled: true,
                min_order_value: None,
                max_order_value: None,
                flat_shipping_fee: None,
                allowed_categories: None,
            },
            LocalStoreConfig {
                name: "Off".to_string(),
                domain: "off.sa".to_string(),
                enabled: false,
                min_order_value: None,
                max_order_value: None,
                flat_shipping_fee: None,
                allowed_categories: None,
            },
        ]);
        let names: Vec<_> = settings
            .enabled_local_stores()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["On"]);
    }
}
