//! Environment-driven configuration for the scraping core.
//!
//! Everything here has a default; the only secret (the rendering-proxy API
//! key) can also arrive at call time through the settings snapshot, which
//! takes precedence over the env var.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Tunables for the scraping core, loaded once at startup.
#[derive(Clone)]
pub struct ScraperConfig {
    /// Timeout for a direct HTTP fetch of a product page.
    pub direct_timeout_secs: u64,
    /// Timeout for a rendering-proxy call (these are slow by design).
    pub proxy_timeout_secs: u64,
    /// Overall budget for a headless-browser fetch, navigation included.
    pub browser_timeout_secs: u64,
    /// Bound on the settings/rates lookup inside currency conversion.
    pub rates_timeout_secs: u64,
    pub user_agent: String,
    /// Base URL of the rendering-proxy service.
    pub render_proxy_base: String,
    /// Fallback rendering-proxy API key when settings carry none.
    pub render_proxy_api_key: Option<String>,
    pub max_redirects: usize,
}

impl std::fmt::Debug for ScraperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperConfig")
            .field("direct_timeout_secs", &self.direct_timeout_secs)
            .field("proxy_timeout_secs", &self.proxy_timeout_secs)
            .field("browser_timeout_secs", &self.browser_timeout_secs)
            .field("rates_timeout_secs", &self.rates_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("render_proxy_base", &self.render_proxy_base)
            .field(
                "render_proxy_api_key",
                &self.render_proxy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            direct_timeout_secs: 12,
            proxy_timeout_secs: 60,
            browser_timeout_secs: 45,
            rates_timeout_secs: 3,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            )
            .to_string(),
            render_proxy_base: "https://api.scraperapi.com".to_string(),
            render_proxy_api_key: None,
            max_redirects: 10,
        }
    }
}

/// Load scraper configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a present env var has an invalid value.
pub fn load_scraper_config() -> Result<ScraperConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_scraper_config_from_env()
}

/// Load scraper configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a present env var has an invalid value.
pub fn load_scraper_config_from_env() -> Result<ScraperConfig, ConfigError> {
    build_scraper_config(|key| std::env::var(key))
}

/// Build configuration through an injected env-var lookup so tests can use
/// a pure `HashMap` lookup instead of mutating process env.
fn build_scraper_config<F>(lookup: F) -> Result<ScraperConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = ScraperConfig::default();

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    Ok(ScraperConfig {
        direct_timeout_secs: parse_u64("SOOQ_DIRECT_TIMEOUT_SECS", defaults.direct_timeout_secs)?,
        proxy_timeout_secs: parse_u64("SOOQ_PROXY_TIMEOUT_SECS", defaults.proxy_timeout_secs)?,
        browser_timeout_secs: parse_u64(
            "SOOQ_BROWSER_TIMEOUT_SECS",
            defaults.browser_timeout_secs,
        )?,
        rates_timeout_secs: parse_u64("SOOQ_RATES_TIMEOUT_SECS", defaults.rates_timeout_secs)?,
        user_agent: lookup("SOOQ_USER_AGENT").unwrap_or(defaults.user_agent),
        render_proxy_base: lookup("SOOQ_RENDER_PROXY_BASE").unwrap_or(defaults.render_proxy_base),
        render_proxy_api_key: lookup("SOOQ_RENDER_PROXY_API_KEY").ok(),
        max_redirects: parse_usize("SOOQ_MAX_REDIRECTS", defaults.max_redirects)?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn empty_env_yields_defaults() {
        let map = HashMap::new();
        let cfg = build_scraper_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.direct_timeout_secs, 12);
        assert_eq!(cfg.render_proxy_base, "https://api.scraperapi.com");
        assert!(cfg.render_proxy_api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let mut map = HashMap::new();
        map.insert("SOOQ_DIRECT_TIMEOUT_SECS", "8");
        map.insert("SOOQ_RENDER_PROXY_API_KEY", "k-123");
        let cfg = build_scraper_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.direct_timeout_secs, 8);
        assert_eq!(cfg.render_proxy_api_key.as_deref(), Some("k-123"));
    }

    #[test]
    fn invalid_numeric_value_is_rejected() {
        let mut map = HashMap::new();
        map.insert("SOOQ_PROXY_TIMEOUT_SECS", "soon");
        let result = build_scraper_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SOOQ_PROXY_TIMEOUT_SECS"),
            "expected InvalidEnvVar(SOOQ_PROXY_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = ScraperConfig {
            render_proxy_api_key: Some("secret".to_string()),
            ..ScraperConfig::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
