pub mod config;
pub mod settings;
pub mod stores;

pub use config::{load_scraper_config, load_scraper_config_from_env, ConfigError, ScraperConfig};
pub use settings::{RenderProxyConfig, SettingsCache, SettingsSnapshot};
pub use stores::{LocalStoreConfig, StoreId};
