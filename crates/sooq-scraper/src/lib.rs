//! Multi-store product scraping core.
//!
//! Turns raw user input (a pasted product link, possibly wrapped in prose)
//! into a normalized product — name, settled SAR price, image — or a typed,
//! user-facing failure. The pipeline:
//!
//! 1. [`urlnorm`] — recover a clean URL from pasted text
//! 2. [`detect`] — classify it into a supported store
//! 3. [`fetch`] — run the store's fetch-strategy chain
//! 4. [`price`] — disambiguate the one true current price
//! 5. [`currency`] — settle into SAR
//!
//! [`Scraper::scrape_product`] is the front door; everything else is
//! exposed for hosts that need individual stages (re-scrapes, admin
//! tooling, tests).

pub mod currency;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod fetch;
mod meta;
pub mod price;
mod stores;
pub mod types;
pub mod urlnorm;

pub use currency::{round_price, SETTLEMENT_CURRENCY};
pub use detect::{detect_store, Detection};
pub use dispatch::Scraper;
pub use error::ScrapeError;
pub use fetch::{FetchStrategy, Fetcher};
pub use types::{ScrapeFailure, ScrapeOutcome, ScrapedProduct};
pub use urlnorm::normalize_input;
