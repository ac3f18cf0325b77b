//! Per-store profiles.
//!
//! One scraping engine, many profiles: each built-in store contributes a
//! [`StoreProfile`] — fetch plan, price rules, name/image selectors, and
//! link hygiene — and [`engine::scrape_with_profile`] runs the shared flow
//! against it. Adding a store means adding a profile module, not a scraper.

pub(crate) mod engine;

mod aliexpress;
mod amazon;
mod iherb;
mod local;
mod namshi;
mod niceone;
mod noon;
mod shein;
mod temu;
mod trendyol;

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec};

/// A host fragment that identifies an unscrapeable share link (app deep
/// links, tracking shorteners that resolve inside the store's app only).
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockedHost {
    pub fragment: &'static str,
    /// User-facing remediation, surfaced verbatim in the failure.
    pub suggestion: &'static str,
}

/// Everything the engine needs to scrape one store.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StoreProfile {
    pub store: StoreId,
    pub fetch_plan: &'static [FetchStrategy],
    pub rules: PriceRules,
    pub name_selectors: &'static [SelectorSpec],
    pub image_selectors: &'static [SelectorSpec],
    pub blocked_hosts: &'static [BlockedHost],
    /// Boilerplate trailers stripped from `<title>` fallback names.
    pub title_suffixes: &'static [&'static str],
}

/// Profile lookup for a detected store. `Local` and `Other` share the
/// generic profile; `Other` never reaches the engine in practice because
/// the dispatcher rejects it first.
pub(crate) fn profile_for(store: StoreId) -> StoreProfile {
    match store {
        StoreId::Amazon => amazon::profile(),
        StoreId::Noon => noon::profile(),
        StoreId::Shein => shein::profile(),
        StoreId::Aliexpress => aliexpress::profile(),
        StoreId::Temu => temu::profile(),
        StoreId::Iherb => iherb::profile(),
        StoreId::Niceonesa => niceone::profile(),
        StoreId::Namshi => namshi::profile(),
        StoreId::Trendyol => trendyol::profile(),
        StoreId::Local | StoreId::Other => local::profile(store),
    }
}
