//! iHerb profile.
//!
//! The one store where variant proximity earns its keep: product URLs end
//! in a numeric part id (`/pr/vitamin-c-1000mg/1891`), sibling pack sizes
//! render their prices on the same page, and the URL's variant is not
//! always the cheapest. Smallest-plausible alone would routinely return a
//! smaller pack's price.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec};

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: false,
        wait_ms: None,
        country: Some("sa"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: "#price",
        attr: None,
    },
    SelectorSpec {
        css: ".price-inner .price",
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "#name, h1#name",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "#iherb-product-image",
    attr: Some("src"),
}];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Iherb,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Iherb,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &[],
            exclusion_list: &[1.0, 2.0, 3.0, 5.0, 10.0],
            plausible_min: 1.0,
            plausible_max: 20_000.0,
            variant_proximity: true,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" - iHerb", " | iHerb"],
    }
}
