//! Trendyol profile.
//!
//! Turkish storefront: prices render in TRY regardless of the shopper's
//! country, so the default currency differs from every other profile and
//! settlement conversion always runs. The product record ships in the
//! `__PRODUCT_DETAIL_APP_INITIAL_STATE__` global; the proxy exits through
//! Turkey because the catalog is geo-fenced.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec, GENERIC_EXCLUSIONS};

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(3000),
        country: Some("tr"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: ".prc-dsc",
        attr: None,
    },
    SelectorSpec {
        css: ".prc-slg",
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "h1.pr-new-br, h1",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: ".base-product-image img",
    attr: Some("src"),
}];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Trendyol,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Trendyol,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &["__PRODUCT_DETAIL_APP_INITIAL_STATE__"],
            exclusion_list: GENERIC_EXCLUSIONS,
            plausible_min: 1.0,
            plausible_max: 500_000.0,
            variant_proximity: false,
            default_currency: "TRY",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" - Trendyol", " | Trendyol"],
    }
}
