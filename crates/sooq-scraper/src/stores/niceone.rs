//! NiceOne (niceonesa.com) profile. Conventional OpenCart-style markup;
//! the generic selector set plus a couple of theme containers covers it.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec, GENERIC_EXCLUSIONS};

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(2000),
        country: Some("sa"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: ".product-price-new, .price-new",
        attr: None,
    },
    SelectorSpec {
        css: ".product-price",
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "h1.product-name, h1",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: ".product-image img",
    attr: Some("src"),
}];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Niceonesa,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Niceonesa,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &[],
            exclusion_list: GENERIC_EXCLUSIONS,
            plausible_min: 1.0,
            plausible_max: 20_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" | نايس ون", " | NiceOne"],
    }
}
