//! Namshi profile. Next.js storefront; the `__NEXT_DATA__` blob carries
//! the product record when the rendered DOM lags behind.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec, GENERIC_EXCLUSIONS};

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(3000),
        country: Some("sa"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: r#"[class*="ProductPrice"], [class*="product-price"]"#,
    attr: None,
}];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "h1",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: r#"[class*="ImageGallery"] img"#,
    attr: Some("src"),
}];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Namshi,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Namshi,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &["__NEXT_DATA__"],
            exclusion_list: GENERIC_EXCLUSIONS,
            plausible_min: 1.0,
            plausible_max: 30_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" | Namshi Saudi Arabia", " | Namshi"],
    }
}
