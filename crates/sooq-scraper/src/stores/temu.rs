//! Temu profile. Client-rendered storefront behind strong bot detection;
//! goes straight to the rendered proxy and escalates to the browser, whose
//! intercepted API payloads usually carry the price when the DOM does not.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec};

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(5000),
        country: Some("sa"),
    },
    FetchStrategy::Browser {
        wait_selector: Some(r#"[class*="goods"]"#),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: r#"[data-type="price"]"#,
        attr: None,
    },
    SelectorSpec {
        css: r#"[class*="curPrice"], [class*="salePrice"]"#,
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "h1",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Temu,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Temu,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &["rawData", "window.rawData"],
            exclusion_list: &[1.0, 2.0, 3.0, 5.0, 10.0],
            plausible_min: 0.5,
            plausible_max: 50_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" | Temu Saudi Arabia", " - Temu"],
    }
}
