//! Noon profile. Mostly server-rendered with a hydration state blob; the
//! rendered proxy pass covers listings where the price mounts client-side.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec};

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(3000),
        country: Some("sa"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: r#"[data-qa="div-price-now"]"#,
        attr: None,
    },
    SelectorSpec {
        css: ".priceNow",
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: r#"h1[data-qa="pdp-name"]"#,
        attr: None,
    },
    SelectorSpec {
        css: "h1",
        attr: None,
    },
];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: ".gallery img",
    attr: Some("src"),
}];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Noon,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Noon,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &["__INITIAL_STATE__", "window.__data"],
            exclusion_list: &[1.0, 2.0, 3.0, 5.0, 10.0, 12.0, 15.0],
            plausible_min: 1.0,
            plausible_max: 150_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" | noon", " - noon", " | نون"],
    }
}
