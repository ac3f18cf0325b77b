//! SHEIN profile.
//!
//! The hardest store in the set: fully client-rendered, aggressive bot
//! detection, regional app hosts that refuse non-app clients. Share links
//! from the web app carry a `goods_pr` query parameter encoding the exact
//! displayed price (`code!CURRENCY!base!sale`); when present it resolves
//! the price without touching the page at all.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec, UrlParamFormat};

use super::{BlockedHost, StoreProfile};

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(5000),
        country: Some("sa"),
    },
    FetchStrategy::Browser {
        wait_selector: Some(".product-intro__head-price"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: ".product-intro__head-price .from",
        attr: None,
    },
    SelectorSpec {
        css: ".product-intro__head-mainprice",
        attr: None,
    },
    SelectorSpec {
        css: r#"[class*="discountPrice"]"#,
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: ".product-intro__head-name",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: ".crop-image-container img",
    attr: Some("src"),
}];

const BLOCKED_HOSTS: &[BlockedHost] = &[
    BlockedHost {
        fragment: "api-shein",
        suggestion: "Open the product in your browser and copy the address bar link.",
    },
    BlockedHost {
        fragment: "sheinsz.ltd",
        suggestion: "Open the product in your browser and copy the address bar link.",
    },
];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Shein,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Shein,
            url_param: Some(UrlParamFormat {
                param: "goods_pr",
                delimiter: '!',
                currency_index: 1,
                sale_index: 3,
            }),
            price_selectors: PRICE_SELECTORS,
            state_markers: &["productIntroData", "goods_detail"],
            exclusion_list: &[1.0, 2.0, 3.0, 5.0, 10.0],
            plausible_min: 1.0,
            plausible_max: 50_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: BLOCKED_HOSTS,
        title_suffixes: &[" | SHEIN Saudi Arabia", " | SHEIN"],
    }
}
