//! Amazon.sa profile.
//!
//! Server-rendered; a direct fetch with good headers works most of the
//! time, with the proxy as the fallback for 503 interstitials. The buy-box
//! price lives in `.a-offscreen` spans; struck list prices sit in
//! `.basisPrice` containers the decoy filter catches via their
//! `a-text-price` strike styling.

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
        css: "#corePrice_feature_div .a-price .a-offscreen",
        attr: None,
    },
    SelectorSpec {
        css: ".priceToPay .a-offscreen",
        attr: None,
    },
    SelectorSpec {
        css: "#priceblock_ourprice, #priceblock_dealprice",
        attr: None,
    },
    SelectorSpec {
        css: ".a-price:not(.a-text-price) .a-offscreen",
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "#productTitle",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: "#landingImage",
        attr: Some("data-old-hires"),
    },
    SelectorSpec {
        css: "#landingImage",
        attr: Some("src"),
    },
];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Amazon,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Amazon,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &[],
            exclusion_list: &[1.0, 2.0, 3.0, 5.0, 10.0, 12.0],
            plausible_min: 1.0,
            plausible_max: 200_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: &[],
        title_suffixes: &[" : Amazon.sa", " | Amazon.sa", " - Amazon.sa"],
    }
}
