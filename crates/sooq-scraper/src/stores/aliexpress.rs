//! AliExpress profile. App share links (`a.aliexpress.com/_m...`) resolve
//! only inside the app and are rejected up front; the web product page
//! ships its record in the `window.runParams` state blob.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::{PriceRules, SelectorSpec};

use super::{BlockedHost, StoreProfile};

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(3000),
        country: Some("sa"),
    },
    FetchStrategy::Browser {
        wait_selector: Some(".product-price-value"),
    },
];

const PRICE_SELECTORS: &[SelectorSpec] = &[
    SelectorSpec {
        css: ".product-price-value",
        attr: None,
    },
    SelectorSpec {
        css: r#"[class*="currentPrice"]"#,
        attr: None,
    },
];

const NAME_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: "h1[data-pl], .product-title-text",
    attr: None,
}];

const IMAGE_SELECTORS: &[SelectorSpec] = &[SelectorSpec {
    css: ".magnifier-image, .image-view img",
    attr: Some("src"),
}];

const BLOCKED_HOSTS: &[BlockedHost] = &[BlockedHost {
    fragment: "a.aliexpress",
    suggestion:
        "Open the link in your browser first, then copy the full product address \
         (it starts with aliexpress.com/item/).",
}];

pub(super) fn profile() -> StoreProfile {
    StoreProfile {
        store: StoreId::Aliexpress,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store: StoreId::Aliexpress,
            url_param: None,
            price_selectors: PRICE_SELECTORS,
            state_markers: &["runParams"],
            exclusion_list: &[1.0, 2.0, 3.0, 5.0, 10.0],
            plausible_min: 0.5,
            plausible_max: 100_000.0,
            variant_proximity: false,
            default_currency: "SAR",
        },
        name_selectors: NAME_SELECTORS,
        image_selectors: IMAGE_SELECTORS,
        blocked_hosts: BLOCKED_HOSTS,
        title_suffixes: &[" - AliExpress", "| AliExpress"],
    }
}
