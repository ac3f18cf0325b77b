//! Profile for operator-defined local stores (and the `Other` terminal,
//! which never reaches the engine). No store-specific knowledge exists for
//! arbitrary domains: generic selectors, generic exclusions, a rendered
//! proxy pass for single-page storefronts.

use sooq_core::StoreId;

use crate::fetch::FetchStrategy;
use crate::price::rules::PriceRules;

use super::StoreProfile;

const FETCH_PLAN: &[FetchStrategy] = &[
    FetchStrategy::Direct,
    FetchStrategy::RenderProxy {
        render: true,
        wait_ms: Some(2000),
        country: None,
    },
];

pub(super) fn profile(store: StoreId) -> StoreProfile {
    StoreProfile {
        store,
        fetch_plan: FETCH_PLAN,
        rules: PriceRules {
            store,
            ..PriceRules::generic()
        },
        name_selectors: &[],
        image_selectors: &[],
        blocked_hosts: &[],
        title_suffixes: &[],
    }
}
