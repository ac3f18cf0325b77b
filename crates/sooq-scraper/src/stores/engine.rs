//! The shared scraping flow every store profile runs through.
//!
//! Link hygiene, fetch chain, name/image extraction, price disambiguation,
//! currency settlement. Partial results survive a failed price extraction:
//! a failure that got as far as a name carries it for caller display.

use sooq_core::SettingsSnapshot;

use crate::currency::{convert_with_rates, SETTLEMENT_CURRENCY};
use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::meta;
use crate::price;
use crate::types::ScrapedProduct;

use super::StoreProfile;

/// A scrape failure plus whatever was recovered before it.
pub(crate) struct EngineFailure {
    pub error: ScrapeError,
    pub partial_name: Option<String>,
    pub partial_image: Option<String>,
}

impl From<ScrapeError> for EngineFailure {
    fn from(error: ScrapeError) -> Self {
        Self {
            error,
            partial_name: None,
            partial_image: None,
        }
    }
}

pub(crate) async fn scrape_with_profile(
    fetcher: &Fetcher,
    profile: &StoreProfile,
    url: &str,
    settings: &SettingsSnapshot,
) -> Result<ScrapedProduct, EngineFailure> {
    reject_blocked_hosts(profile, url)?;

    let outcome = fetcher
        .run_chain(profile.fetch_plan, url, profile.store, settings)
        .await?;

    let name = meta::extract_name(&outcome.html, profile.name_selectors, profile.title_suffixes);
    let image = meta::extract_image(&outcome.html, profile.image_selectors, url);

    let Some(candidate) =
        price::resolve_price(&outcome.html, url, &profile.rules, &outcome.payloads)
    else {
        return Err(EngineFailure {
            error: ScrapeError::MissingPrice {
                store: profile.store,
            },
            partial_name: name,
            partial_image: image,
        });
    };

    let Some(name) = name else {
        return Err(EngineFailure {
            error: ScrapeError::MissingName {
                store: profile.store,
            },
            partial_name: None,
            partial_image: image,
        });
    };

    let source_currency = candidate
        .currency
        .as_deref()
        .unwrap_or(profile.rules.default_currency);
    let settled = convert_with_rates(candidate.value, source_currency, &settings.currency_rates);

    tracing::info!(
        store = %profile.store,
        price = settled,
        source_currency,
        stage = ?candidate.source,
        context = %candidate.context,
        "product scraped"
    );

    Ok(ScrapedProduct {
        name,
        price: settled,
        currency: SETTLEMENT_CURRENCY.to_string(),
        image: image.unwrap_or_default(),
        store: profile.store,
        url: url.to_string(),
    })
}

/// App deep links and in-app shorteners serve an interstitial instead of
/// the product page; fail fast with a remediation instead of burning the
/// whole fetch chain on them.
fn reject_blocked_hosts(profile: &StoreProfile, url: &str) -> Result<(), ScrapeError> {
    let Ok(parsed) = url::Url::parse(url) else {
        return Ok(());
    };
    let Some(host) = parsed.host_str() else {
        return Ok(());
    };
    let host_lower = host.to_lowercase();

    for blocked in profile.blocked_hosts {
        if host_lower.contains(blocked.fragment) {
            return Err(ScrapeError::AppLinkRejected {
                store: profile.store,
                host: host.to_string(),
                suggestion: blocked.suggestion,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sooq_core::StoreId;

    use super::super::profile_for;
    use super::*;

    #[test]
    fn aliexpress_app_short_link_is_rejected() {
        let profile = profile_for(StoreId::Aliexpress);
        let err = reject_blocked_hosts(&profile, "https://a.aliexpress.com/_mqXYZ").unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::AppLinkRejected {
                store: StoreId::Aliexpress,
                ..
            }
        ));
    }

    #[test]
    fn normal_product_links_pass_hygiene() {
        let profile = profile_for(StoreId::Aliexpress);
        assert!(
            reject_blocked_hosts(&profile, "https://www.aliexpress.com/item/100500.html").is_ok()
        );
    }

    #[test]
    fn shein_app_api_host_is_rejected() {
        let profile = profile_for(StoreId::Shein);
        let err = reject_blocked_hosts(&profile, "https://api-shein.shein.com/h5/share/9")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::AppLinkRejected { .. }));
    }
}
