//! Price disambiguation engine.
//!
//! A product page exposes many numbers that look like prices: the current
//! sale price, the struck-through original, sibling variant prices, coupon
//! amounts, shipping thresholds. The engine runs extraction stages in a
//! strict confidence order — URL-embedded params, JSON-LD, DOM selectors,
//! embedded state JSON, free-text scan — and the FIRST stage yielding any
//! candidate that survives the shared filters wins. Within a stage,
//! disambiguation falls to the smallest-plausible tie-break, overridden by
//! variant-proximity correlation for stores that encode a variant id in the
//! URL path.
//!
//! The shape of this cascade is the reusable design; everything tuned per
//! store lives in [`rules::PriceRules`].

pub(crate) mod dom;
pub(crate) mod jsonld;
pub(crate) mod num;
pub mod rules;
pub(crate) mod state_json;
pub(crate) mod text_scan;

use regex::Regex;
use std::sync::OnceLock;

use crate::currency::round_price;
use crate::types::{CandidatePrice, PriceSource};

use rules::{PriceRules, UrlParamFormat};

/// Maximum byte distance in raw markup between a variant id occurrence and
/// a price occurrence for proximity correlation to claim the pair belong
/// together. Product markup keeps a variant's own price within its option
/// block; unrelated prices live in different page regions.
const VARIANT_PROXIMITY_WINDOW: usize = 800;

/// Two candidates closer than this are the same price rendered twice
/// (header + buy box); treated as equal for exclusion matching.
const VALUE_EPSILON: f64 = 0.005;

/// Resolves at most one authoritative current price from page content.
///
/// `extra_payloads` carries JSON bodies intercepted by the headless-browser
/// strategy; they are consulted in the state-JSON stage position since they
/// are the same kind of signal fetched a different way.
#[must_use]
pub fn resolve_price(
    html: &str,
    url: &str,
    rules: &PriceRules,
    extra_payloads: &[serde_json::Value],
) -> Option<CandidatePrice> {
    // Stage 1: URL-embedded price parameters (authoritative — they mirror
    // exactly what the user's browser rendered).
    if let Some(fmt) = &rules.url_param {
        if let Some(candidate) = from_url_param(url, fmt) {
            if survives_filters(&candidate, rules) {
                tracing::debug!(value = candidate.value, "price resolved from URL param");
                return Some(finish(candidate, rules));
            }
        }
    }

    let stages: [(&str, Vec<CandidatePrice>); 4] = [
        (
            "jsonld",
            jsonld::extract_candidates(html, rules.default_currency),
        ),
        ("dom", dom::extract_candidates(html, rules)),
        ("state", {
            let mut cands = state_json::extract_candidates(html, rules.state_markers);
            for payload in extra_payloads {
                collect_payload_candidates(payload, &mut cands);
            }
            cands
        }),
        ("text", text_scan::extract_candidates(html)),
    ];

    for (stage, candidates) in stages {
        let surviving: Vec<CandidatePrice> = candidates
            .into_iter()
            .filter(|c| survives_filters(c, rules))
            .collect();
        if surviving.is_empty() {
            continue;
        }
        tracing::debug!(
            stage,
            count = surviving.len(),
            store = %rules.store,
            "price candidates survived filtering"
        );
        let chosen = tie_break(surviving, html, url, rules);
        return Some(finish(chosen, rules));
    }

    None
}

fn finish(mut candidate: CandidatePrice, rules: &PriceRules) -> CandidatePrice {
    candidate.value = round_price(candidate.value);
    if candidate.currency.is_none() {
        candidate.currency = Some(rules.default_currency.to_string());
    }
    candidate
}

/// Shared cross-stage filters: exclusion list and plausibility window.
fn survives_filters(candidate: &CandidatePrice, rules: &PriceRules) -> bool {
    if rules
        .exclusion_list
        .iter()
        .any(|decoy| (candidate.value - decoy).abs() < VALUE_EPSILON)
    {
        return false;
    }
    candidate.value >= rules.plausible_min && candidate.value <= rules.plausible_max
}

/// Picks one candidate from the survivors of a single stage.
///
/// Default: smallest plausible value — the current/discounted price is
/// almost always smaller than the original/struck-through one. Stores with
/// URL-encoded variant ids override this with proximity correlation so a
/// larger-size variant's higher price is not lost to the generic rule.
fn tie_break(
    mut candidates: Vec<CandidatePrice>,
    html: &str,
    url: &str,
    rules: &PriceRules,
) -> CandidatePrice {
    debug_assert!(!candidates.is_empty());

    if candidates.len() == 1 {
        return candidates.remove(0);
    }

    if rules.variant_proximity {
        if let Some(variant_id) = variant_id_from_url(url) {
            if let Some(best) = proximity_pick(&candidates, html, &variant_id) {
                return candidates.swap_remove(best);
            }
            if let Some(best) = monotonic_guess(&candidates, html, &variant_id) {
                tracing::debug!(
                    variant_id,
                    "proximity correlation failed; using monotonic variant-order guess"
                );
                return candidates.swap_remove(best);
            }
        }
    }

    candidates
        .into_iter()
        .min_by(|a, b| a.value.total_cmp(&b.value))
        .expect("candidates non-empty")
}

/// Parses a delimited price parameter out of the URL query string, e.g.
/// `goods_pr=SKC123!SAR!199!149` with `sale_index` selecting `149`.
fn from_url_param(url: &str, fmt: &UrlParamFormat) -> Option<CandidatePrice> {
    let parsed = url::Url::parse(url).ok()?;
    let raw = parsed
        .query_pairs()
        .find(|(k, _)| k == fmt.param)
        .map(|(_, v)| v.into_owned())?;

    let parts: Vec<&str> = raw.split(fmt.delimiter).collect();
    let value = num::parse_price_str(parts.get(fmt.sale_index)?)?;
    if value <= 0.0 {
        return None;
    }
    let currency = parts
        .get(fmt.currency_index)
        .filter(|c| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(|c| c.to_uppercase());

    Some(CandidatePrice {
        value,
        currency,
        source: PriceSource::UrlParam,
        context: format!("url:{}", fmt.param),
    })
}

/// Extracts a variant id from the URL: the last purely numeric path
/// segment of 3+ digits (`/pr/vitamin-c-1000mg/1891`), or a numeric `pid`/
/// `sku`/`vid` query value.
fn variant_id_from_url(url: &str) -> Option<String> {
    static SEG_RE: OnceLock<Regex> = OnceLock::new();
    let seg_re = SEG_RE.get_or_init(|| Regex::new(r"/(\d{3,})(?:[/?#]|$)").expect("valid regex"));

    if let Ok(parsed) = url::Url::parse(url) {
        for key in ["pid", "sku", "vid", "variant"] {
            if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == key) {
                if v.len() >= 3 && v.chars().all(|c| c.is_ascii_digit()) {
                    return Some(v.into_owned());
                }
            }
        }
    }

    seg_re
        .captures_iter(url)
        .last()
        .map(|cap| cap[1].to_string())
}

/// Correlates candidates with the variant id by byte distance in the raw
/// markup: the candidate whose rendered value sits closest to an occurrence
/// of the variant id (within the window) is the variant's own price.
fn proximity_pick(candidates: &[CandidatePrice], html: &str, variant_id: &str) -> Option<usize> {
    let id_positions = all_positions(html, variant_id);
    if id_positions.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize)> = None; // (distance, index)
    for (idx, candidate) in candidates.iter().enumerate() {
        for rendering in value_renderings(candidate.value) {
            for price_pos in all_positions(html, &rendering) {
                for &id_pos in &id_positions {
                    let distance = price_pos.abs_diff(id_pos);
                    if distance <= VARIANT_PROXIMITY_WINDOW
                        && best.is_none_or(|(d, _)| distance < d)
                    {
                        best = Some((distance, idx));
                    }
                }
            }
        }
    }
    best.map(|(_, idx)| idx)
}

/// Last-resort variant tie-break when proximity finds nothing: in observed
/// store conventions, lower variant id numbers were assigned to the
/// larger-size (and higher-priced) variants. If the URL's variant id is
/// the smallest among sibling ids visible in the markup, take the largest
/// surviving price; if it is the largest id, take the smallest price.
/// Anything in between stays with the default smallest-plausible rule.
/// This is a best-effort guess, not a guaranteed-correct algorithm.
fn monotonic_guess(candidates: &[CandidatePrice], html: &str, variant_id: &str) -> Option<usize> {
    let own: u64 = variant_id.parse().ok()?;
    let sibling_ids = sibling_variant_ids(html, variant_id);
    if sibling_ids.is_empty() {
        return None;
    }

    let min_sibling = *sibling_ids.iter().min().expect("non-empty");
    let max_sibling = *sibling_ids.iter().max().expect("non-empty");

    let pick_largest = own < min_sibling;
    let pick_smallest = own > max_sibling;
    if !pick_largest && !pick_smallest {
        return None;
    }

    let mut best_idx = 0;
    for (idx, c) in candidates.iter().enumerate() {
        let better = if pick_largest {
            c.value > candidates[best_idx].value
        } else {
            c.value < candidates[best_idx].value
        };
        if better {
            best_idx = idx;
        }
    }
    Some(best_idx)
}

/// Numeric tokens in the markup with the same digit count as the variant
/// id, excluding the id itself — a cheap proxy for sibling variant ids.
fn sibling_variant_ids(html: &str, variant_id: &str) -> Vec<u64> {
    static NUM_RE: OnceLock<Regex> = OnceLock::new();
    let re = NUM_RE.get_or_init(|| Regex::new(r"\b(\d{3,})\b").expect("valid regex"));

    let own_len = variant_id.len();
    let mut ids = Vec::new();
    for cap in re.captures_iter(html) {
        let tok = &cap[1];
        if tok.len() == own_len && tok != variant_id {
            if let Ok(v) = tok.parse::<u64>() {
                if !ids.contains(&v) {
                    ids.push(v);
                }
            }
        }
        if ids.len() >= 32 {
            break;
        }
    }
    ids
}

/// Renderings of a price value as it may appear in markup: bare integer,
/// 2-decimal, and 1-decimal forms.
fn value_renderings(value: f64) -> Vec<String> {
    let mut out = Vec::new();
    if (value - value.trunc()).abs() < f64::EPSILON {
        out.push(format!("{value:.0}"));
    }
    out.push(format!("{value:.2}"));
    out.push(format!("{value:.1}"));
    out
}

fn all_positions(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        positions.push(from + pos);
        from += pos + needle.len();
        if positions.len() >= 64 {
            break;
        }
    }
    positions
}

/// Runs the state-JSON accept rules over a browser-intercepted payload.
fn collect_payload_candidates(payload: &serde_json::Value, out: &mut Vec<CandidatePrice>) {
    let rendered = payload.to_string();
    let html = format!("<script>window.interceptedPayload = {rendered};</script>");
    out.extend(state_json::extract_candidates(&html, &["interceptedPayload"]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules::{PriceRules, SelectorSpec, UrlParamFormat};
    use sooq_core::StoreId;

    fn rules() -> PriceRules {
        PriceRules::generic()
    }

    fn proximity_rules() -> PriceRules {
        PriceRules {
            store: StoreId::Iherb,
            variant_proximity: true,
            ..PriceRules::generic()
        }
    }

    // -----------------------------------------------------------------------
    // Stage ordering and filters
    // -----------------------------------------------------------------------

    #[test]
    fn url_param_outranks_page_content() {
        let rules = PriceRules {
            url_param: Some(UrlParamFormat {
                param: "goods_pr",
                delimiter: '!',
                currency_index: 1,
                sale_index: 3,
            }),
            ..rules()
        };
        let html = r#"<span class="price">999 SAR</span>"#;
        let url = "https://ar.shein.com/item/1.html?goods_pr=SKC1!SAR!199!149";
        let resolved = resolve_price(html, url, &rules, &[]).unwrap();
        assert_eq!(resolved.value, 149.0);
        assert_eq!(resolved.source, PriceSource::UrlParam);
        assert_eq!(resolved.currency.as_deref(), Some("SAR"));
    }

    #[test]
    fn jsonld_outranks_dom() {
        let html = r#"
        <script type="application/ld+json">
        {"@type":"Product","offers":{"price":"120.00","priceCurrency":"SAR"}}
        </script>
        <span class="price">150 SAR</span>"#;
        let resolved = resolve_price(html, "https://x.sa/p/1", &rules(), &[]).unwrap();
        assert_eq!(resolved.value, 120.0);
        assert_eq!(resolved.source, PriceSource::JsonLd);
    }

    #[test]
    fn exclusion_listed_decoys_never_win() {
        // Only exclusion-listed values present near a currency token: the
        // engine must produce nothing rather than a false positive.
        let html = "<p>Delivery from 10 SAR — orders under 5 SAR not accepted</p>";
        assert!(resolve_price(html, "https://x.sa/p/1", &rules(), &[]).is_none());
    }

    #[test]
    fn out_of_range_values_are_discarded() {
        let tight = PriceRules {
            plausible_min: 20.0,
            plausible_max: 1000.0,
            ..rules()
        };
        let html = r#"<span class="price">4.00</span><span class="price">1200000</span>"#;
        assert!(resolve_price(html, "https://x.sa/p/1", &tight, &[]).is_none());
    }

    #[test]
    fn smallest_plausible_wins_within_a_stage() {
        let html = r#"<span class="price">199 SAR</span><span class="price">149 SAR</span>"#;
        let resolved = resolve_price(html, "https://x.sa/p/1", &rules(), &[]).unwrap();
        assert_eq!(resolved.value, 149.0);
    }

    #[test]
    fn strikethrough_decoy_resolves_to_current_price() {
        let html = r#"
            <span style="text-decoration:line-through">199 SAR</span>
            <span>149 SAR</span>"#;
        // No selector matches these bare spans; the text stage sees both
        // numbers but the DOM stage never offers the struck-through one.
        // Run through the full cascade to prove the end result is 149.
        let resolved = resolve_price(html, "https://x.sa/p/1", &rules(), &[]).unwrap();
        assert_eq!(resolved.value, 149.0);
    }

    #[test]
    fn savings_callout_does_not_beat_the_price_line() {
        // Only the text stage sees these numbers; the savings callout is
        // smaller than the real price and must not win the tie-break.
        let html = "<p>You save 120 SAR</p><p>Price: 149 SAR</p>";
        let resolved = resolve_price(html, "https://x.sa/p/1", &rules(), &[]).unwrap();
        assert_eq!(resolved.value, 149.0);
    }

    // -----------------------------------------------------------------------
    // Variant proximity
    // -----------------------------------------------------------------------

    #[test]
    fn proximity_beats_smallest_value_rule() {
        // Variant 1891 sits directly next to 519 in the markup; 499 is a
        // different size's price. Proximity must override smallest-wins.
        let spacer = " ".repeat(VARIANT_PROXIMITY_WINDOW + 100);
        let html = format!(
            r#"<div data-part="94158">capsules x90 <span>499.00 SAR</span></div>{spacer}
               <div data-part="1891">capsules x180 <span>519.00 SAR</span></div>"#
        );
        let url = "https://sa.iherb.com/pr/vitamin-c/1891";
        let resolved = resolve_price(&html, url, &proximity_rules(), &[]).unwrap();
        assert_eq!(resolved.value, 519.0);
    }

    #[test]
    fn proximity_disabled_falls_back_to_smallest() {
        let html = r#"
            <div data-part="1891"><span>519.00 SAR</span></div>
            <div data-part="94158"><span>499.00 SAR</span></div>"#;
        let url = "https://sa.iherb.com/pr/vitamin-c/1891";
        let resolved = resolve_price(html, url, &rules(), &[]).unwrap();
        assert_eq!(resolved.value, 499.0);
    }

    #[test]
    fn monotonic_guess_applies_when_proximity_fails() {
        // The variant id appears nowhere near either price (beyond the
        // window), but it is numerically lower than every sibling id, so
        // the guess picks the larger price.
        let filler = "x".repeat(VARIANT_PROXIMITY_WINDOW + 50);
        let html = format!(
            r#"<div>ids: 1891 5023 6677</div>{filler}
               <span>519.00 SAR</span><span>499.00 SAR</span>"#
        );
        let url = "https://sa.iherb.com/pr/vitamin-c/1891";
        let resolved = resolve_price(&html, url, &proximity_rules(), &[]).unwrap();
        assert_eq!(resolved.value, 519.0);
    }

    // -----------------------------------------------------------------------
    // Browser payloads and rounding
    // -----------------------------------------------------------------------

    #[test]
    fn intercepted_payloads_feed_the_state_stage() {
        let payload = serde_json::json!({"sku": {"salePrice": 77.5}});
        let resolved =
            resolve_price("<html></html>", "https://x.sa/p/1", &rules(), &[payload]).unwrap();
        assert_eq!(resolved.value, 77.5);
        assert_eq!(resolved.source, PriceSource::StateJson);
    }

    #[test]
    fn near_integer_prices_floor() {
        let html = r#"<meta itemprop="price" content="149.01">"#;
        let resolved = resolve_price(html, "https://x.sa/p/1", &rules(), &[]).unwrap();
        assert_eq!(resolved.value, 149.0);
    }

    #[test]
    fn default_currency_fills_bare_candidates() {
        let html = r#"<meta itemprop="price" content="60.00">"#;
        let resolved = resolve_price(html, "https://x.sa/p/1", &rules(), &[]).unwrap();
        assert_eq!(resolved.currency.as_deref(), Some("SAR"));
    }

    #[test]
    fn variant_id_extraction_reads_path_and_query() {
        assert_eq!(
            variant_id_from_url("https://sa.iherb.com/pr/x/1891").as_deref(),
            Some("1891")
        );
        assert_eq!(
            variant_id_from_url("https://x.sa/p?pid=445566").as_deref(),
            Some("445566")
        );
        assert!(variant_id_from_url("https://x.sa/about").is_none());
    }

    #[test]
    fn selector_spec_attribute_order_is_static() {
        // Guard: the generic list keeps attribute specs ahead of text specs.
        let first_text_spec = rules::GENERIC_PRICE_SELECTORS
            .iter()
            .position(|s: &SelectorSpec| s.attr.is_none())
            .unwrap();
        assert!(rules::GENERIC_PRICE_SELECTORS[..first_text_spec]
            .iter()
            .all(|s| s.attr.is_some()));
    }
}
