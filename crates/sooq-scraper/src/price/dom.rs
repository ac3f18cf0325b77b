//! Stage 3: CSS/DOM selector extraction with decoy filtering.
//!
//! Selector order comes from the store's [`PriceRules`]; attribute-based
//! specs run before text specs by construction of those lists. A match is
//! discarded when the node (or a wrapping ancestor) is visually struck
//! through or sits next to savings language — those are original-price
//! decoys even when numerically plausible.

use scraper::{ElementRef, Html, Selector};

use crate::types::{CandidatePrice, PriceSource};

use super::num::parse_price_str;
use super::rules::{PriceRules, SelectorSpec};

/// Substrings of class names that mark an original/struck-through price
/// container across the supported storefronts.
const STRIKE_CLASS_MARKERS: [&str; 7] = [
    "line-through",
    "strike",
    "old-price",
    "was-price",
    "compare",
    "origin-price",
    "del-price",
];

/// Savings language that disqualifies adjacent numbers, English and Arabic.
/// Shared with the free-text stage, which applies it over a character
/// window instead of a parent node.
pub(super) const SAVINGS_MARKERS: [&str; 6] =
    ["you save", "save ", "discount", "% off", "خصم", "توفير"];

/// Harvests candidates from the store's price selectors, first selector
/// with any usable match wins (the list is ordered by confidence, so mixing
/// candidates across selectors would let a generic `.price` match dilute a
/// specific current-price container).
pub(crate) fn extract_candidates(html: &str, rules: &PriceRules) -> Vec<CandidatePrice> {
    let doc = Html::parse_document(html);

    for spec in rules.price_selectors {
        let candidates = candidates_for_spec(&doc, spec);
        if !candidates.is_empty() {
            return candidates;
        }
    }
    Vec::new()
}

fn candidates_for_spec(doc: &Html, spec: &SelectorSpec) -> Vec<CandidatePrice> {
    let Ok(selector) = Selector::parse(spec.css) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for element in doc.select(&selector) {
        if is_decoy_node(&element) {
            continue;
        }

        let raw = match spec.attr {
            Some(attr) => element.value().attr(attr).map(str::to_string),
            None => {
                let text: String = element.text().collect::<Vec<_>>().join(" ");
                let text = text.trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
        };

        let Some(raw) = raw else { continue };
        if near_savings_language(&element) {
            continue;
        }
        if let Some(value) = parse_price_str(&raw) {
            out.push(CandidatePrice {
                value,
                currency: None,
                source: PriceSource::DomSelector,
                context: format!("css:{}", spec.css),
            });
        }
    }
    out
}

/// True when the element or any ancestor within a few levels is styled as
/// struck-through (`<del>`, `<s>`, `text-decoration: line-through`, or a
/// strike-marker class).
fn is_decoy_node(element: &ElementRef) -> bool {
    let mut current = Some(*element);
    // Three levels is enough in observed markup; prices are leaf-ish.
    for _ in 0..3 {
        let Some(el) = current else { break };
        let v = el.value();

        if matches!(v.name(), "del" | "s" | "strike") {
            return true;
        }
        if v.attr("style")
            .is_some_and(|s| s.to_ascii_lowercase().contains("line-through"))
        {
            return true;
        }
        if let Some(class) = v.attr("class") {
            let class = class.to_ascii_lowercase();
            if STRIKE_CLASS_MARKERS.iter().any(|m| class.contains(m)) {
                return true;
            }
        }

        current = el.parent().and_then(ElementRef::wrap);
    }
    false
}

/// True when the parent node's text puts this number inside a savings
/// callout ("You save SAR 50", "خصم 20%").
fn near_savings_language(element: &ElementRef) -> bool {
    let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
        return false;
    };
    let text: String = parent.text().collect::<Vec<_>>().join(" ");
    let lowered = text.to_lowercase();
    SAVINGS_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Extracts trimmed text for the first match among `specs`; shared with the
/// name/image cascade which reuses the attribute-before-text convention.
pub(crate) fn first_match_text(html: &str, specs: &[SelectorSpec]) -> Option<String> {
    let doc = Html::parse_document(html);
    for spec in specs {
        let Ok(selector) = Selector::parse(spec.css) else {
            continue;
        };
        for element in doc.select(&selector) {
            let value = match spec.attr {
                Some(attr) => element.value().attr(attr).map(str::to_string),
                None => {
                    let text: String = element.text().collect::<Vec<_>>().join(" ");
                    let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed)
                    }
                }
            };
            if let Some(v) = value {
                let v = v.trim().to_string();
                if !v.is_empty() {
                    return Some(v);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_rules() -> PriceRules {
        PriceRules::generic()
    }

    #[test]
    fn strikethrough_price_is_rejected() {
        let html = r#"<div class="price-box">
            <span class="price" style="text-decoration:line-through">199 SAR</span>
            <span class="price">149 SAR</span>
        </div>"#;
        let candidates = extract_candidates(html, &generic_rules());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 149.0);
    }

    #[test]
    fn del_tag_ancestor_is_rejected() {
        let html = r#"<del><span class="price">500</span></del>
                      <span class="price">450</span>"#;
        let candidates = extract_candidates(html, &generic_rules());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 450.0);
    }

    #[test]
    fn savings_callout_is_rejected() {
        let html = r#"<div><span>You save</span> <span class="price">50 SAR</span></div>
                      <div><span class="price">249 SAR</span></div>"#;
        let candidates = extract_candidates(html, &generic_rules());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 249.0);
    }

    #[test]
    fn attribute_specs_beat_text_specs() {
        let html = r#"<meta itemprop="price" content="77.00">
                      <span class="price">999</span>"#;
        let candidates = extract_candidates(html, &generic_rules());
        assert_eq!(candidates[0].value, 77.0);
    }

    #[test]
    fn first_match_text_walks_spec_order() {
        let html = r#"<h1>  Wireless   Mouse </h1>"#;
        let specs = [
            SelectorSpec {
                css: r#"meta[property="og:title"]"#,
                attr: Some("content"),
            },
            SelectorSpec {
                css: "h1",
                attr: None,
            },
        ];
        assert_eq!(
            first_match_text(html, &specs).as_deref(),
            Some("Wireless Mouse")
        );
    }

    #[test]
    fn invalid_selector_is_skipped_not_fatal() {
        let html = r#"<span class="price">10 SAR</span>"#;
        let specs = [SelectorSpec {
            css: ":::nonsense",
            attr: None,
        }];
        assert!(first_match_text(html, &specs).is_none());
    }
}
