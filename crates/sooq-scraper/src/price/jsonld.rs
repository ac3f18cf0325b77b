//! Stage 2: schema.org JSON-LD `Product`/`Offer` extraction.
//!
//! `offers.lowPrice` is read before `offers.price`: on multi-variant
//! listings `lowPrice` is the already-discounted current price while
//! `price` often reflects the original or first-variant price. When
//! several offers exist, entries whose currency matches the preferred
//! settlement currency come first so a SAR offer beats a USD mirror of
//! the same listing.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{CandidatePrice, PriceSource};

use super::num::parse_price_str;

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
            .expect("valid regex")
    })
}

/// Harvests all candidate prices from JSON-LD blocks in `html`.
pub(crate) fn extract_candidates(html: &str, preferred_currency: &str) -> Vec<CandidatePrice> {
    let mut preferred = Vec::new();
    let mut rest = Vec::new();

    for cap in script_re().captures_iter(html) {
        let Some(json_text) = cap.get(1) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(json_text.as_str()) else {
            continue;
        };

        for item in flatten_jsonld(&value) {
            for candidate in product_offers_candidates(item) {
                if candidate
                    .currency
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(preferred_currency))
                {
                    preferred.push(candidate);
                } else {
                    rest.push(candidate);
                }
            }
        }
    }

    // Preferred-currency offers outrank the rest; within each group the
    // original lowPrice-before-price ordering is preserved.
    if preferred.is_empty() {
        rest
    } else {
        preferred
    }
}

/// Product name from JSON-LD, for the name-extraction cascade.
pub(crate) fn extract_name(html: &str) -> Option<String> {
    for cap in script_re().captures_iter(html) {
        let json_text = cap.get(1)?.as_str();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(json_text) else {
            continue;
        };
        for item in flatten_jsonld(&value) {
            if !is_product(item) {
                continue;
            }
            if let Some(name) = item.get("name").and_then(serde_json::Value::as_str) {
                let name = name.trim();
                if name.len() > 3 {
                    return Some(name.to_string());
                }
            }
        }
    }
    None
}

/// Product image URL from JSON-LD. `image` may be a string, an array of
/// strings, or an `ImageObject`.
pub(crate) fn extract_image(html: &str) -> Option<String> {
    for cap in script_re().captures_iter(html) {
        let json_text = cap.get(1)?.as_str();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(json_text) else {
            continue;
        };
        for item in flatten_jsonld(&value) {
            if !is_product(item) {
                continue;
            }
            let image = item.get("image")?;
            let url = match image {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Array(arr) => arr
                    .first()
                    .and_then(|v| {
                        v.as_str().map(String::from).or_else(|| {
                            v.get("url").and_then(|u| u.as_str()).map(String::from)
                        })
                    }),
                serde_json::Value::Object(_) => image
                    .get("url")
                    .and_then(|u| u.as_str())
                    .map(String::from),
                _ => None,
            };
            if url.is_some() {
                return url;
            }
        }
    }
    None
}

/// Expands top-level arrays and `@graph` containers into a flat item list.
fn flatten_jsonld(value: &serde_json::Value) -> Vec<&serde_json::Value> {
    let mut items: Vec<&serde_json::Value> = match value {
        serde_json::Value::Array(arr) => arr.iter().collect(),
        other => vec![other],
    };

    let mut expanded = Vec::new();
    for item in &items {
        if let Some(graph) = item.get("@graph").and_then(serde_json::Value::as_array) {
            expanded.extend(graph.iter());
        }
    }
    items.extend(expanded);
    items
}

fn is_product(item: &serde_json::Value) -> bool {
    match item.get("@type") {
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("Product"),
        Some(serde_json::Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .any(|s| s.eq_ignore_ascii_case("Product")),
        _ => false,
    }
}

/// Candidates from one JSON-LD item's `offers` node, `lowPrice` first.
fn product_offers_candidates(item: &serde_json::Value) -> Vec<CandidatePrice> {
    if !is_product(item) && item.get("offers").is_none() {
        return Vec::new();
    }

    let Some(offers) = item.get("offers") else {
        return Vec::new();
    };

    let offer_nodes: Vec<&serde_json::Value> = match offers {
        serde_json::Value::Array(arr) => arr.iter().collect(),
        other => vec![other],
    };

    let mut out = Vec::new();
    for offer in offer_nodes {
        let currency = offer
            .get("priceCurrency")
            .and_then(serde_json::Value::as_str)
            .map(str::to_uppercase);

        // AggregateOffer: lowPrice is the current price for the cheapest
        // in-stock variant, which is what the storefront displays.
        for (key, source_note) in [("lowPrice", "jsonld.lowPrice"), ("price", "jsonld.price")] {
            if let Some(value) = offer.get(key).and_then(json_number) {
                out.push(CandidatePrice {
                    value,
                    currency: currency.clone(),
                    source: PriceSource::JsonLd,
                    context: source_note.to_string(),
                });
            }
        }

        // Nested offers inside an AggregateOffer.
        if let Some(nested) = offer.get("offers").and_then(serde_json::Value::as_array) {
            for n in nested {
                let nested_currency = n
                    .get("priceCurrency")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_uppercase)
                    .or_else(|| currency.clone());
                if let Some(value) = n.get("price").and_then(json_number) {
                    out.push(CandidatePrice {
                        value,
                        currency: nested_currency,
                        source: PriceSource::JsonLd,
                        context: "jsonld.offers[].price".to_string(),
                    });
                }
            }
        }
    }
    out
}

/// JSON-LD prices appear as numbers or as strings ("149.00", "١٤٩").
fn json_number(v: &serde_json::Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(parse_price_str))
        .filter(|n| n.is_finite() && *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_price_precedes_price() {
        let html = r#"<script type="application/ld+json">
        {"@type":"Product","name":"Running Shoe",
         "offers":{"@type":"AggregateOffer","priceCurrency":"SAR",
                   "lowPrice":"149.00","price":"199.00"}}
        </script>"#;
        let candidates = extract_candidates(html, "SAR");
        assert_eq!(candidates[0].value, 149.0);
        assert_eq!(candidates[0].context, "jsonld.lowPrice");
    }

    #[test]
    fn preferred_currency_offers_win() {
        let html = r#"<script type="application/ld+json">
        {"@type":"Product","offers":[
          {"price":"39.99","priceCurrency":"USD"},
          {"price":"150.00","priceCurrency":"SAR"}]}
        </script>"#;
        let candidates = extract_candidates(html, "SAR");
        assert!(candidates
            .iter()
            .all(|c| c.currency.as_deref() == Some("SAR")));
        assert_eq!(candidates[0].value, 150.0);
    }

    #[test]
    fn graph_container_is_expanded() {
        let html = r#"<script type="application/ld+json">
        {"@graph":[{"@type":"Product","name":"Face Cream 50ml",
          "offers":{"price":88,"priceCurrency":"SAR"}}]}
        </script>"#;
        let candidates = extract_candidates(html, "SAR");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 88.0);
        assert_eq!(extract_name(html).as_deref(), Some("Face Cream 50ml"));
    }

    #[test]
    fn image_handles_all_shapes() {
        let html = r#"<script type="application/ld+json">
        {"@type":"Product","name":"X Y Z 1",
         "image":["https://cdn.example.com/a.jpg","https://cdn.example.com/b.jpg"],
         "offers":{"price":10}}
        </script>"#;
        assert_eq!(
            extract_image(html).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn malformed_json_is_skipped() {
        let html = r#"<script type="application/ld+json">{not json}</script>"#;
        assert!(extract_candidates(html, "SAR").is_empty());
        assert!(extract_name(html).is_none());
    }
}
