//! Stage 4: price-hunting inside embedded application-state JSON.
//!
//! Single-page storefronts ship the product record inside a large inline
//! script assigning a global state object (`window.runParams = {...}`,
//! `__PRODUCT_DETAIL_APP_INITIAL_STATE__ = {...}`). The walker descends the
//! parsed value to a bounded depth and offers every key whose name contains
//! "price" to an accept predicate; key names signalling the *current* price
//! (sale/current/final/actual) outrank generic "price" keys, and key names
//! signalling an original-price decoy are skipped outright.

use serde_json::Value;

use crate::types::{CandidatePrice, PriceSource};

use super::num::parse_price_str;

/// Depth cap for the tree walk. State blobs nest product → sku → price
/// structures five or six levels deep in observed stores; twelve leaves
/// headroom while keeping pathological payloads cheap. Depth-capped
/// recursion over an owned `serde_json::Value` cannot cycle, so no
/// visited-set is needed.
const MAX_WALK_DEPTH: usize = 12;

/// Keys whose value is the price currently displayed to the shopper.
const CURRENT_KEY_HINTS: [&str; 6] = ["sale", "current", "final", "actual", "discount", "now"];

/// Keys carrying original/comparison prices or unrelated thresholds; never
/// accepted even though they contain "price".
const DECOY_KEY_HINTS: [&str; 8] = [
    "origin",
    "original",
    "retail",
    "compare",
    "was",
    "old",
    "cross",
    "shipping",
];

/// Harvests candidates from inline scripts. When `markers` is non-empty,
/// only scripts whose opening tag or body contains one of the markers are
/// parsed (state blobs like `__NEXT_DATA__` carry the marker in an `id`
/// attribute, not the body); otherwise any inline JSON object of meaningful
/// size is considered.
pub(crate) fn extract_candidates(html: &str, markers: &[&str]) -> Vec<CandidatePrice> {
    let mut current_keyed = Vec::new();
    let mut generic_keyed = Vec::new();

    for (tag, body) in script_bodies(html) {
        if !markers.is_empty()
            && !markers
                .iter()
                .any(|m| tag.contains(m) || body.contains(m))
        {
            continue;
        }
        if markers.is_empty() && body.len() < 256 {
            continue;
        }

        for blob in object_blobs(body) {
            let Ok(value) = serde_json::from_str::<Value>(blob) else {
                continue;
            };
            walk(&value, 0, &mut |key_path: &str, leaf: &Value| {
                let key_lower = last_key(key_path).to_ascii_lowercase();
                if !key_lower.contains("price") {
                    return;
                }
                if DECOY_KEY_HINTS.iter().any(|h| key_lower.contains(h)) {
                    return;
                }
                let Some(number) = leaf_number(leaf) else {
                    return;
                };
                let candidate = CandidatePrice {
                    value: number,
                    currency: None,
                    source: PriceSource::StateJson,
                    context: format!("state:{key_path}"),
                };
                if CURRENT_KEY_HINTS.iter().any(|h| key_lower.contains(h)) {
                    current_keyed.push(candidate);
                } else {
                    generic_keyed.push(candidate);
                }
            });
        }
    }

    if current_keyed.is_empty() {
        generic_keyed
    } else {
        current_keyed
    }
}

/// Yields `(opening_tag, body)` for every `<script>` tag without a src.
fn script_bodies(html: &str) -> Vec<(&str, &str)> {
    let mut bodies = Vec::new();
    let mut rest = html;
    while let Some(open) = rest.find("<script") {
        let after_open = &rest[open..];
        let Some(tag_end) = after_open.find('>') else {
            break;
        };
        let content_start = open + tag_end + 1;
        let Some(close) = rest[content_start..].find("</script") else {
            break;
        };
        let tag = &rest[open..open + tag_end];
        if !tag.contains("src=") {
            bodies.push((tag, &rest[content_start..content_start + close]));
        }
        rest = &rest[content_start + close + "</script".len()..];
    }
    bodies
}

/// Candidate JSON objects inside a script body. A body that is itself one
/// JSON object (`type="application/json"` state scripts) is taken whole;
/// otherwise balanced `{...}` blobs following an assignment are extracted.
fn object_blobs(body: &str) -> Vec<&str> {
    let trimmed = body.trim();
    match extract_balanced_object(trimmed) {
        Some(blob) if blob.len() == trimmed.len() => vec![blob],
        _ => assigned_object_blobs(body),
    }
}

/// Extracts balanced `{...}` blobs following an assignment (`=` or `:`)
/// inside a script body. Scans brace depth respecting string literals and
/// escapes; only a `}` closing the opening `{` terminates a blob.
fn assigned_object_blobs(body: &str) -> Vec<&str> {
    let mut blobs = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            // Only objects on the right-hand side of an assignment are
            // interesting; bare blocks in minified JS waste parse attempts.
            let preceded_by_assign = body[..i]
                .trim_end()
                .ends_with(['=', '(', ':', ',']);
            if preceded_by_assign {
                if let Some(blob) = extract_balanced_object(&body[i..]) {
                    blobs.push(blob);
                    i += blob.len();
                    continue;
                }
            }
        }
        i += 1;
    }
    blobs
}

/// Shortest prefix of `s` forming a complete `{...}` object, or `None` when
/// unterminated. Tracks string literals and escape sequences so braces
/// inside JSON strings do not skew the depth count.
fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            ']' => depth -= 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn walk(value: &Value, depth: usize, on_leaf: &mut impl FnMut(&str, &Value)) {
    walk_inner(value, depth, &mut String::new(), on_leaf);
}

fn walk_inner(
    value: &Value,
    depth: usize,
    path: &mut String,
    on_leaf: &mut impl FnMut(&str, &Value),
) {
    if depth > MAX_WALK_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let saved = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
                if child.is_object() || child.is_array() {
                    walk_inner(child, depth + 1, path, on_leaf);
                } else {
                    on_leaf(path, child);
                }
                path.truncate(saved);
            }
        }
        Value::Array(arr) => {
            for child in arr {
                walk_inner(child, depth + 1, path, on_leaf);
            }
        }
        _ => {}
    }
}

fn last_key(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// State blobs store prices as numbers or strings; both are accepted.
fn leaf_number(leaf: &Value) -> Option<f64> {
    leaf.as_f64()
        .or_else(|| leaf.as_str().and_then(parse_price_str))
        .filter(|n| n.is_finite() && *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_price_key_outranks_generic_price() {
        let html = r#"<script>window.runParams = {"data":{"price":199.0,"salePrice":149.0}};</script>"#;
        let candidates = extract_candidates(html, &["runParams"]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 149.0);
        assert!(candidates[0].context.contains("salePrice"));
    }

    #[test]
    fn decoy_keys_are_never_accepted() {
        let html = r#"<script>window.state = {"originalPrice":300,"crossedPrice":"250","shippingPrice":10};</script>"#;
        assert!(extract_candidates(html, &["window.state"]).is_empty());
    }

    #[test]
    fn string_prices_parse() {
        let html = r#"<script>var cfg = {"product":{"currentPrice":"88.50"}};</script>"#;
        let candidates = extract_candidates(html, &["cfg"]);
        assert_eq!(candidates[0].value, 88.5);
    }

    #[test]
    fn bare_json_state_script_with_marker_in_tag_is_parsed() {
        // Next.js puts the marker in the id attribute and the body is one
        // JSON object with no assignment.
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"product":{"price":199.0,"salePrice":149.0}}}}</script>"#;
        let candidates = extract_candidates(html, &["__NEXT_DATA__"]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 149.0);
    }

    #[test]
    fn marker_filter_skips_unrelated_scripts() {
        let html = r#"<script>var analytics = {"pagePrice":9.0};</script>"#;
        assert!(extract_candidates(html, &["runParams"]).is_empty());
    }

    #[test]
    fn braces_inside_strings_do_not_break_extraction() {
        let html = r#"<script>window.runParams = {"name":"{weird} title","price":55};</script>"#;
        let candidates = extract_candidates(html, &["runParams"]);
        assert_eq!(candidates[0].value, 55.0);
    }

    #[test]
    fn depth_cap_bounds_the_walk() {
        // 20 levels of nesting; the price sits below the cap and must be
        // ignored rather than recursed into forever.
        let mut blob = String::from("window.runParams = ");
        for _ in 0..20 {
            blob.push_str("{\"a\":");
        }
        blob.push_str("{\"salePrice\":42}");
        for _ in 0..20 {
            blob.push('}');
        }
        let html = format!("<script>{blob};</script>");
        assert!(extract_candidates(&html, &["runParams"]).is_empty());
    }
}
