//! Product name and image extraction.
//!
//! Same cascade shape as the price engine, much lower stakes: Open Graph
//! tags first (storefronts maintain them for share previews), then JSON-LD,
//! then store-specific selectors, then the `<title>` tag with the store's
//! boilerplate suffix stripped.

use crate::price::dom::first_match_text;
use crate::price::jsonld;
use crate::price::rules::SelectorSpec;

const OG_TITLE: &[SelectorSpec] = &[SelectorSpec {
    css: r#"meta[property="og:title"]"#,
    attr: Some("content"),
}];

const OG_IMAGE: &[SelectorSpec] = &[SelectorSpec {
    css: r#"meta[property="og:image"]"#,
    attr: Some("content"),
}];

const TITLE_TAG: &[SelectorSpec] = &[SelectorSpec {
    css: "title",
    attr: None,
}];

/// Minimum length for a usable product name; shorter strings are navigation
/// crumbs or placeholder glyphs.
const MIN_NAME_LEN: usize = 4;

/// Resolves the product display name, or `None` when nothing usable exists.
///
/// `title_suffixes` are store boilerplate trailers stripped from the
/// `<title>` fallback (`" | Amazon.sa"`, `" - Noon"`).
pub(crate) fn extract_name(
    html: &str,
    store_selectors: &[SelectorSpec],
    title_suffixes: &[&str],
) -> Option<String> {
    if let Some(name) = first_match_text(html, OG_TITLE).filter(|n| usable_name(n)) {
        return Some(name);
    }
    if let Some(name) = jsonld::extract_name(html).filter(|n| usable_name(n)) {
        return Some(name);
    }
    if let Some(name) = first_match_text(html, store_selectors).filter(|n| usable_name(n)) {
        return Some(name);
    }

    let title = first_match_text(html, TITLE_TAG)?;
    let stripped = strip_suffixes(&title, title_suffixes);
    usable_name(&stripped).then_some(stripped)
}

/// Resolves the primary product image URL, made absolute against
/// `page_url` when the markup carries a relative path.
pub(crate) fn extract_image(
    html: &str,
    store_selectors: &[SelectorSpec],
    page_url: &str,
) -> Option<String> {
    let raw = first_match_text(html, OG_IMAGE)
        .or_else(|| jsonld::extract_image(html))
        .or_else(|| first_match_text(html, store_selectors))?;
    absolutize(&raw, page_url)
}

fn usable_name(name: &str) -> bool {
    name.trim().len() >= MIN_NAME_LEN
}

/// Strips the longest matching boilerplate trailer, case-insensitively,
/// then any leftover separator punctuation.
fn strip_suffixes(title: &str, suffixes: &[&str]) -> String {
    let mut out = title.trim().to_string();
    let lowered = out.to_lowercase();
    if let Some(suffix) = suffixes
        .iter()
        .filter(|s| lowered.ends_with(&s.to_lowercase()))
        .max_by_key(|s| s.len())
    {
        out.truncate(out.len() - suffix.len());
    }
    out.trim_end_matches(['|', '-', '–', ':', ' ']).to_string()
}

fn absolutize(raw: &str, page_url: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    let base = url::Url::parse(page_url).ok()?;
    base.join(raw).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_title_wins_over_everything() {
        let html = r#"
            <meta property="og:title" content="Wireless Mouse M330">
            <h1>Some Other Heading</h1>
            <title>Wrong | Store</title>"#;
        assert_eq!(
            extract_name(html, &[], &[]).as_deref(),
            Some("Wireless Mouse M330")
        );
    }

    #[test]
    fn title_fallback_strips_store_suffix() {
        let html = "<title>Vitamin C 1000mg - 180 Capsules | iHerb</title>";
        assert_eq!(
            extract_name(html, &[], &[" | iHerb"]).as_deref(),
            Some("Vitamin C 1000mg - 180 Capsules")
        );
    }

    #[test]
    fn short_names_are_rejected() {
        let html = r#"<meta property="og:title" content="..."><title>X</title>"#;
        assert!(extract_name(html, &[], &[]).is_none());
    }

    #[test]
    fn store_selector_runs_before_title() {
        let html = r#"<span id="productTitle">  Echo Dot 5th Gen  </span>
                      <title>Amazon.sa</title>"#;
        let selectors = [SelectorSpec {
            css: "#productTitle",
            attr: None,
        }];
        assert_eq!(
            extract_name(html, &selectors, &[]).as_deref(),
            Some("Echo Dot 5th Gen")
        );
    }

    #[test]
    fn protocol_relative_image_gets_https() {
        let html = r#"<meta property="og:image" content="//cdn.example.com/p.jpg">"#;
        assert_eq!(
            extract_image(html, &[], "https://example.com/p/1").as_deref(),
            Some("https://cdn.example.com/p.jpg")
        );
    }

    #[test]
    fn relative_image_joins_page_url() {
        let html = r#"<img id="main-image" src="/images/p.jpg">"#;
        let selectors = [SelectorSpec {
            css: "#main-image",
            attr: Some("src"),
        }];
        assert_eq!(
            extract_image(html, &selectors, "https://shop.example.sa/item/9").as_deref(),
            Some("https://shop.example.sa/images/p.jpg")
        );
    }
}
