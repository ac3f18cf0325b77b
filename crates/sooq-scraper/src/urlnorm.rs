//! URL extraction and normalization from pasted user input.
//!
//! Users rarely paste a clean URL: mobile share sheets wrap the link in
//! promotional text ("Check out what I found on SHEIN! https://..."), chat
//! apps append punctuation, and Arabic share text puts the URL mid-sentence.
//! Store-specific host patterns run first so that, when a message contains
//! both a short link and a tracking pixel URL, the storefront link wins.

use std::sync::OnceLock;

use regex::Regex;

/// Store host patterns in priority order, most specific first. Each pattern
/// must match the scheme so the captured text is usable as-is.
const STORE_URL_PATTERNS: [&str; 10] = [
    // Amazon marketplaces incl. the amzn short-link hosts.
    r"https?://(?:www\.)?(?:amazon\.(?:sa|ae|eg|com|co\.uk|de|it|es|fr)|amzn\.(?:to|eu))/\S+",
    // Noon, incl. Arabic-localized paths.
    r"https?://(?:www\.)?noon\.com/\S+",
    // SHEIN regional hosts and the ar. subdomain.
    r"https?://(?:\w+\.)?shein\.(?:com|top)/\S+",
    // AliExpress incl. the a.aliexpress short-link host.
    r"https?://(?:\w+\.)?aliexpress\.(?:com|us)/\S+",
    r"https?://(?:www\.)?temu\.com/\S+",
    r"https?://(?:\w+\.)?iherb\.(?:com|co)/\S+",
    r"https?://(?:www\.)?(?:niceonesa\.com|niceone\.sa)/\S+",
    r"https?://(?:www\.)?namshi\.com/\S+",
    // Trendyol incl. the ty.gl shortener.
    r"https?://(?:www\.)?(?:trendyol\.com|ty\.gl)/\S+",
    // Generic fallback: any URL-looking token.
    r"https?://\S+",
];

fn store_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        STORE_URL_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect()
    })
}

/// Extracts and normalizes a product URL from raw pasted text.
///
/// Returns `None` when no plausible URL can be produced; the caller maps
/// that to the "no valid link found" failure. Idempotent: feeding the
/// output back in returns it unchanged.
#[must_use]
pub fn normalize_input(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in store_patterns() {
        if let Some(m) = pattern.find(trimmed) {
            return Some(strip_trailing_junk(m.as_str()));
        }
    }

    // No scheme anywhere in the text. Accept a bare domain-ish token
    // ("www.iherb.com/pr/1891") only when the whole input is one token.
    if trimmed.contains('.') && !trimmed.contains(char::is_whitespace) {
        return Some(strip_trailing_junk(&format!("https://{trimmed}")));
    }

    None
}

/// Strips trailing sentence punctuation and at most one closing parenthesis.
///
/// Chat apps commonly produce "…link). " or "…link،" (Arabic comma); the
/// paren case keeps URLs that legitimately end with ")" from losing two
/// characters.
fn strip_trailing_junk(url: &str) -> String {
    let mut s = url.trim_end_matches(['.', ',', ';', ':', '!', '?', '"', '\'', '،', '؛']);
    if let Some(stripped) = s.strip_suffix(')') {
        // Only strip an unbalanced paren — "(...)" inside a path is valid.
        if stripped.matches('(').count() == stripped.matches(')').count() {
            s = stripped;
        }
    }
    s.to_string()
}
