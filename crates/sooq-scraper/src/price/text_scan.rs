//! Stage 5: free-text scan for a number adjacent to a currency token.
//!
//! Last resort, run against the whole document: a numeric token directly
//! next to a currency symbol, ISO code, or localized currency word. Noisy
//! by nature — the shared exclusion/range/decoy filters do the real work
//! after this stage.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{CandidatePrice, PriceSource};

use super::dom::SAVINGS_MARKERS;
use super::num::parse_price_str;

/// Currency token → ISO code. Longer tokens first so "ر.س" wins before a
/// bare "ر" could mislead, and "USD" before "$US" style noise.
const CURRENCY_TOKENS: [(&str, &str); 16] = [
    ("ريال سعودي", "SAR"),
    ("ر.س", "SAR"),
    ("ريال", "SAR"),
    ("SAR", "SAR"),
    ("SR", "SAR"),
    ("د.إ", "AED"),
    ("درهم", "AED"),
    ("AED", "AED"),
    ("USD", "USD"),
    ("US$", "USD"),
    ("$", "USD"),
    ("EUR", "EUR"),
    ("€", "EUR"),
    ("TRY", "TRY"),
    ("TL", "TRY"),
    ("₺", "TRY"),
];

fn number_near_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // token-then-number and number-then-token, at most a few joining
        // characters between them (space, nbsp, colon).
        let tokens = CURRENCY_TOKENS
            .iter()
            .map(|(t, _)| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let number = r"[0-9\u{0660}-\u{0669}][0-9\u{0660}-\u{0669},.\u{066B}\u{066C}]*";
        Regex::new(&format!(
            r"(?:(?P<t1>{tokens})[\s\u{{00a0}}:]{{0,3}}(?P<n1>{number}))|(?:(?P<n2>{number})[\s\u{{00a0}}]{{0,3}}(?P<t2>{tokens}))"
        ))
        .expect("valid regex")
    })
}

/// Scans rendered text (tags stripped) for currency-adjacent numbers.
pub(crate) fn extract_candidates(html: &str) -> Vec<CandidatePrice> {
    let text = strip_tags(html);
    let mut out = Vec::new();

    for cap in number_near_token_re().captures_iter(&text) {
        let (token, number) = if let (Some(t), Some(n)) = (cap.name("t1"), cap.name("n1")) {
            (t.as_str(), n.as_str())
        } else if let (Some(n), Some(t)) = (cap.name("n2"), cap.name("t2")) {
            (t.as_str(), n.as_str())
        } else {
            continue;
        };

        let Some(whole) = cap.get(0) else { continue };
        if savings_adjacent(&text, whole.start(), whole.end()) {
            continue;
        }

        let Some(code) = CURRENCY_TOKENS
            .iter()
            .find(|(tok, _)| *tok == token)
            .map(|(_, code)| *code)
        else {
            continue;
        };

        if let Some(value) = parse_price_str(number) {
            out.push(CandidatePrice {
                value,
                currency: Some(code.to_string()),
                source: PriceSource::TextScan,
                context: format!("text:{token}"),
            });
        }
    }
    out
}

/// True when savings language sits right next to the match. The window is
/// deliberately narrow: a "You save X" callout touches its number, while a
/// savings line elsewhere on the page must not poison the real price.
fn savings_adjacent(text: &str, start: usize, end: usize) -> bool {
    const BEFORE: usize = 12;
    const AFTER: usize = 12;

    let mut lo = start.saturating_sub(BEFORE);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + AFTER).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }

    let window = text[lo..hi].to_lowercase();
    SAVINGS_MARKERS.iter().any(|m| window.contains(m))
}

/// Replaces tags with spaces so adjacency survives markup boundaries
/// (`<span>149</span><span>SAR</span>` stays adjacent). Script and style
/// bodies are dropped entirely — embedded JS is stage 4's job and its
/// numbers are not display text.
fn strip_tags(html: &str) -> String {
    static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();

    let without_scripts = SCRIPT_RE
        .get_or_init(|| {
            Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("valid regex")
        })
        .replace_all(html, " ");
    TAG_RE
        .get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
        .replace_all(&without_scripts, " ")
        .into_owned()
}
