//! Locale-tolerant numeric parsing for price strings.
//!
//! Storefront markup mixes US format (`1,234.56`), European format
//! (`1.234,56`), and Arabic-Indic digits with the Arabic decimal separator
//! (`١٢٣٫٤٥`). Everything funnels through [`parse_price_str`] so the rest
//! of the engine only ever sees `f64`.

/// Parses a price string into a number, handling both thousand-separator
/// conventions and Arabic-Indic digits. Returns `None` for strings with no
/// digits at all.
#[must_use]
pub(crate) fn parse_price_str(s: &str) -> Option<f64> {
    let ascii = arabic_digits_to_ascii(s);

    // Keep digits, plus separators only when flanked by digits on both
    // sides. Dotted currency abbreviations ("ر.س", "S.R") would otherwise
    // leave a dangling period glued to the number.
    let chars: Vec<char> = ascii.chars().collect();
    let mut cleaned = String::new();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            cleaned.push(*c);
        } else if (*c == '.' || *c == ',')
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
        {
            cleaned.push(*c);
        }
    }

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let has_dot = cleaned.contains('.');
    let has_comma = cleaned.contains(',');

    let normalized = if has_dot && has_comma {
        // Both present: the LAST separator is the decimal one.
        let last_dot = cleaned.rfind('.').expect("dot present");
        let last_comma = cleaned.rfind(',').expect("comma present");
        if last_comma > last_dot {
            // European: 1.234,56
            cleaned.replace('.', "").replacen(',', ".", 1)
        } else {
            // US: 1,234.56
            cleaned.replace(',', "")
        }
    } else if has_comma {
        let last_comma = cleaned.rfind(',').expect("comma present");
        let after_comma = &cleaned[last_comma + 1..];
        if after_comma.len() == 3 && after_comma.chars().all(|c| c.is_ascii_digit()) {
            // Exactly 3 trailing digits: thousands separator ("1,000").
            cleaned.replace(',', "")
        } else {
            // Decimal comma ("23,99").
            cleaned.replacen(',', ".", 1)
        }
    } else {
        cleaned
    };

    normalized.parse().ok().filter(|v: &f64| v.is_finite())
}

/// Maps Arabic-Indic and Extended Arabic-Indic digits (and the Arabic
/// decimal/thousands separators) onto their ASCII equivalents, leaving all
/// other characters untouched.
fn arabic_digits_to_ascii(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => {
                char::from(b'0' + u8::try_from(c as u32 - 0x0660).expect("digit offset"))
            }
            '\u{06F0}'..='\u{06F9}' => {
                char::from(b'0' + u8::try_from(c as u32 - 0x06F0).expect("digit offset"))
            }
            '\u{066B}' => '.', // Arabic decimal separator
            '\u{066C}' => ',', // Arabic thousands separator
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_us_format() {
        assert_eq!(parse_price_str("149.99"), Some(149.99));
        assert_eq!(parse_price_str("1,234.56"), Some(1234.56));
        assert_eq!(parse_price_str("SAR 1,000"), Some(1000.0));
    }

    #[test]
    fn parses_european_format() {
        assert_eq!(parse_price_str("1.234,56"), Some(1234.56));
        assert_eq!(parse_price_str("23,99"), Some(23.99));
    }

    #[test]
    fn parses_arabic_indic_digits() {
        assert_eq!(parse_price_str("١٤٩٫٩٩ ر.س"), Some(149.99));
        assert_eq!(parse_price_str("٥٠"), Some(50.0));
    }

    #[test]
    fn dotted_currency_abbreviations_are_not_separators() {
        assert_eq!(parse_price_str("149.99 S.R"), Some(149.99));
        assert_eq!(parse_price_str("ر.س 149"), Some(149.0));
        assert_eq!(parse_price_str("149. "), Some(149.0));
    }

    #[test]
    fn rejects_digitless_strings() {
        assert_eq!(parse_price_str("free shipping"), None);
        assert_eq!(parse_price_str(""), None);
        assert_eq!(parse_price_str(",.."), None);
    }
}
