//! Currency normalization into the settlement currency.
//!
//! Every price leaving the core is in SAR. Conversion goes through a USD
//! pivot: `amount * rate[from]` yields USD, divided by `rate[SAR]` yields
//! SAR. When `from` is the pivot itself the first multiplication is a
//! no-op and a direct ratio applies.
//!
//! The operator-maintained rate table arrives through the settings
//! snapshot; a scrape must never fail purely because a settings lookup
//! hiccuped, so every missing or implausible entry falls back to
//! [`DEFAULT_RATES`].

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// The single currency all extracted prices are normalized into.
pub const SETTLEMENT_CURRENCY: &str = "SAR";

/// Pivot for cross-rates. Operator tables are maintained as USD-per-unit.
pub const PIVOT_CURRENCY: &str = "USD";

/// Hardcoded fallback rates (USD per one unit of the currency), one entry
/// per currency observed across the supported storefronts. Stale rates are
/// acceptable here: landed-cost math tolerates a percent or two of drift,
/// a failed scrape does not.
pub const DEFAULT_RATES: [(&str, f64); 15] = [
    ("USD", 1.0),
    ("SAR", 0.2666),
    ("AED", 0.2723),
    ("KWD", 3.2520),
    ("BHD", 2.6525),
    ("QAR", 0.2747),
    ("OMR", 2.5974),
    ("EGP", 0.0207),
    ("TRY", 0.0292),
    ("EUR", 1.0870),
    ("GBP", 1.2700),
    ("CNY", 0.1380),
    ("JPY", 0.0066),
    ("INR", 0.0117),
    ("AUD", 0.6550),
];

/// Rounding policy for resolved prices: a fractional remainder under 0.02
/// is display noise from float conversion, so the value floors to the
/// integer; anything else rounds to 2 decimal places.
#[must_use]
pub fn round_price(value: f64) -> f64 {
    let fract = value - value.floor();
    if fract < 0.02 {
        value.floor()
    } else {
        (value * 100.0).round() / 100.0
    }
}

fn default_rate(code: &str) -> Option<f64> {
    DEFAULT_RATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, r)| *r)
}

/// Looks up a usable USD-per-unit rate: operator table first, default
/// table second. Zero/negative table entries are treated as absent —
/// an admin typo must not zero out every price from a store.
fn usable_rate(code: &str, table: &HashMap<String, f64>) -> Option<f64> {
    table
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, r)| *r)
        .filter(|r| r.is_finite() && *r > 0.0)
        .or_else(|| default_rate(code))
}

/// Converts `amount` from `from_currency` into the settlement currency
/// using an already-resolved rate table. Infallible: unknown currencies
/// pass through unconverted (logged), which beats failing the scrape.
#[must_use]
pub fn convert_with_rates(amount: f64, from_currency: &str, rates: &HashMap<String, f64>) -> f64 {
    let from = from_currency.trim();
    if from.eq_ignore_ascii_case(SETTLEMENT_CURRENCY) || from.is_empty() {
        return round_price(amount);
    }

    let Some(settlement_rate) = usable_rate(SETTLEMENT_CURRENCY, rates) else {
        // Unreachable with DEFAULT_RATES present; guard anyway.
        return round_price(amount);
    };

    let converted = if from.eq_ignore_ascii_case(PIVOT_CURRENCY) {
        amount / settlement_rate
    } else {
        match usable_rate(from, rates) {
            Some(from_rate) => amount * from_rate / settlement_rate,
            None => {
                tracing::warn!(
                    currency = from,
                    "no exchange rate available; passing amount through unconverted"
                );
                amount
            }
        }
    };

    round_price(converted)
}

/// Converts `amount` into the settlement currency, resolving the rate
/// table through `fetch_rates` bounded by `timeout`.
///
/// On timeout or a `None` result the default table applies. Never fails
/// and never panics; the settlement-currency identity conversion short-
/// circuits before any lookup.
pub async fn to_settlement_currency<F, Fut>(
    amount: f64,
    from_currency: &str,
    fetch_rates: F,
    timeout: Duration,
) -> f64
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<HashMap<String, f64>>>,
{
    if from_currency
        .trim()
        .eq_ignore_ascii_case(SETTLEMENT_CURRENCY)
    {
        return round_price(amount);
    }

    let rates = match tokio::time::timeout(timeout, fetch_rates()).await {
        Ok(Some(table)) => table,
        Ok(None) => HashMap::new(),
        Err(_) => {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "rate lookup timed out; using default rates"
            );
            HashMap::new()
        }
    };

    convert_with_rates(amount, from_currency, &rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 0.01, "expected {b}, got {a}");
    }

    #[test]
    fn identity_conversion_returns_amount() {
        let rates = HashMap::new();
        approx_eq(convert_with_rates(149.99, "SAR", &rates), 149.99);
        approx_eq(convert_with_rates(149.99, "sar", &rates), 149.99);
    }

    #[test]
    fn pivot_currency_uses_direct_ratio() {
        let rates = HashMap::new();
        // 10 USD / 0.2666 ≈ 37.51 SAR
        approx_eq(convert_with_rates(10.0, "USD", &rates), 37.51);
    }

    #[test]
    fn cross_rate_goes_through_pivot() {
        let rates = HashMap::new();
        // 100 AED * 0.2723 / 0.2666 ≈ 102.14 SAR
        approx_eq(convert_with_rates(100.0, "AED", &rates), 102.14);
    }

    #[test]
    fn operator_rates_override_defaults() {
        let mut rates = HashMap::new();
        rates.insert("AED".to_string(), 0.30);
        rates.insert("SAR".to_string(), 0.25);
        // 100 * 0.30 / 0.25 = 120
        approx_eq(convert_with_rates(100.0, "AED", &rates), 120.0);
    }

    #[test]
    fn zero_operator_rate_falls_back_to_default() {
        let mut rates = HashMap::new();
        rates.insert("AED".to_string(), 0.0);
        approx_eq(convert_with_rates(100.0, "AED", &rates), 102.14);
    }

    #[test]
    fn unknown_currency_passes_through() {
        let rates = HashMap::new();
        approx_eq(convert_with_rates(55.0, "XYZ", &rates), 55.0);
    }

    #[test]
    fn rounding_floors_small_fractions() {
        approx_eq(round_price(149.013), 149.0);
        approx_eq(round_price(149.019), 149.0);
        approx_eq(round_price(149.5567), 149.56);
        approx_eq(round_price(149.0), 149.0);
    }

    #[tokio::test]
    async fn timeout_falls_back_to_defaults() {
        let result = to_settlement_currency(
            10.0,
            "USD",
            || async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Some(HashMap::new())
            },
            Duration::from_millis(10),
        )
        .await;
        assert!((result - 37.51).abs() < 0.01);
    }

    #[tokio::test]
    async fn identity_conversion_never_awaits_rates() {
        // fetch_rates would hang forever; the identity path must not call it.
        let result = to_settlement_currency(
            25.0,
            "SAR",
            || async {
                std::future::pending::<()>().await;
                None
            },
            Duration::from_secs(60),
        )
        .await;
        assert!((result - 25.0).abs() < 0.01);
    }
}
