//! Rate documents and provider payload parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::RatesError;

/// One day in milliseconds.
pub const DEFAULT_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Rates as returned by a provider, before filtering.
///
/// Currency codes are upper-case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateQuote {
    /// Publication date reported by the provider, if any.
    pub date: Option<String>,
    /// Code to rate, relative to the requested base.
    pub rates: BTreeMap<String, f64>,
}

/// Exchange rates relative to a base currency, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
    /// Epoch milliseconds of the fetch.
    pub last_updated: i64,
}

impl ExchangeRates {
    /// Build a rates document from a provider quote.
    ///
    /// Only codes in `supported` are kept; an empty list keeps everything.
    pub fn from_quote(base: &str, quote: RateQuote, supported: &[String], now_ms: i64) -> Self {
        let rates = quote
            .rates
            .into_iter()
            .filter(|(code, _)| {
                supported.is_empty() || supported.iter().any(|s| s.eq_ignore_ascii_case(code))
            })
            .collect();

        Self {
            base: base.to_ascii_uppercase(),
            rates,
            last_updated: now_ms,
        }
    }

    /// Rate for `code` (case-insensitive).
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_ascii_uppercase()).copied()
    }

    /// Whether the document is at least `max_age_ms` old at `now_ms`.
    pub fn is_stale(&self, now_ms: i64, max_age_ms: i64) -> bool {
        now_ms.saturating_sub(self.last_updated) >= max_age_ms
    }
}

/// Parse a `{ "date": ..., "<base>": { "<code>": rate } }` payload.
pub fn parse_rates_payload(base: &str, body: &[u8]) -> Result<RateQuote, RatesError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let object = value
        .as_object()
        .ok_or_else(|| RatesError::Parse("expected a JSON object".to_string()))?;

    let table = object
        .get(&base.to_ascii_lowercase())
        .and_then(|v| v.as_object())
        .ok_or_else(|| RatesError::MissingBase(base.to_ascii_uppercase()))?;

    let rates = table
        .iter()
        .filter_map(|(code, rate)| {
            let rate = rate.as_f64()?;
            (rate.is_finite() && rate > 0.0).then(|| (code.to_ascii_uppercase(), rate))
        })
        .collect();

    Ok(RateQuote {
        date: object.get("date").and_then(|d| d.as_str()).map(String::from),
        rates,
    })
}

/// Parse a `{ "<code>": "<name>" }` currency listing.
pub fn parse_currency_listing(body: &[u8]) -> Result<BTreeMap<String, String>, RatesError> {
    let listing: BTreeMap<String, String> = serde_json::from_slice(body)?;
    Ok(listing
        .into_iter()
        .map(|(code, name)| (code.to_ascii_uppercase(), name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] = br#"{
        "date": "2024-03-01",
        "usd": { "usd": 1, "eur": 0.92, "gbp": 0.79, "jpy": 150.1, "btc": 0.000016, "bad": "x" }
    }"#;

    #[test]
    fn test_parse_rates_payload() {
        let quote = parse_rates_payload("USD", PAYLOAD).unwrap();

        assert_eq!(quote.date.as_deref(), Some("2024-03-01"));
        assert_eq!(quote.rates.get("EUR"), Some(&0.92));
        assert_eq!(quote.rates.get("USD"), Some(&1.0));
        assert!(!quote.rates.contains_key("BAD"));
        assert!(!quote.rates.contains_key("eur"));
    }

    #[test]
    fn test_parse_rates_missing_base() {
        let err = parse_rates_payload("EUR", PAYLOAD).unwrap_err();
        assert_eq!(err, RatesError::MissingBase("EUR".to_string()));

        assert!(matches!(
            parse_rates_payload("USD", b"[1, 2]"),
            Err(RatesError::Parse(_))
        ));
    }

    #[test]
    fn test_from_quote_filters_supported() {
        let quote = parse_rates_payload("usd", PAYLOAD).unwrap();
        let supported: Vec<String> = ["usd", "EUR", "GBP", "JPY"].iter().map(|s| s.to_string()).collect();
        let rates = ExchangeRates::from_quote("usd", quote, &supported, 1_000);

        assert_eq!(rates.base, "USD");
        assert_eq!(rates.last_updated, 1_000);
        assert_eq!(rates.rates.len(), 4);
        assert_eq!(rates.rate("jpy"), Some(150.1));
        assert_eq!(rates.rate("BTC"), None);
    }

    #[test]
    fn test_staleness_boundary() {
        let rates = ExchangeRates {
            base: "USD".to_string(),
            rates: BTreeMap::new(),
            last_updated: 0,
        };

        assert!(!rates.is_stale(DEFAULT_MAX_AGE_MS - 1, DEFAULT_MAX_AGE_MS));
        assert!(rates.is_stale(DEFAULT_MAX_AGE_MS, DEFAULT_MAX_AGE_MS));
    }

    #[test]
    fn test_document_uses_camel_case() {
        let rates = ExchangeRates {
            base: "USD".to_string(),
            rates: BTreeMap::from([("EUR".to_string(), 0.5)]),
            last_updated: 42,
        };
        let json = serde_json::to_value(&rates).unwrap();
        assert_eq!(json["lastUpdated"], 42);
        assert_eq!(json["rates"]["EUR"], 0.5);
    }

    #[test]
    fn test_parse_currency_listing() {
        let listing = parse_currency_listing(br#"{"usd": "US Dollar", "eur": "Euro"}"#).unwrap();
        assert_eq!(listing.get("USD").map(String::as_str), Some("US Dollar"));
        assert_eq!(listing.len(), 2);
    }
}
