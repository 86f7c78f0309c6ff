//! Rate provider abstraction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{RateQuote, RatesError};

/// A source of exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch rates relative to `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateQuote, RatesError>;

    /// Fetch the full code to name listing.
    async fn fetch_currencies(&self) -> Result<BTreeMap<String, String>, RatesError>;
}

/// Provider serving fixed quotes.
///
/// Useful offline and in tests; it can be told to fail and counts calls.
#[derive(Debug, Default)]
pub struct StaticRateProvider {
    rates: BTreeMap<String, f64>,
    currencies: BTreeMap<String, String>,
    failure: Mutex<Option<RatesError>>,
    calls: AtomicUsize,
}

impl StaticRateProvider {
    /// Create a provider returning `rates` for any base.
    pub fn new<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.into().to_ascii_uppercase(), rate))
                .collect(),
            ..Self::default()
        }
    }

    /// Set the currency listing.
    pub fn with_currencies<I, S>(mut self, currencies: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.currencies = currencies
            .into_iter()
            .map(|(code, name)| (code.into().to_ascii_uppercase(), name.into()))
            .collect();
        self
    }

    /// Make every following call fail with `error`, or succeed again with `None`.
    pub fn set_failure(&self, error: Option<RatesError>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = error;
        }
    }

    /// Number of fetches served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), RatesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .failure
            .lock()
            .map_err(|_| RatesError::Request("provider state poisoned".to_string()))?;
        match failure.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch_rates(&self, _base: &str) -> Result<RateQuote, RatesError> {
        self.check_failure()?;
        Ok(RateQuote {
            date: None,
            rates: self.rates.clone(),
        })
    }

    async fn fetch_currencies(&self) -> Result<BTreeMap<String, String>, RatesError> {
        self.check_failure()?;
        Ok(self.currencies.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_serves_rates() {
        let provider = StaticRateProvider::new([("usd", 1.0), ("eur", 0.9)]);
        let quote = provider.fetch_rates("USD").await.unwrap();

        assert_eq!(quote.rates.get("EUR"), Some(&0.9));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_static_provider_failure_toggle() {
        let provider = StaticRateProvider::new([("USD", 1.0)]);
        provider.set_failure(Some(RatesError::Timeout("down".to_string())));
        assert!(provider.fetch_rates("USD").await.is_err());

        provider.set_failure(None);
        assert!(provider.fetch_rates("USD").await.is_ok());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_static_provider_currencies() {
        let provider =
            StaticRateProvider::new([("USD", 1.0)]).with_currencies([("usd", "US Dollar")]);
        let listing = provider.fetch_currencies().await.unwrap();
        assert_eq!(listing.get("USD").map(String::as_str), Some("US Dollar"));
    }
}
