//! Exchange-rate caching and conversion.

use crate::clock::{Clock, SystemClock};
use crate::money::{round_half_up, Currency};
use crate::pricing::PricingError;
use shop_cache::{cache_key, Cache};
use shop_rates::{ExchangeRates, RateProvider};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key of the shared rates document.
pub const RATES_KEY: &str = "exchangeRates:current";

/// Outcome of [`CurrencyConverter::convert`].
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Target is the base currency.
    Unchanged { amount: i64 },
    /// Converted at `rate`.
    Converted { amount: i64, rate: f64 },
    /// Conversion failed; `amount` is the unconverted input.
    Fallback { amount: i64, reason: PricingError },
}

impl Conversion {
    /// The amount to use, converted or not.
    pub fn amount(&self) -> i64 {
        match self {
            Conversion::Unchanged { amount }
            | Conversion::Converted { amount, .. }
            | Conversion::Fallback { amount, .. } => *amount,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Conversion::Fallback { .. })
    }
}

/// Converter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterSettings {
    /// Currency catalog prices are expressed in.
    pub base: Currency,
    /// Currencies kept from a provider response. Empty keeps all.
    pub supported: Vec<Currency>,
    /// Age at which rates are refreshed.
    pub max_age: Duration,
    /// First cool-down after a failed refresh.
    pub cooldown_initial: Duration,
    /// Longest cool-down.
    pub cooldown_max: Duration,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            base: Currency::USD,
            supported: vec![Currency::USD, Currency::EUR, Currency::GBP, Currency::JPY],
            max_age: Duration::from_secs(24 * 60 * 60),
            cooldown_initial: Duration::from_secs(60),
            cooldown_max: Duration::from_secs(60 * 60),
        }
    }
}

/// Failed-refresh bookkeeping.
#[derive(Debug, Default)]
struct RefreshBackoff {
    failures: u32,
    retry_after: i64,
}

/// Converts base-currency amounts using cached exchange rates.
///
/// Rates are looked up in memory, then in the persisted document, then
/// fetched from the provider. Concurrent callers that all see stale rates
/// may each refresh; the last write wins.
pub struct CurrencyConverter {
    provider: Arc<dyn RateProvider>,
    cache: Cache,
    clock: Arc<dyn Clock>,
    settings: ConverterSettings,
    rates: RwLock<Option<ExchangeRates>>,
    backoff: Mutex<RefreshBackoff>,
}

impl CurrencyConverter {
    /// Create a converter on the system clock.
    pub fn new(provider: Arc<dyn RateProvider>, cache: Cache, settings: ConverterSettings) -> Self {
        Self {
            provider,
            cache,
            clock: Arc::new(SystemClock),
            settings,
            rates: RwLock::new(None),
            backoff: Mutex::new(RefreshBackoff::default()),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The base currency.
    pub fn base(&self) -> Currency {
        self.settings.base
    }

    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    fn max_age_ms(&self) -> i64 {
        i64::try_from(self.settings.max_age.as_millis()).unwrap_or(i64::MAX)
    }

    fn is_usable(&self, rates: &ExchangeRates, now: i64) -> bool {
        rates.base.eq_ignore_ascii_case(self.settings.base.code())
            && !rates.is_stale(now, self.max_age_ms())
    }

    /// Current rates, refreshed when stale.
    pub async fn get_rates(&self) -> Result<ExchangeRates, PricingError> {
        let now = self.clock.now_millis();

        if let Some(rates) = self.rates.read().await.as_ref() {
            if self.is_usable(rates, now) {
                return Ok(rates.clone());
            }
        }

        match self.cache.get::<ExchangeRates>(RATES_KEY) {
            Ok(Some(rates)) if self.is_usable(&rates, now) => {
                tracing::debug!(key = RATES_KEY, "using persisted exchange rates");
                *self.rates.write().await = Some(rates.clone());
                return Ok(rates);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to read persisted exchange rates"),
        }

        self.refresh().await
    }

    /// Fetch fresh rates from the provider, ignoring the cached copies.
    ///
    /// Refused while a previous failure's cool-down is running.
    pub async fn refresh(&self) -> Result<ExchangeRates, PricingError> {
        let now = self.clock.now_millis();
        self.check_cooldown(now)?;

        let base = self.settings.base;
        let quote = match self.provider.fetch_rates(base.code()).await {
            Ok(quote) => quote,
            Err(e) => {
                let wait = self.record_failure(now);
                tracing::warn!(
                    base = %base,
                    error = %e,
                    retry_in_secs = wait.as_secs(),
                    "exchange rate refresh failed"
                );
                return Err(PricingError::RateFetch(e.to_string()));
            }
        };

        let supported: Vec<String> = self
            .settings
            .supported
            .iter()
            .map(|c| c.code().to_string())
            .collect();
        let rates = ExchangeRates::from_quote(base.code(), quote, &supported, now);

        if let Err(e) = self.cache.set(RATES_KEY, &rates) {
            tracing::warn!(error = %e, "failed to persist exchange rates");
        }
        *self.rates.write().await = Some(rates.clone());
        self.reset_backoff();

        tracing::info!(base = %base, currencies = rates.rates.len(), "exchange rates refreshed");
        Ok(rates)
    }

    /// Convert `amount` (base minor units) into `target`.
    ///
    /// Never fails; see [`Conversion`].
    pub async fn convert(&self, amount: i64, target: Currency) -> Conversion {
        if target == self.settings.base {
            return Conversion::Unchanged { amount };
        }

        match self.lookup_rate(target).await {
            Ok(rate) => Conversion::Converted {
                amount: round_half_up(amount as f64 * rate),
                rate,
            },
            Err(reason) => {
                tracing::warn!(
                    target = %target,
                    reason = %reason,
                    "price conversion fell back to base amount"
                );
                Conversion::Fallback { amount, reason }
            }
        }
    }

    /// Convert `amount` into `target`, surfacing failures.
    pub async fn try_convert(&self, amount: i64, target: Currency) -> Result<i64, PricingError> {
        if target == self.settings.base {
            return Ok(amount);
        }
        let rate = self.lookup_rate(target).await?;
        Ok(round_half_up(amount as f64 * rate))
    }

    async fn lookup_rate(&self, target: Currency) -> Result<f64, PricingError> {
        let rates = self.get_rates().await?;
        rates
            .rate(target.code())
            .ok_or_else(|| PricingError::UnsupportedCurrency(target.to_string()))
    }

    /// Every currency the provider knows, code to name.
    pub async fn available_currencies(&self) -> Result<BTreeMap<String, String>, PricingError> {
        let key = cache_key!("exchangeRates", "currencies");
        match self.provider.fetch_currencies().await {
            Ok(listing) => {
                if let Err(e) = self.cache.set(&key, &listing) {
                    tracing::warn!(error = %e, "failed to persist currency listing");
                }
                Ok(listing)
            }
            Err(e) => match self.cache.get::<BTreeMap<String, String>>(&key) {
                Ok(Some(listing)) => {
                    tracing::warn!(error = %e, "currency listing fetch failed, using persisted copy");
                    Ok(listing)
                }
                _ => Err(PricingError::RateFetch(e.to_string())),
            },
        }
    }

    /// Rates currently held in memory, fresh or not.
    pub async fn cached_rates(&self) -> Option<ExchangeRates> {
        self.rates.read().await.clone()
    }

    fn check_cooldown(&self, now: i64) -> Result<(), PricingError> {
        let backoff = self.backoff.lock().unwrap_or_else(|e| e.into_inner());
        if backoff.failures > 0 && now < backoff.retry_after {
            return Err(PricingError::RateFetch(format!(
                "refresh suspended for {}s after {} failure(s)",
                (backoff.retry_after - now + 999) / 1000,
                backoff.failures
            )));
        }
        Ok(())
    }

    fn record_failure(&self, now: i64) -> Duration {
        let mut backoff = self.backoff.lock().unwrap_or_else(|e| e.into_inner());
        backoff.failures = backoff.failures.saturating_add(1);
        let factor = 2u32.saturating_pow((backoff.failures - 1).min(16));
        let wait = self
            .settings
            .cooldown_initial
            .saturating_mul(factor)
            .min(self.settings.cooldown_max);
        backoff.retry_after = now.saturating_add(i64::try_from(wait.as_millis()).unwrap_or(i64::MAX));
        wait
    }

    fn reset_backoff(&self) {
        let mut backoff = self.backoff.lock().unwrap_or_else(|e| e.into_inner());
        *backoff = RefreshBackoff::default();
    }
}

impl std::fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use shop_rates::{RatesError, StaticRateProvider};

    const HOUR: i64 = 60 * 60 * 1000;
    const NOW: i64 = 1_700_000_000_000;

    struct Fixture {
        provider: Arc<StaticRateProvider>,
        clock: Arc<FixedClock>,
        cache: Cache,
        converter: CurrencyConverter,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(StaticRateProvider::new([
            ("USD", 1.0),
            ("EUR", 0.92),
            ("GBP", 0.5),
            ("JPY", 150.0),
            ("CHF", 0.88),
        ]));
        let clock = Arc::new(FixedClock::new(NOW));
        let cache = Cache::memory();
        let converter = CurrencyConverter::new(
            provider.clone(),
            cache.clone(),
            ConverterSettings::default(),
        )
        .with_clock(clock.clone());

        Fixture {
            provider,
            clock,
            cache,
            converter,
        }
    }

    #[tokio::test]
    async fn test_identity_conversion_skips_provider() {
        let f = fixture();
        for amount in [0, 1, -250, 1999, i64::MAX] {
            assert_eq!(
                f.converter.convert(amount, Currency::USD).await,
                Conversion::Unchanged { amount }
            );
        }
        assert_eq!(f.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_rounds_half_up() {
        let f = fixture();

        // 5 * 0.5 = 2.5 -> 3, -5 * 0.5 = -2.5 -> -2
        assert_eq!(f.converter.try_convert(5, Currency::GBP).await.unwrap(), 3);
        assert_eq!(f.converter.try_convert(-5, Currency::GBP).await.unwrap(), -2);
        assert_eq!(f.converter.try_convert(0, Currency::EUR).await.unwrap(), 0);
        assert_eq!(f.converter.try_convert(1999, Currency::JPY).await.unwrap(), 299850);

        let conversion = f.converter.convert(1000, Currency::EUR).await;
        assert_eq!(
            conversion,
            Conversion::Converted {
                amount: 920,
                rate: 0.92
            }
        );
    }

    #[tokio::test]
    async fn test_rates_fetched_once_while_fresh() {
        let f = fixture();
        f.converter.convert(100, Currency::EUR).await;
        f.clock.advance(23 * HOUR);
        f.converter.convert(100, Currency::EUR).await;
        assert_eq!(f.provider.calls(), 1);

        f.clock.advance(HOUR);
        f.converter.convert(100, Currency::EUR).await;
        assert_eq!(f.provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_currency_falls_back() {
        let f = fixture();

        // CHF is served by the provider but not in the supported set.
        let conversion = f.converter.convert(1999, Currency::CHF).await;
        assert_eq!(conversion.amount(), 1999);
        assert!(matches!(
            conversion,
            Conversion::Fallback {
                reason: PricingError::UnsupportedCurrency(_),
                ..
            }
        ));
        assert!(matches!(
            f.converter.try_convert(1999, Currency::CHF).await,
            Err(PricingError::UnsupportedCurrency(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_and_cools_down() {
        let f = fixture();
        f.provider
            .set_failure(Some(RatesError::Connection("offline".to_string())));

        let conversion = f.converter.convert(1999, Currency::EUR).await;
        assert_eq!(conversion.amount(), 1999);
        assert!(matches!(
            conversion,
            Conversion::Fallback {
                reason: PricingError::RateFetch(_),
                ..
            }
        ));
        assert_eq!(f.provider.calls(), 1);

        // Provider recovers, but the cool-down still holds.
        f.provider.set_failure(None);
        assert!(f.converter.convert(1999, Currency::EUR).await.is_fallback());
        assert_eq!(f.provider.calls(), 1);

        f.clock.advance(60 * 1000);
        assert_eq!(f.converter.convert(1000, Currency::EUR).await.amount(), 920);
        assert_eq!(f.provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_cooldown_doubles_and_caps() {
        let f = fixture();
        assert_eq!(f.converter.record_failure(NOW), Duration::from_secs(60));
        assert_eq!(f.converter.record_failure(NOW), Duration::from_secs(120));
        for _ in 0..10 {
            f.converter.record_failure(NOW);
        }
        assert_eq!(f.converter.record_failure(NOW), Duration::from_secs(3600));

        f.converter.reset_backoff();
        assert!(f.converter.check_cooldown(NOW).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_persists_document() {
        let f = fixture();
        let rates = f.converter.get_rates().await.unwrap();

        assert_eq!(rates.base, "USD");
        assert_eq!(rates.last_updated, NOW);
        assert_eq!(rates.rates.len(), 4);

        let stored: ExchangeRates = f.cache.get(RATES_KEY).unwrap().unwrap();
        assert_eq!(stored, rates);
    }

    #[tokio::test]
    async fn test_persisted_rates_shared_across_converters() {
        let f = fixture();
        f.converter.get_rates().await.unwrap();

        let second_provider = Arc::new(StaticRateProvider::new([("EUR", 2.0)]));
        let second = CurrencyConverter::new(
            second_provider.clone(),
            f.cache.clone(),
            ConverterSettings::default(),
        )
        .with_clock(f.clock.clone());

        assert_eq!(second.try_convert(100, Currency::EUR).await.unwrap(), 92);
        assert_eq!(second_provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_persisted_rates_are_refreshed() {
        let f = fixture();
        let stale = ExchangeRates {
            base: "USD".to_string(),
            rates: BTreeMap::from([("EUR".to_string(), 2.0)]),
            last_updated: NOW - 25 * HOUR,
        };
        f.cache.set(RATES_KEY, &stale).unwrap();

        assert_eq!(f.converter.try_convert(100, Currency::EUR).await.unwrap(), 92);
        assert_eq!(f.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_available_currencies_uses_persisted_copy_on_failure() {
        let provider = Arc::new(
            StaticRateProvider::new([("USD", 1.0)]).with_currencies([("usd", "US Dollar")]),
        );
        let converter =
            CurrencyConverter::new(provider.clone(), Cache::memory(), ConverterSettings::default());

        assert_eq!(converter.available_currencies().await.unwrap().len(), 1);

        provider.set_failure(Some(RatesError::Timeout("slow".to_string())));
        let listing = converter.available_currencies().await.unwrap();
        assert_eq!(listing.get("USD").map(String::as_str), Some("US Dollar"));
    }
}
