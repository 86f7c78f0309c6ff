//! Retry policies for provider fetches.

use std::time::Duration;

use crate::RatesError;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Retry immediately.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt.min(16));
                base.saturating_mul(factor).min(*max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            max: Duration::from_secs(2),
        }
    }
}

/// Conditions that trigger a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCondition {
    /// Retry on a specific HTTP status code.
    StatusCode(u16),
    /// Retry on any 5xx status.
    ServerError,
    /// Retry on timeout.
    Timeout,
    /// Retry on connection error.
    ConnectionError,
}

impl RetryCondition {
    /// Check whether this condition covers `error`.
    pub fn matches(&self, error: &RatesError) -> bool {
        match (self, error) {
            (Self::StatusCode(code), RatesError::Http { status, .. }) => status == code,
            (Self::ServerError, RatesError::Http { status, .. }) => (500..600).contains(status),
            (Self::Timeout, RatesError::Timeout(_)) => true,
            (Self::ConnectionError, RatesError::Connection(_)) => true,
            _ => false,
        }
    }
}

/// Retry policy for a single provider call.
///
/// `max_attempts` counts retries after the first try, so a policy of 3 makes
/// at most four requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_attempts: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
    /// Conditions that trigger retry.
    pub retry_on: Vec<RetryCondition>,
}

impl RetryPolicy {
    /// Create a policy retrying transient failures up to `max_attempts` times.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::default(),
            retry_on: vec![
                RetryCondition::ServerError,
                RetryCondition::Timeout,
                RetryCondition::ConnectionError,
            ],
        }
    }

    /// Create a policy with no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: BackoffStrategy::None,
            retry_on: Vec::new(),
        }
    }

    /// Set backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Set retry conditions.
    pub fn with_conditions(mut self, conditions: Vec<RetryCondition>) -> Self {
        self.retry_on = conditions;
        self
    }

    /// Decide whether a failed try should be repeated.
    ///
    /// `attempt` is the number of retries already made.
    pub fn should_retry(&self, error: &RatesError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        self.retry_on.iter().any(|c| c.matches(error))
    }

    /// Delay to wait before retry number `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.delay_for_attempt(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> RatesError {
        RatesError::Http {
            status,
            url: "https://rates.test/currencies/usd.json".to_string(),
        }
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = BackoffStrategy::default();
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(800));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(40), Duration::from_secs(2));
    }

    #[test]
    fn test_default_policy_retries_transient_errors() {
        let policy = RetryPolicy::default();

        assert!(policy.should_retry(&http(502), 0));
        assert!(policy.should_retry(&RatesError::Timeout("t".into()), 2));
        assert!(policy.should_retry(&RatesError::Connection("c".into()), 1));
        assert!(!policy.should_retry(&http(404), 0));
        assert!(!policy.should_retry(&RatesError::Parse("p".into()), 0));
    }

    #[test]
    fn test_policy_stops_after_max_attempts() {
        let policy = RetryPolicy::new(2);
        assert!(policy.should_retry(&http(500), 1));
        assert!(!policy.should_retry(&http(500), 2));
        assert!(!RetryPolicy::none().should_retry(&http(500), 0));
    }

    #[test]
    fn test_custom_conditions() {
        let policy = RetryPolicy::new(1).with_conditions(vec![RetryCondition::StatusCode(429)]);
        assert!(policy.should_retry(&http(429), 0));
        assert!(!policy.should_retry(&http(503), 0));
    }
}
