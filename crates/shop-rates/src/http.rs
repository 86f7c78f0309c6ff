//! HTTP rate provider backed by the currency-api CDN.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::rates::{parse_currency_listing, parse_rates_payload};
use crate::{RateProvider, RateQuote, RatesError, RetryPolicy};

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate provider fetching JSON documents over HTTP.
///
/// Each request is retried under the configured [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpRateProvider {
    /// Create a provider for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RatesError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rates_url(&self, base: &str) -> String {
        format!("{}/currencies/{}.json", self.base_url, base.to_ascii_lowercase())
    }

    fn currencies_url(&self) -> String {
        format!("{}/currencies.json", self.base_url)
    }

    async fn get_once(&self, url: &str) -> Result<Vec<u8>, RatesError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(RatesError::Http {
                status,
                url: url.to_string(),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, RatesError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(err) if self.retry.should_retry(&err, attempt) => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "rate fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rates(&self, base: &str) -> Result<RateQuote, RatesError> {
        let body = self.get(&self.rates_url(base)).await?;
        parse_rates_payload(base, &body)
    }

    async fn fetch_currencies(&self) -> Result<BTreeMap<String, String>, RatesError> {
        let body = self.get(&self.currencies_url()).await?;
        parse_currency_listing(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackoffStrategy;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response per connection, in order.
    async fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts).with_backoff(BackoffStrategy::Fixed(Duration::from_millis(1)))
    }

    #[test]
    fn test_urls() {
        let provider = HttpRateProvider::new("https://rates.test/v1/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(provider.base_url(), "https://rates.test/v1");
        assert_eq!(provider.rates_url("USD"), "https://rates.test/v1/currencies/usd.json");
        assert_eq!(provider.currencies_url(), "https://rates.test/v1/currencies.json");
    }

    #[tokio::test]
    async fn test_fetch_rates_retries_server_errors() {
        let url = serve(vec![
            (503, "{}"),
            (200, r#"{"date":"2024-03-01","usd":{"eur":0.92}}"#),
        ])
        .await;
        let provider = HttpRateProvider::new(url, DEFAULT_TIMEOUT)
            .unwrap()
            .with_retry_policy(fast_retry(2));

        let quote = provider.fetch_rates("USD").await.unwrap();
        assert_eq!(quote.rates.get("EUR"), Some(&0.92));
    }

    #[tokio::test]
    async fn test_fetch_rates_does_not_retry_client_errors() {
        let url = serve(vec![(404, "{}")]).await;
        let provider = HttpRateProvider::new(url, DEFAULT_TIMEOUT)
            .unwrap()
            .with_retry_policy(fast_retry(3));

        let err = provider.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, RatesError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_currencies() {
        let url = serve(vec![(200, r#"{"usd":"US Dollar","eur":"Euro"}"#)]).await;
        let provider = HttpRateProvider::new(url, DEFAULT_TIMEOUT).unwrap();

        let listing = provider.fetch_currencies().await.unwrap();
        assert_eq!(listing.get("EUR").map(String::as_str), Some("Euro"));
    }
}
