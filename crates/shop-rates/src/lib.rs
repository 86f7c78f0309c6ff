//! Exchange-rate provider client.
//!
//! This crate provides:
//! - `ExchangeRates` - The persisted rates document
//! - `RateProvider` - Source of rate quotes and currency listings
//! - `HttpRateProvider` - CDN-backed provider with retry and backoff
//! - `StaticRateProvider` - Fixed quotes for tests and offline use
//! - `RetryPolicy` - Retry strategies

mod error;
mod http;
mod provider;
mod rates;
mod retry;

pub use error::*;
pub use http::*;
pub use provider::*;
pub use rates::*;
pub use retry::*;
