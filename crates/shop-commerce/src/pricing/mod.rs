//! Currency-aware pricing.
//!
//! [`CurrencyConverter`] turns base-currency minor units into a target
//! currency using cached exchange rates, and [`format_price`] renders
//! amounts for display.
//!
//! Conversion never blocks a purchase: when rates cannot be fetched or the
//! target currency is unknown, [`CurrencyConverter::convert`] returns the
//! unconverted amount tagged as [`Conversion::Fallback`].

mod converter;
mod format;

pub use converter::{Conversion, ConverterSettings, CurrencyConverter, RATES_KEY};
pub use format::{format_amount, format_price};

use thiserror::Error;

/// Errors from strict conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Rates could not be fetched.
    #[error("Failed to fetch exchange rates: {0}")]
    RateFetch(String),

    /// Target currency is missing from the rates.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Persisted rates could not be read or written.
    #[error("Rate store error: {0}")]
    Store(String),
}
