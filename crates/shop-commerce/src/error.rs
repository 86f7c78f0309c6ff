//! Commerce error types.

use crate::pricing::PricingError;
use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variation not found on its product.
    #[error("Variation not found: {0}")]
    VariationNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Not a three-letter currency code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// Checkout started with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Operation requires a signed-in customer.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Payment gateway failure.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Order repository failure.
    #[error("Order repository error: {0}")]
    Repository(String),

    /// Strict pricing failure.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<shop_cache::CacheError> for CommerceError {
    fn from(e: shop_cache::CacheError) -> Self {
        CommerceError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CommerceError {
    fn from(e: toml::de::Error) -> Self {
        CommerceError::Config(e.to_string())
    }
}
