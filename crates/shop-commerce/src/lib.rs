//! Storefront domain types and logic for GlobalShop.
//!
//! A multi-language, multi-currency storefront core:
//!
//! - **Catalog**: Products, variations, attributes, categories
//! - **Search**: Attribute facets, product queries, pagination
//! - **Pricing**: Exchange-rate caching, conversion, price formatting
//! - **Cart**: Cart store and totals in the display currency
//! - **Checkout**: Step sequence, payment hand-off, orders
//! - **Config**: Store settings and per-language layouts
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_commerce::prelude::*;
//!
//! let config = Arc::new(ShopConfig::load("shop.toml")?);
//! let cache = Cache::open(".shop")?;
//! let converter = Arc::new(CurrencyConverter::new(
//!     Arc::new(config.rate_provider()?),
//!     cache.clone(),
//!     config.converter_settings(),
//! ));
//! let catalog = Arc::new(InMemoryCatalog::load("catalog.json")?);
//!
//! let mut shop = Storefront::open(config, cache, converter, catalog)?;
//! shop.add_to_cart(ProductId::new("tee"), VariationId::new("tee-m"), 2)?;
//! shop.set_currency(Currency::EUR)?;
//!
//! let totals = shop.totals().await?;
//! println!("Total: {}", shop.format(totals.total));
//! ```

pub mod clock;
pub mod error;
pub mod i18n;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod pricing;
pub mod search;
pub mod storefront;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use storefront::Storefront;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::i18n::LocalizedText;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::storefront::Storefront;

    // Catalog
    pub use crate::catalog::{
        Attribute, AttributeOption, CatalogStore, Category, InMemoryCatalog, Product, Variation,
    };

    // Search
    pub use crate::search::{
        apply_facets, build_facets, AttributeFilter, FacetSelection, Pagination, ProductQuery,
        SearchResults, SortOption,
    };

    // Pricing
    pub use crate::pricing::{format_price, Conversion, CurrencyConverter, PricingError};

    // Cart
    pub use crate::cart::{compute_totals, Cart, CartItem, CartTotals, TotalsSettings};

    // Checkout
    pub use crate::checkout::{
        Address, CheckoutFlow, CheckoutOrchestrator, CheckoutStep, CompletedPayment, Customer,
        FulfillmentStatus, Order, OrderRepository, PaymentGateway, PaymentStatus, ShippingMethod,
    };

    // Config
    pub use crate::config::{LayoutConfig, ShopConfig};

    pub use shop_cache::Cache;
    pub use std::sync::Arc;
}
