//! Per-session storefront context.
//!
//! A [`Storefront`] owns the session's cart and language and shares the
//! configuration, catalog and currency converter with other sessions.
//! Every cart mutation is persisted before the call returns.

use crate::cart::{compute_totals, Cart, CartTotals};
use crate::catalog::{CatalogStore, Product};
use crate::checkout::{
    CheckoutFlow, CheckoutOrchestrator, CheckoutSession, Customer, OrderRepository,
    PaymentGateway, ShippingMethod,
};
use crate::config::ShopConfig;
use crate::error::CommerceError;
use crate::ids::{ProductId, VariationId};
use crate::money::{Currency, Money};
use crate::pricing::{Conversion, CurrencyConverter};
use crate::search::{ProductQuery, SearchResults};
use shop_cache::Cache;
use std::sync::Arc;

/// A shopper's session.
pub struct Storefront {
    config: Arc<ShopConfig>,
    cache: Cache,
    converter: Arc<CurrencyConverter>,
    catalog: Arc<dyn CatalogStore>,
    cart: Cart,
    language: String,
}

impl Storefront {
    /// Open a session, restoring the persisted cart.
    pub fn open(
        config: Arc<ShopConfig>,
        cache: Cache,
        converter: Arc<CurrencyConverter>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Result<Self, CommerceError> {
        let mut cart = Cart::load(&cache, config.currency.default)?;
        if !config.is_supported_currency(cart.currency()) {
            tracing::warn!(
                currency = %cart.currency(),
                "persisted cart currency is no longer supported"
            );
            cart.set_currency(config.currency.default);
        }
        let language = config.default_language().to_string();

        tracing::debug!(items = cart.items().len(), currency = %cart.currency(), "storefront opened");
        Ok(Self {
            config,
            cache,
            converter,
            catalog,
            cart,
            language,
        })
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn currency(&self) -> Currency {
        self.cart.currency()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switch language; unsupported codes select the default language.
    pub fn set_language(&mut self, lang: &str) {
        self.language = self.config.resolve_language(lang).to_string();
    }

    /// Switch the display currency.
    pub fn set_currency(&mut self, currency: Currency) -> Result<(), CommerceError> {
        if !self.config.is_supported_currency(currency) {
            return Err(CommerceError::InvalidCurrency(currency.to_string()));
        }
        self.cart.set_currency(currency);
        self.save()
    }

    /// Add a purchasable variation to the cart.
    pub fn add_to_cart(
        &mut self,
        product_id: ProductId,
        variation_id: VariationId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        let (_, variation) = self.catalog.variation(&product_id, &variation_id)?;
        if !variation.is_purchasable() {
            return Err(CommerceError::Validation(format!(
                "{}/{} is not available",
                product_id, variation_id
            )));
        }
        self.cart.add_item(product_id, variation_id, quantity)?;
        self.save()
    }

    /// Set a line's quantity; <= 0 removes it.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        variation_id: &VariationId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        let touched = self.cart.update_quantity(product_id, variation_id, quantity)?;
        if touched {
            self.save()?;
        }
        Ok(touched)
    }

    pub fn remove_from_cart(
        &mut self,
        product_id: &ProductId,
        variation_id: &VariationId,
    ) -> Result<bool, CommerceError> {
        let removed = self.cart.remove_item(product_id, variation_id);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn clear_cart(&mut self) -> Result<(), CommerceError> {
        self.cart.clear();
        self.save()
    }

    /// Totals with the configured flat shipping fee.
    pub async fn totals(&self) -> Result<CartTotals, CommerceError> {
        let settings = self.config.totals_settings();
        compute_totals(
            self.cart.items(),
            self.catalog.as_ref(),
            self.cart.currency(),
            &self.converter,
            &settings,
        )
        .await
    }

    /// Totals charging `method` for shipping.
    pub async fn totals_with_shipping(
        &self,
        method: &ShippingMethod,
    ) -> Result<CartTotals, CommerceError> {
        let settings = self.config.totals_settings().with_shipping_method(method);
        compute_totals(
            self.cart.items(),
            self.catalog.as_ref(),
            self.cart.currency(),
            &self.converter,
            &settings,
        )
        .await
    }

    /// A base price in the display currency.
    pub async fn price(&self, amount: i64) -> Conversion {
        self.converter.convert(amount, self.cart.currency()).await
    }

    /// Render display-currency minor units.
    pub fn format(&self, amount: i64) -> String {
        Money::new(amount, self.cart.currency()).display()
    }

    /// A listing query with the session language's default sort and page size.
    pub fn query(&self) -> ProductQuery {
        self.config.product_list(&self.language).query()
    }

    pub fn search(&self, query: &ProductQuery) -> SearchResults<&Product> {
        query.execute(self.catalog.as_ref())
    }

    pub fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.catalog.product_by_slug(slug, &self.language)
    }

    /// Start a checkout over the session language's configured steps.
    pub fn begin_checkout(&self, customer: Customer) -> Result<CheckoutFlow, CommerceError> {
        let customer = match customer.preferred_language {
            Some(_) => customer,
            None => customer.with_language(self.language.clone()),
        };
        CheckoutFlow::with_steps(
            customer,
            self.config.checkout(&self.language).steps.iter().copied(),
        )
    }

    /// Hand a ready flow and the cart to the payment gateway.
    pub async fn checkout<G, R>(
        &self,
        orchestrator: &CheckoutOrchestrator<G, R>,
        flow: &mut CheckoutFlow,
    ) -> Result<CheckoutSession, CommerceError>
    where
        G: PaymentGateway,
        R: OrderRepository,
    {
        orchestrator
            .start_session(flow, &self.cart, self.catalog.as_ref(), &self.converter)
            .await
    }

    /// Persist the cart.
    pub fn save(&self) -> Result<(), CommerceError> {
        self.cart.save(&self.cache)
    }

    /// End the session, keeping the cart.
    pub fn close(self) -> Result<(), CommerceError> {
        self.save()
    }

    /// End the session and empty the cart.
    pub fn sign_out(mut self) -> Result<(), CommerceError> {
        self.cart.clear();
        self.cart.set_currency(self.config.currency.default);
        self.save()
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("language", &self.language)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}
