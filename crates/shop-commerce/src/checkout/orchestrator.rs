//! Hand-off from a finished checkout flow to payment and order storage.

use crate::cart::{compute_totals, Cart, CartItem, TotalsSettings};
use crate::catalog::CatalogStore;
use crate::checkout::flow::require_user;
use crate::checkout::{
    Address, CheckoutFlow, Customer, FulfillmentStatus, Order, OrderItem, PaymentStatus,
    ProductSnapshot,
};
use crate::clock::current_timestamp;
use crate::error::CommerceError;
use crate::ids::{CheckoutId, OrderId, ProductId, UserId, VariationId};
use crate::money::Currency;
use crate::pricing::CurrencyConverter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Metadata key holding the buyer's user id.
pub const META_USER_ID: &str = "userId";
/// Metadata key holding the shipping address id.
pub const META_SHIPPING_ADDRESS_ID: &str = "shippingAddressId";
/// Metadata key holding the cart lines as JSON.
pub const META_CART_ITEMS: &str = "cartItems";

/// One priced line sent to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionLineItem {
    pub product_id: ProductId,
    pub variation_id: VariationId,
    /// Name in the customer's language.
    pub name: String,
    pub image: Option<String>,
    /// Unit price in the session currency.
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Everything a gateway needs to open a hosted payment session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub checkout_id: CheckoutId,
    pub customer: Customer,
    pub currency: Currency,
    pub line_items: Vec<SessionLineItem>,
    pub shipping_address: Address,
    pub shipping_amount: i64,
    pub tax_amount: i64,
    /// Echoed back on completion.
    pub metadata: BTreeMap<String, String>,
}

/// A gateway-side payment session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page, if any.
    pub url: Option<String>,
}

/// A normalized "payment completed" notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPayment {
    pub session_id: String,
    /// Metadata sent with the session request.
    pub metadata: BTreeMap<String, String>,
    pub shipping_address: Address,
    /// Lower or upper case code.
    pub currency: String,
    pub amount_total: i64,
    pub amount_tax: i64,
    pub amount_shipping: i64,
    pub payment_intent_id: Option<String>,
}

impl CompletedPayment {
    /// The buyer, rejecting missing and guest ids.
    pub fn user_id(&self) -> Result<UserId, CommerceError> {
        let user = UserId::new(
            self.metadata
                .get(META_USER_ID)
                .map(String::as_str)
                .unwrap_or_default(),
        );
        require_user(&user)?;
        Ok(user)
    }

    /// Cart lines carried in the metadata.
    pub fn cart_items(&self) -> Result<Vec<CartItem>, CommerceError> {
        let json = self.metadata.get(META_CART_ITEMS).ok_or_else(|| {
            CommerceError::Validation("cart items missing from payment metadata".to_string())
        })?;
        Ok(serde_json::from_str(json)?)
    }
}

/// Opens payment sessions with an external processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, CommerceError>;
}

/// Persists orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order: &Order) -> Result<(), CommerceError>;

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, CommerceError>;

    /// Orders of `user`, newest first.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, CommerceError>;

    /// Set either status; `OrderNotFound` for unknown ids.
    async fn update_status(
        &self,
        id: &OrderId,
        payment: Option<PaymentStatus>,
        fulfillment: Option<FulfillmentStatus>,
    ) -> Result<(), CommerceError>;
}

/// Orders held in memory.
#[derive(Debug, Default)]
pub struct MemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), CommerceError> {
        self.orders
            .write()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, CommerceError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| &o.user_id == user)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        payment: Option<PaymentStatus>,
        fulfillment: Option<FulfillmentStatus>,
    ) -> Result<(), CommerceError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(id)
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
        order.update_status(payment, fulfillment);
        Ok(())
    }
}

/// Drives a ready checkout through the gateway and records the order.
#[derive(Debug)]
pub struct CheckoutOrchestrator<G, R> {
    gateway: G,
    orders: R,
    settings: TotalsSettings,
    default_language: String,
}

impl<G: PaymentGateway, R: OrderRepository> CheckoutOrchestrator<G, R> {
    pub fn new(gateway: G, orders: R) -> Self {
        Self {
            gateway,
            orders,
            settings: TotalsSettings::default(),
            default_language: "en".to_string(),
        }
    }

    /// Tax rate and flat shipping fee used when no method is selected.
    pub fn with_settings(mut self, settings: TotalsSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_default_language(mut self, lang: impl Into<String>) -> Self {
        self.default_language = lang.into();
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn orders(&self) -> &R {
        &self.orders
    }

    /// Open a payment session for `cart` and mark `flow` complete.
    ///
    /// Amounts are in the cart's currency. Fails without side effects if
    /// the flow is not at its final step with every prerequisite, the cart
    /// is empty, or a line no longer resolves to an active variation.
    pub async fn start_session<C>(
        &self,
        flow: &mut CheckoutFlow,
        cart: &Cart,
        catalog: &C,
        converter: &CurrencyConverter,
    ) -> Result<CheckoutSession, CommerceError>
    where
        C: CatalogStore + ?Sized,
    {
        if flow.is_complete() {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: flow.step().as_str().to_string(),
                to: "complete".to_string(),
            });
        }
        let missing = flow.missing_for_step(crate::checkout::CheckoutStep::Complete);
        if !missing.is_empty() {
            return Err(CommerceError::CheckoutIncomplete(missing.join(", ")));
        }
        if !flow.is_ready() {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: flow.step().as_str().to_string(),
                to: "complete".to_string(),
            });
        }
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let address = flow
            .shipping_address
            .clone()
            .ok_or_else(|| CommerceError::CheckoutIncomplete("shipping address".to_string()))?;

        let settings = match &flow.shipping_method {
            Some(method) => self.settings.clone().with_shipping_method(method),
            None => self.settings.clone(),
        };
        let currency = cart.currency();
        let totals = compute_totals(cart.items(), catalog, currency, converter, &settings).await?;
        if let Some(line) = totals.skipped.first() {
            return Err(CommerceError::Validation(format!(
                "cart item {}/{} is unavailable: {}",
                line.product_id, line.variation_id, line.reason
            )));
        }

        let lang = flow
            .customer
            .preferred_language
            .clone()
            .unwrap_or_else(|| self.default_language.clone());
        let mut line_items = Vec::with_capacity(totals.lines.len());
        for line in &totals.lines {
            let (product, variation) = catalog.variation(&line.product_id, &line.variation_id)?;
            line_items.push(SessionLineItem {
                product_id: line.product_id.clone(),
                variation_id: line.variation_id.clone(),
                name: product.name.resolve(&lang, &self.default_language).to_string(),
                image: variation
                    .primary_image()
                    .or_else(|| product.primary_image())
                    .map(str::to_string),
                unit_amount: line.unit_price,
                quantity: line.quantity,
            });
        }

        let mut metadata = BTreeMap::new();
        metadata.insert(META_USER_ID.to_string(), flow.customer.user_id.to_string());
        metadata.insert(META_SHIPPING_ADDRESS_ID.to_string(), address.id.to_string());
        metadata.insert(
            META_CART_ITEMS.to_string(),
            serde_json::to_string(cart.items())?,
        );

        let request = CheckoutSessionRequest {
            checkout_id: flow.id.clone(),
            customer: flow.customer.clone(),
            currency,
            line_items,
            shipping_address: address,
            shipping_amount: totals.shipping,
            tax_amount: totals.tax,
            metadata,
        };

        let session = self.gateway.create_session(&request).await?;
        flow.mark_complete();

        tracing::info!(
            checkout = %flow.id,
            session = %session.id,
            currency = %currency,
            total = totals.total,
            "checkout session created"
        );
        Ok(session)
    }

    /// Build and store the order for a completed payment.
    ///
    /// `subtotal` sums catalog prices in the base currency while `tax`,
    /// `shipping`, `total` and `currency` come from the payment, so the two
    /// differ whenever the customer paid in another currency.
    pub async fn complete_payment<C>(
        &self,
        payment: &CompletedPayment,
        catalog: &C,
    ) -> Result<Order, CommerceError>
    where
        C: CatalogStore + ?Sized,
    {
        let user_id = payment.user_id()?;
        let currency = Currency::from_code(&payment.currency)?;

        let mut items = Vec::new();
        let mut subtotal: i64 = 0;
        for item in payment.cart_items()? {
            let (product, variation) = catalog.variation(&item.product_id, &item.variation_id)?;
            let line = variation
                .price
                .checked_mul(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            subtotal = subtotal.checked_add(line).ok_or(CommerceError::Overflow)?;

            items.push(OrderItem {
                product_id: item.product_id,
                variation_id: item.variation_id,
                product_snapshot: ProductSnapshot {
                    name: product.name.clone(),
                    price: variation.price,
                    image: variation
                        .primary_image()
                        .or_else(|| product.primary_image())
                        .unwrap_or_default()
                        .to_string(),
                },
                quantity: item.quantity,
                price: variation.price,
            });
        }

        let now = current_timestamp();
        let order = Order {
            id: OrderId::new(payment.session_id.clone()),
            user_id,
            items,
            subtotal,
            tax: payment.amount_tax,
            shipping: payment.amount_shipping,
            total: payment.amount_total,
            currency,
            shipping_address: payment.shipping_address.clone(),
            payment_status: PaymentStatus::Paid,
            fulfillment_status: FulfillmentStatus::Unfulfilled,
            checkout_id: Some(payment.session_id.clone()),
            payment_intent_id: payment.payment_intent_id.clone(),
            created_at: now,
            updated_at: now,
        };

        self.orders.save(&order).await?;
        tracing::info!(order = %order.id, user = %order.user_id, "order recorded");
        Ok(order)
    }
}
