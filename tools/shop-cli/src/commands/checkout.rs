//! Checkout and order commands.
//!
//! Payments are settled by [`LocalGateway`], which accepts every session and
//! lets the command complete it immediately. Orders are kept in the data
//! directory by [`LocalOrders`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shop_cache::Cache;
use shop_commerce::checkout::{
    Address, CheckoutOrchestrator, CheckoutSession, CheckoutSessionRequest, CheckoutStep,
    CompletedPayment, Customer, FulfillmentStatus, Order, OrderRepository, PaymentGateway,
    PaymentStatus,
};
use shop_commerce::{CommerceError, Money, OrderId, UserId};
use tokio::sync::Mutex;

use super::cart::{print_totals, shipping_method};
use super::{CheckoutArgs, OrdersArgs};
use crate::context::Context;
use crate::output::payment_badge;

/// Cache key of the order list.
const ORDERS_KEY: &str = "orders";

/// Gateway that approves every session locally.
#[derive(Debug, Default)]
pub struct LocalGateway {
    last_request: Mutex<Option<CheckoutSessionRequest>>,
}

impl LocalGateway {
    /// The most recent session request, if not yet taken.
    pub async fn take_request(&self) -> Option<CheckoutSessionRequest> {
        self.last_request.lock().await.take()
    }
}

#[async_trait]
impl PaymentGateway for LocalGateway {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, CommerceError> {
        *self.last_request.lock().await = Some(request.clone());
        Ok(CheckoutSession {
            id: format!("local_{}", request.checkout_id),
            url: None,
        })
    }
}

/// Orders stored as one list in the cache.
#[derive(Clone)]
pub struct LocalOrders {
    cache: Cache,
    // Serializes read-modify-write of the list.
    lock: std::sync::Arc<Mutex<()>>,
}

impl LocalOrders {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            lock: Default::default(),
        }
    }

    fn load(&self) -> Result<Vec<Order>, CommerceError> {
        Ok(self.cache.get(ORDERS_KEY)?.unwrap_or_default())
    }

    fn store(&self, orders: &[Order]) -> Result<(), CommerceError> {
        self.cache
            .set(ORDERS_KEY, &orders)
            .map_err(|e| CommerceError::Repository(e.to_string()))
    }
}

#[async_trait]
impl OrderRepository for LocalOrders {
    async fn save(&self, order: &Order) -> Result<(), CommerceError> {
        let _guard = self.lock.lock().await;
        let mut orders = self.load()?;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order.clone(),
            None => orders.push(order.clone()),
        }
        self.store(&orders)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        Ok(self.load()?.into_iter().find(|o| &o.id == id))
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, CommerceError> {
        let mut orders: Vec<Order> = self
            .load()?
            .into_iter()
            .filter(|o| &o.user_id == user)
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
        let _guard = self.lock.lock().await;
        let mut orders = self.load()?;
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
        order.update_status(payment, fulfillment);
        self.store(&orders)
    }
}

/// Settle a session request as fully paid.
fn settle(session: &CheckoutSession, request: &CheckoutSessionRequest) -> Result<CompletedPayment> {
    let mut total: i64 = 0;
    for line in &request.line_items {
        total = line
            .unit_amount
            .checked_mul(line.quantity)
            .and_then(|amount| total.checked_add(amount))
            .ok_or(CommerceError::Overflow)?;
    }
    let total = total
        .checked_add(request.shipping_amount)
        .and_then(|t| t.checked_add(request.tax_amount))
        .ok_or(CommerceError::Overflow)?;

    Ok(CompletedPayment {
        session_id: session.id.clone(),
        metadata: request.metadata.clone(),
        shipping_address: request.shipping_address.clone(),
        currency: request.currency.code().to_lowercase(),
        amount_total: total,
        amount_tax: request.tax_amount,
        amount_shipping: request.shipping_amount,
        payment_intent_id: Some(format!("pi_{}", request.checkout_id)),
    })
}

pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut shop = ctx.storefront()?;
    let method = shipping_method(&shop, &args.shipping)?;

    let mut flow = shop.begin_checkout(Customer::new(args.user.as_str(), args.email.as_str()))?;
    flow.set_shipping_address(Address::new(
        args.name,
        args.line1,
        args.city,
        args.postal_code,
        args.country,
    ));
    flow.set_shipping_method(method.clone());
    flow.set_payment_method(args.payment);

    let total_steps = flow.steps().len();
    ctx.output.step(
        flow_position(flow.steps(), flow.step()),
        total_steps,
        flow.step().display_name(),
    );
    while !flow.is_ready() {
        let step = flow.advance()?;
        ctx.output.step(
            flow_position(flow.steps(), step),
            total_steps,
            step.display_name(),
        );
    }

    if !ctx.output.is_json() {
        ctx.output.header("Order summary");
        let totals = shop.totals_with_shipping(&method).await?;
        print_totals(&shop, &totals, ctx);
    }

    let orders = LocalOrders::new(ctx.cache()?);
    let orchestrator = CheckoutOrchestrator::new(LocalGateway::default(), orders)
        .with_settings(shop.config().totals_settings())
        .with_default_language(shop.config().default_language());

    let session = shop.checkout(&orchestrator, &mut flow).await?;
    ctx.output.step(total_steps, total_steps, flow.step().display_name());

    let request = orchestrator
        .gateway()
        .take_request()
        .await
        .ok_or_else(|| anyhow!("Gateway recorded no session request"))?;
    let payment = settle(&session, &request)?;
    let order = orchestrator.complete_payment(&payment, shop.catalog()).await?;
    tracing::info!(order = %order.id, total = order.total, "order placed");

    if !args.keep_cart {
        shop.clear_cart()?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    ctx.output.success(&format!("Order {} placed", order.id));
    ctx.output.kv(
        "Charged",
        &Money::new(payment.amount_total, request.currency).display(),
    );
    ctx.output.kv("Payment", &payment_badge(order.payment_status));
    ctx.output.kv("Ship to", &order.shipping_address.one_line());
    Ok(())
}

pub async fn orders(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let repository = LocalOrders::new(ctx.cache()?);
    let orders = repository.list_for_user(&UserId::new(args.user.as_str())).await?;

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header(&format!("Orders for {}", args.user));
    if orders.is_empty() {
        ctx.output.info("No orders");
        return Ok(());
    }
    for order in &orders {
        let placed = chrono::DateTime::from_timestamp_millis(order.created_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let total = Money::new(order.total, order.currency).display();
        ctx.output.table_row(
            &[
                order.id.as_str(),
                &placed,
                &format!("{} items", order.item_count()),
                &total,
                &payment_badge(order.payment_status),
                order.fulfillment_status.as_str(),
            ],
            &[28, 16, 10, 12, 8, 12],
        );
    }
    Ok(())
}

/// 1-based position of `step` in `steps`.
fn flow_position(steps: &[CheckoutStep], step: CheckoutStep) -> usize {
    steps.iter().position(|s| *s == step).map_or(1, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_commerce::checkout::SessionLineItem;
    use shop_commerce::{CheckoutId, Currency, ProductId, VariationId};
    use std::collections::BTreeMap;

    fn request() -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            checkout_id: CheckoutId::new("chk-1"),
            customer: Customer::new("user-1", "ana@example.com"),
            currency: Currency::EUR,
            line_items: vec![SessionLineItem {
                product_id: ProductId::new("tee"),
                variation_id: VariationId::new("tee-m"),
                name: "T-Shirt".to_string(),
                image: None,
                unit_amount: 1799,
                quantity: 2,
            }],
            shipping_address: Address::new("Ana", "Calle 1", "Madrid", "28001", "ES"),
            shipping_amount: 450,
            tax_amount: 360,
            metadata: BTreeMap::new(),
        }
    }

    fn order(id: &str, user: &str, created_at: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(user),
            items: Vec::new(),
            subtotal: 1000,
            tax: 100,
            shipping: 500,
            total: 1600,
            currency: Currency::USD,
            shipping_address: Address::default(),
            payment_status: PaymentStatus::Paid,
            fulfillment_status: FulfillmentStatus::Unfulfilled,
            checkout_id: None,
            payment_intent_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_local_gateway_records_request() {
        let gateway = LocalGateway::default();
        let session = gateway.create_session(&request()).await.unwrap();
        assert_eq!(session.id, "local_chk-1");

        let recorded = gateway.take_request().await.unwrap();
        assert_eq!(recorded.currency, Currency::EUR);
        assert!(gateway.take_request().await.is_none());
    }

    #[test]
    fn test_settle_charges_lines_tax_and_shipping() {
        let request = request();
        let session = CheckoutSession {
            id: "local_chk-1".to_string(),
            url: None,
        };
        let payment = settle(&session, &request).unwrap();
        assert_eq!(payment.amount_total, 1799 * 2 + 450 + 360);
        assert_eq!(payment.currency, "eur");
        assert_eq!(payment.payment_intent_id.as_deref(), Some("pi_chk-1"));
    }

    #[test]
    fn test_settle_overflow() {
        let mut request = request();
        request.line_items[0].unit_amount = i64::MAX;
        let session = CheckoutSession {
            id: "s".to_string(),
            url: None,
        };
        assert!(settle(&session, &request).is_err());
    }

    #[tokio::test]
    async fn test_local_orders_persist_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let orders = LocalOrders::new(Cache::open(dir.path()).unwrap());
        orders.save(&order("o-1", "user-1", 1)).await.unwrap();
        orders.save(&order("o-2", "user-1", 2)).await.unwrap();
        orders.save(&order("o-3", "user-2", 3)).await.unwrap();

        let reopened = LocalOrders::new(Cache::open(dir.path()).unwrap());
        let listed = reopened.list_for_user(&UserId::new("user-1")).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o-2", "o-1"]);

        reopened
            .update_status(&OrderId::new("o-1"), None, Some(FulfillmentStatus::Fulfilled))
            .await
            .unwrap();
        let updated = orders.get(&OrderId::new("o-1")).await.unwrap().unwrap();
        assert!(updated.is_fulfilled());

        assert!(matches!(
            orders.update_status(&OrderId::new("missing"), None, None).await,
            Err(CommerceError::OrderNotFound(_))
        ));
    }
}
