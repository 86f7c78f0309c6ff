//! Order types.

use crate::checkout::Address;
use crate::clock::current_timestamp;
use crate::i18n::LocalizedText;
use crate::ids::{OrderId, ProductId, UserId, VariationId};
use crate::money::Currency;
use serde::{Deserialize, Serialize};

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment pending.
    #[default]
    Pending,
    /// Payment captured.
    Paid,
    /// Payment failed.
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// Nothing fulfilled yet.
    #[default]
    Unfulfilled,
    /// Some items fulfilled.
    PartiallyFulfilled,
    /// All items fulfilled.
    Fulfilled,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Unfulfilled => "unfulfilled",
            FulfillmentStatus::PartiallyFulfilled => "partially_fulfilled",
            FulfillmentStatus::Fulfilled => "fulfilled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "unfulfilled" => Some(FulfillmentStatus::Unfulfilled),
            "partially_fulfilled" => Some(FulfillmentStatus::PartiallyFulfilled),
            "fulfilled" => Some(FulfillmentStatus::Fulfilled),
            _ => None,
        }
    }
}

/// Product details frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: LocalizedText,
    /// Unit price in base minor units.
    pub price: i64,
    /// Primary image, empty if none.
    #[serde(default)]
    pub image: String,
}

/// A line item in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub variation_id: VariationId,
    pub product_snapshot: ProductSnapshot,
    pub quantity: i64,
    /// Unit price in base minor units.
    pub price: i64,
}

impl OrderItem {
    /// Total price for this line, `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        self.price.checked_mul(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    /// Amount charged.
    pub total: i64,
    pub currency: Currency,
    pub shipping_address: Address,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    /// Gateway checkout session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<String>,
    /// Gateway payment intent id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    /// Epoch millis of creation.
    pub created_at: i64,
    /// Epoch millis of last update.
    pub updated_at: i64,
}

impl Order {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if order is paid.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Check if order is fully fulfilled.
    pub fn is_fulfilled(&self) -> bool {
        self.fulfillment_status == FulfillmentStatus::Fulfilled
    }

    /// Update payment and/or fulfillment status.
    pub fn update_status(
        &mut self,
        payment: Option<PaymentStatus>,
        fulfillment: Option<FulfillmentStatus>,
    ) {
        if let Some(status) = payment {
            self.payment_status = status;
        }
        if let Some(status) = fulfillment {
            self.fulfillment_status = status;
        }
        self.updated_at = current_timestamp();
    }
}
