//! Checkout module.
//!
//! Contains the checkout step sequence, addresses, shipping methods,
//! orders, and the hand-off to payment and order storage.

mod address;
mod flow;
mod orchestrator;
mod order;
mod shipping;

pub use address::Address;
pub use flow::{CheckoutFlow, CheckoutStep, Customer};
pub use orchestrator::{
    CheckoutOrchestrator, CheckoutSession, CheckoutSessionRequest, CompletedPayment,
    MemoryOrderRepository, OrderRepository, PaymentGateway, SessionLineItem, META_CART_ITEMS,
    META_SHIPPING_ADDRESS_ID, META_USER_ID,
};
pub use order::{FulfillmentStatus, Order, OrderItem, PaymentStatus, ProductSnapshot};
pub use shipping::{find_shipping_method, ShippingMethod};
