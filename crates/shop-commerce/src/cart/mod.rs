//! Shopping cart module.
//!
//! Contains the cart store and total aggregation.

mod cart;
mod totals;

pub use cart::{Cart, CartItem, CartState, CART_STORAGE_KEY, MAX_QUANTITY_PER_ITEM};
pub use totals::{compute_totals, CartTotals, LineTotal, SkippedLine, TotalsSettings};
