//! Cart and line item types.

use crate::error::CommerceError;
use crate::ids::{ProductId, VariationId};
use crate::money::Currency;
use serde::{Deserialize, Serialize};
use shop_cache::Cache;

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Storage key of the persisted cart.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// A (product, variation, quantity) line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub variation_id: VariationId,
    /// Always at least 1 inside a [`Cart`].
    pub quantity: i64,
}

impl CartItem {
    fn is_for(&self, product_id: &ProductId, variation_id: &VariationId) -> bool {
        &self.product_id == product_id && &self.variation_id == variation_id
    }
}

/// The persisted cart document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub currency: Currency,
}

/// A shopping cart.
///
/// Holds at most one line per (product, variation) pair. Every mutation
/// completes synchronously so concurrent UI actions cannot interleave a
/// read and write of the item list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: Currency,
}

fn check_limit(quantity: i64) -> Result<i64, CommerceError> {
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(CommerceError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_ITEM,
        ));
    }
    Ok(quantity)
}

impl Cart {
    /// Create an empty cart displayed in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Rebuild a cart from a persisted document.
    ///
    /// Lines with a non-positive quantity are dropped and duplicate pairs
    /// merged, capped at [`MAX_QUANTITY_PER_ITEM`].
    pub fn from_state(state: CartState) -> Self {
        let mut cart = Self::new(state.currency);
        for item in state.items {
            if item.quantity <= 0 {
                tracing::warn!(
                    product = %item.product_id,
                    variation = %item.variation_id,
                    quantity = item.quantity,
                    "dropping persisted cart line with invalid quantity"
                );
                continue;
            }
            match cart.position(&item.product_id, &item.variation_id) {
                Some(i) => {
                    let merged = cart.items[i].quantity.saturating_add(item.quantity);
                    cart.items[i].quantity = merged.min(MAX_QUANTITY_PER_ITEM);
                }
                None => cart.items.push(CartItem {
                    quantity: item.quantity.min(MAX_QUANTITY_PER_ITEM),
                    ..item
                }),
            }
        }
        cart
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> CartState {
        CartState {
            items: self.items.clone(),
            currency: self.currency,
        }
    }

    /// Load the persisted cart, or an empty one in `default_currency`.
    pub fn load(cache: &Cache, default_currency: Currency) -> Result<Self, CommerceError> {
        match cache.get::<CartState>(CART_STORAGE_KEY)? {
            Some(state) => Ok(Self::from_state(state)),
            None => Ok(Self::new(default_currency)),
        }
    }

    /// Persist under [`CART_STORAGE_KEY`].
    pub fn save(&self, cache: &Cache) -> Result<(), CommerceError> {
        cache.set(CART_STORAGE_KEY, &self.to_state())?;
        Ok(())
    }

    fn position(&self, product_id: &ProductId, variation_id: &VariationId) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.is_for(product_id, variation_id))
    }

    /// Add `quantity` of a variation.
    ///
    /// An existing line is incremented. Returns an error, leaving the cart
    /// unchanged, if:
    /// - Quantity is not positive
    /// - The line would exceed MAX_QUANTITY_PER_ITEM
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        variation_id: VariationId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        match self.position(&product_id, &variation_id) {
            Some(i) => {
                let existing = &mut self.items[i];
                let new_quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CommerceError::Overflow)?;
                existing.quantity = check_limit(new_quantity)?;
            }
            None => {
                self.items.push(CartItem {
                    product_id,
                    variation_id,
                    quantity: check_limit(quantity)?,
                });
            }
        }
        Ok(())
    }

    /// Replace a line's quantity.
    ///
    /// A quantity <= 0 removes the line. Returns whether a line was touched.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        variation_id: &VariationId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id, variation_id));
        }
        let quantity = check_limit(quantity)?;

        match self.position(product_id, variation_id) {
            Some(i) => {
                self.items[i].quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a line. Absent lines are not an error.
    pub fn remove_item(&mut self, product_id: &ProductId, variation_id: &VariationId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| !i.is_for(product_id, variation_id));
        self.items.len() < len_before
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Change the display currency.
    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Quantity held for a pair, 0 if absent.
    pub fn quantity_of(&self, product_id: &ProductId, variation_id: &VariationId) -> i64 {
        self.position(product_id, variation_id)
            .map_or(0, |i| self.items[i].quantity)
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
