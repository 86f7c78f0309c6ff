//! Cart total aggregation.

use crate::cart::CartItem;
use crate::catalog::CatalogStore;
use crate::checkout::ShippingMethod;
use crate::error::CommerceError;
use crate::ids::{ProductId, VariationId};
use crate::money::{Currency, Money};
use crate::pricing::CurrencyConverter;
use serde::{Deserialize, Serialize};

/// Tax and shipping inputs of a totals computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsSettings {
    /// Tax rate in percent.
    pub tax_rate: f64,
    /// Shipping fee in base minor units.
    pub shipping_fee: i64,
}

impl Default for TotalsSettings {
    fn default() -> Self {
        Self {
            tax_rate: 10.0,
            shipping_fee: 500,
        }
    }
}

impl TotalsSettings {
    pub fn new(tax_rate: f64, shipping_fee: i64) -> Self {
        Self {
            tax_rate,
            shipping_fee,
        }
    }

    /// Charge the price of `method` instead of the flat fee.
    pub fn with_shipping_method(mut self, method: &ShippingMethod) -> Self {
        self.shipping_fee = method.price;
        self
    }
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTotal {
    pub product_id: ProductId,
    pub variation_id: VariationId,
    pub quantity: i64,
    /// Converted unit price.
    pub unit_price: i64,
    /// `unit_price * quantity`.
    pub total: i64,
}

/// A cart line left out of the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLine {
    pub product_id: ProductId,
    pub variation_id: VariationId,
    pub reason: String,
}

/// Totals in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub currency: Currency,
    pub lines: Vec<LineTotal>,
    pub skipped: Vec<SkippedLine>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub total: i64,
    /// True if any amount was left unconverted.
    pub used_fallback: bool,
}

impl CartTotals {
    /// The total as [`Money`].
    pub fn total_money(&self) -> Money {
        Money::new(self.total, self.currency)
    }

    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Compute subtotal, tax, shipping and total of `items` in `target`.
///
/// Each unit price is converted before being multiplied by its quantity.
/// Lines whose product or variation cannot be resolved, or whose variation
/// is inactive, contribute nothing and are listed in
/// [`CartTotals::skipped`].
pub async fn compute_totals<C>(
    items: &[CartItem],
    catalog: &C,
    target: Currency,
    converter: &CurrencyConverter,
    settings: &TotalsSettings,
) -> Result<CartTotals, CommerceError>
where
    C: CatalogStore + ?Sized,
{
    let mut lines = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();
    let mut used_fallback = false;
    let mut subtotal = Money::zero(target);

    for item in items {
        let price = match catalog.variation(&item.product_id, &item.variation_id) {
            Ok((_, variation)) if variation.is_active => variation.price,
            Ok(_) => {
                skip(&mut skipped, item, "variation is inactive".to_string());
                continue;
            }
            Err(e) => {
                skip(&mut skipped, item, e.to_string());
                continue;
            }
        };

        let conversion = converter.convert(price, target).await;
        used_fallback |= conversion.is_fallback();
        let unit_price = Money::new(conversion.amount(), target);
        let total = unit_price.try_multiply(item.quantity)?;
        subtotal = subtotal.try_add(&total)?;

        lines.push(LineTotal {
            product_id: item.product_id.clone(),
            variation_id: item.variation_id.clone(),
            quantity: item.quantity,
            unit_price: unit_price.amount,
            total: total.amount,
        });
    }

    let tax = subtotal.percentage(settings.tax_rate);
    let shipping = converter.convert(settings.shipping_fee, target).await;
    used_fallback |= shipping.is_fallback();
    let shipping = Money::new(shipping.amount(), target);

    let total = Money::try_sum([&subtotal, &tax, &shipping], target)?;

    Ok(CartTotals {
        currency: target,
        lines,
        skipped,
        subtotal: subtotal.amount,
        tax: tax.amount,
        shipping: shipping.amount,
        total: total.amount,
        used_fallback,
    })
}

fn skip(skipped: &mut Vec<SkippedLine>, item: &CartItem, reason: String) {
    tracing::warn!(
        product = %item.product_id,
        variation = %item.variation_id,
        reason = %reason,
        "cart line skipped in totals"
    );
    skipped.push(SkippedLine {
        product_id: item.product_id.clone(),
        variation_id: item.variation_id.clone(),
        reason,
    });
}
