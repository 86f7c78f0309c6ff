//! Shipping method types.

use crate::i18n::LocalizedText;
use crate::ids::ShippingMethodId;
use serde::{Deserialize, Serialize};

/// A shipping method option.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    /// Display name.
    pub name: LocalizedText,
    /// Price in base-currency minor units.
    pub price: i64,
    /// Delivery estimate, e.g. "3-5 business days".
    #[serde(default)]
    pub estimated_delivery: LocalizedText,
}

impl ShippingMethod {
    pub fn new(id: impl Into<ShippingMethodId>, name: LocalizedText, price: i64) -> Self {
        Self {
            id: id.into(),
            name,
            price,
            estimated_delivery: LocalizedText::new(),
        }
    }

    pub fn with_estimate(mut self, estimate: LocalizedText) -> Self {
        self.estimated_delivery = estimate;
        self
    }

    pub fn standard() -> Self {
        Self::new("standard", LocalizedText::from([("en", "Standard Shipping")]), 500)
            .with_estimate(LocalizedText::from([("en", "5-7 business days")]))
    }

    pub fn express() -> Self {
        Self::new("express", LocalizedText::from([("en", "Express Shipping")]), 1500)
            .with_estimate(LocalizedText::from([("en", "1-2 business days")]))
    }

    /// Built-in methods, cheapest first.
    pub fn defaults() -> Vec<Self> {
        vec![Self::standard(), Self::express()]
    }

    /// Check if this is free shipping.
    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

/// Find a method by id.
pub fn find_shipping_method<'a>(
    methods: &'a [ShippingMethod],
    id: &ShippingMethodId,
) -> Option<&'a ShippingMethod> {
    methods.iter().find(|m| &m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_methods() {
        let methods = ShippingMethod::defaults();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].price, 500);
        assert_eq!(methods[1].price, 1500);
        assert_eq!(methods[1].name.resolve("fr", "en"), "Express Shipping");
    }

    #[test]
    fn test_find_method() {
        let methods = ShippingMethod::defaults();
        let found = find_shipping_method(&methods, &ShippingMethodId::new("express")).unwrap();
        assert_eq!(found.price, 1500);
        assert!(find_shipping_method(&methods, &ShippingMethodId::new("drone")).is_none());
    }

    #[test]
    fn test_free_shipping() {
        let method = ShippingMethod::new("pickup", LocalizedText::new(), 0);
        assert!(method.is_free());
        assert!(!ShippingMethod::standard().is_free());
    }
}
