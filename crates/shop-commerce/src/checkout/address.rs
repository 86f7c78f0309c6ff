//! Address types.

use crate::ids::AddressId;
use serde::{Deserialize, Serialize};

/// A shipping address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    /// Recipient name.
    pub name: String,
    pub line1: String,
    /// Apartment, suite, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    /// State or province.
    #[serde(default)]
    pub state: String,
    pub postal_code: String,
    /// Country code (e.g., "US").
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Create an address with a generated id.
    pub fn new(
        name: impl Into<String>,
        line1: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: AddressId::generate(),
            name: name.into(),
            line1: line1.into(),
            line2: None,
            city: city.into(),
            state: String::new(),
            postal_code: postal_code.into(),
            country: country.into(),
            phone: String::new(),
            is_default: false,
        }
    }

    pub fn with_line2(mut self, line2: impl Into<String>) -> Self {
        self.line2 = Some(line2.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref() {
            parts.push(line2);
        }
        parts.push(&self.city);
        if !self.state.is_empty() {
            parts.push(&self.state);
        }
        parts.push(&self.postal_code);
        parts.push(&self.country);
        parts.join(", ")
    }

    /// Check if address is complete enough to ship to.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.line1.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.postal_code.trim().is_empty()
            && !self.country.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_creation() {
        let addr = Address::new("Jane Doe", "123 Main St", "San Francisco", "94102", "US");
        assert!(addr.is_complete());
        assert!(!addr.is_default);
        assert!(!addr.id.as_str().is_empty());
    }

    #[test]
    fn test_address_formatting() {
        let addr = Address::new("Jane Doe", "456 Oak Ave", "Los Angeles", "90001", "US")
            .with_line2("Apt 4")
            .with_state("CA");

        assert_eq!(addr.one_line(), "456 Oak Ave, Apt 4, Los Angeles, CA, 90001, US");
    }

    #[test]
    fn test_incomplete_address() {
        let addr = Address::new("Jane Doe", "  ", "Paris", "75001", "FR");
        assert!(!addr.is_complete());
        assert!(!Address::default().is_complete());
    }

    #[test]
    fn test_default_address_has_empty_id() {
        let addr = Address::default();
        assert_eq!(addr.id, AddressId::default());
        assert!(addr.id.as_str().is_empty());
    }

    #[test]
    fn test_address_document() {
        let addr: Address = serde_json::from_str(
            r#"{"id": "a1", "name": "Kim", "line1": "1 Rd", "city": "Seoul",
                "postalCode": "04524", "country": "KR", "isDefault": true}"#,
        )
        .unwrap();
        assert!(addr.is_default);
        assert_eq!(addr.line2, None);
        assert_eq!(addr.postal_code, "04524");
    }
}
