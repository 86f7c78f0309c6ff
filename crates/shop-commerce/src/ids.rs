//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where a VariationId is expected. IDs serialize
//! as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariationId);
define_id!(CategoryId);
define_id!(TagId);
define_id!(AttributeId);
define_id!(OptionId);
define_id!(AddressId);
define_id!(OrderId);
define_id!(ShippingMethodId);
define_id!(CheckoutId);
define_id!(UserId);

/// Generate a unique ID from the wall clock, a process counter and random bits.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & 0xffff;
    let noise: u32 = rand::random();

    format!("{:011x}{:04x}{:08x}", millis, counter, noise)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 23);
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = VariationId::new("var-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"var-1\"");

        let back: VariationId = serde_json::from_str("\"var-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_equality() {
        let id1 = AttributeId::new("color");
        let id2: AttributeId = "color".into();
        let id3 = AttributeId::new("size");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(format!("{}", id3), "size");
    }
}
