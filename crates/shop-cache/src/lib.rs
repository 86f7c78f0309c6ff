//! Type-safe key-value persistence for the GlobalShop storefront.
//!
//! Values are stored as JSON documents in a pluggable byte store. Two stores
//! ship with the crate:
//!
//! - [`MemoryStore`] - process-local, used for tests and ephemeral sessions
//! - [`FileStore`] - one JSON file per key inside a directory
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_cache::{cache_key, Cache};
//!
//! let cache = Cache::open("./.shop")?;
//!
//! // Store a value
//! cache.set("cart-storage", &cart_state)?;
//!
//! // Retrieve a value
//! let state: Option<CartState> = cache.get("cart-storage")?;
//!
//! // Namespaced keys
//! let key = cache_key!("exchangeRates", "current");
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::{Cache, FileStore, MemoryStore, Store};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, MemoryStore, Store};
}
