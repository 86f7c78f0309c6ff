//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Key cannot be mapped onto the backing store.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        CacheError::StoreError(e.to_string())
    }
}
