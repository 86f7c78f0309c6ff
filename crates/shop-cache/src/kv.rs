//! Key-value stores with automatic JSON serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// A raw byte store addressed by string keys.
///
/// Implementations must be safe to share between threads; the storefront
/// keeps a single store per process and hands clones of [`Cache`] around.
pub trait Store: Send + Sync {
    /// Read the bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replace the bytes stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check whether `key` exists.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// List every key in the store.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::StoreError("memory store lock poisoned".to_string())
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = self.entries.read().map_err(poisoned)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Directory-backed store: one `<key>.json` file per key.
///
/// `:` separators in keys are written as `~` so that keys built with
/// [`cache_key!`](crate::cache_key) stay portable file names.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CacheError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    /// Directory holding the store's files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() || key.starts_with('.') {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        let mut name = String::with_capacity(key.len() + 5);
        for c in key.chars() {
            match c {
                ':' => name.push('~'),
                c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => name.push(c),
                _ => return Err(CacheError::InvalidKey(key.to_string())),
            }
        }
        name.push_str(".json");
        Ok(self.root.join(name))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        // Write-then-rename keeps readers from observing a torn document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json") {
                keys.push(stem.replace('~', ":"));
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Type-safe cache over a [`Store`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and shares the
/// underlying store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn Store>,
}

impl Cache {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a cache backed by a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open a cache backed by a [`FileStore`] rooted at `dir`.
    ///
    /// ```rust,ignore
    /// let cache = Cache::open("./.shop")?;
    /// ```
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(Arc::new(FileStore::open(dir)?)))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                tracing::debug!(key, "cache hit");
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("exchangeRates", "current");
/// // Returns "exchangeRates:current"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
