use crate::error::StorageError;
use crate::key::ShortKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for key store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A persisted mapping from a short key to the original URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// The short key; unique across live mappings.
    pub key: ShortKey,
    /// The original URL, stored verbatim.
    pub url: String,
    /// The public short URL, derived from the base address and `key`.
    pub short_url: String,
}

impl UrlMapping {
    /// Creates a mapping, deriving `short_url` from `base_url` and `key`.
    pub fn new(key: ShortKey, url: impl Into<String>, base_url: &str) -> Self {
        let short_url = key.to_url(base_url);
        Self {
            key,
            url: url.into(),
            short_url,
        }
    }
}

/// A read-only view of a key store.
///
/// The key generator only needs these lookups, so it is written against
/// this trait rather than the full [`KeyStore`].
#[async_trait]
pub trait ReadKeyStore: Send + Sync + 'static {
    /// Looks up the mapping for an exact key.
    /// Returns `None` if the key does not exist.
    async fn find_by_key(&self, key: &ShortKey) -> Result<Option<UrlMapping>>;

    /// Looks up a mapping whose original URL is byte-for-byte equal to `url`.
    async fn find_by_url(&self, url: &str) -> Result<Option<UrlMapping>>;
}

#[async_trait]
pub trait KeyStore: ReadKeyStore {
    /// Inserts a new mapping. Returns `Err(StorageError::Conflict)` if the key is taken.
    async fn insert(&self, mapping: UrlMapping) -> Result<UrlMapping>;

    /// Deletes the mapping for a key and returns the number of removed mappings (0 or 1).
    async fn delete(&self, key: &ShortKey) -> Result<u64>;
}
