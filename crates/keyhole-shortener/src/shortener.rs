use crate::error::Result;
use async_trait::async_trait;
use keyhole_core::{ShortKey, UrlMapping};

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates (or reuses) the mapping for `url` and returns it.
    async fn shorten(&self, url: &str) -> Result<UrlMapping>;

    /// Resolves a short key to its original URL.
    /// Returns `Err(NotFound)` if the key does not exist.
    async fn resolve(&self, key: &ShortKey) -> Result<String>;

    /// Deletes the mapping for a short key.
    /// Returns `Err(NotFound)` if nothing was deleted.
    async fn delete(&self, key: &ShortKey) -> Result<()>;
}
