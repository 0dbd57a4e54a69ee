use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use keyhole_core::store::Result;
use keyhole_core::{KeyStore, ReadKeyStore, ShortKey, StorageError, UrlMapping};
use smol_str::SmolStr;
use tracing::trace;

/// In-memory implementation of the key store using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Inserts go through the entry API, so the
/// uniqueness check and the write happen under the same shard lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyStore {
    storage: DashMap<SmolStr, UrlMapping>,
}

impl InMemoryKeyStore {
    /// Creates a new in-memory key store.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadKeyStore for InMemoryKeyStore {
    async fn find_by_key(&self, key: &ShortKey) -> Result<Option<UrlMapping>> {
        Ok(self
            .storage
            .get(key.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<UrlMapping>> {
        // Linear scan; the in-memory store keeps no secondary index.
        Ok(self
            .storage
            .iter()
            .find(|entry| entry.value().url == url)
            .map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn insert(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        match self.storage.entry(SmolStr::new(mapping.key.as_str())) {
            Entry::Occupied(_) => Err(StorageError::Conflict(mapping.key.to_string())),
            Entry::Vacant(slot) => {
                trace!(key = %mapping.key, "inserting mapping");
                slot.insert(mapping.clone());
                Ok(mapping)
            }
        }
    }

    async fn delete(&self, key: &ShortKey) -> Result<u64> {
        Ok(self.storage.remove(key.as_str()).map_or(0, |_| 1))
    }
}
