use crate::error::{Result, ShortenerError};
use crate::shortener::Shortener;
use async_trait::async_trait;
use keyhole_core::{KeyStore, ShortKey, StorageError, UrlMapping};
use keyhole_generator::{GenerationError, Generated, HashKeyGenerator};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A concrete implementation of the [`Shortener`] trait.
///
/// Lookups and the final insert are separate store calls, so two requests
/// may pick the same free key at once. The store's uniqueness constraint
/// rejects the loser with [`StorageError::Conflict`]; the service then
/// resumes the candidate sequence at the contested attempt, which either
/// finds the winner's mapping for the same URL or moves on to the next
/// salt. Conflict restarts share the generator's `max_retries` budget.
#[derive(Debug)]
pub struct ShortenerService<S> {
    store: Arc<S>,
    generator: HashKeyGenerator,
    base_url: String,
}

impl<S: KeyStore> ShortenerService<S> {
    pub fn new(store: S, generator: HashKeyGenerator, base_url: impl Into<String>) -> Self {
        Self::with_shared_store(Arc::new(store), generator, base_url)
    }

    /// Creates a service over a store handle that is shared with other components.
    pub fn with_shared_store(
        store: Arc<S>,
        generator: HashKeyGenerator,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            generator,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl<S: KeyStore> Shortener for ShortenerService<S> {
    async fn shorten(&self, url: &str) -> Result<UrlMapping> {
        if let Some(existing) = self.store.find_by_url(url).await? {
            debug!(key = %existing.key, url, "url is already shortened");
            return Ok(existing);
        }

        let mut next_attempt = 0;
        let mut conflicts = 0;

        loop {
            let (key, attempt) = match self
                .generator
                .generate_from(url, next_attempt, &*self.store)
                .await?
            {
                Generated::Existing(mapping) => return Ok(mapping),
                Generated::Fresh { key, attempt } => (key, attempt),
            };

            match self
                .store
                .insert(UrlMapping::new(key, url, &self.base_url))
                .await
            {
                Ok(mapping) => {
                    info!(key = %mapping.key, attempt, "created short url");
                    return Ok(mapping);
                }
                Err(StorageError::Conflict(key)) => {
                    conflicts += 1;
                    if conflicts >= self.generator.max_retries() {
                        return Err(GenerationError::RetriesExhausted {
                            url: url.to_string(),
                            max_retries: self.generator.max_retries(),
                        }
                        .into());
                    }
                    warn!(key = %key, attempt, conflicts, "lost insert race, re-checking candidate");
                    next_attempt = attempt;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn resolve(&self, key: &ShortKey) -> Result<String> {
        trace!(key = %key, "resolving short key");

        match self.store.find_by_key(key).await? {
            Some(mapping) => Ok(mapping.url),
            None => Err(ShortenerError::NotFound(key.to_string())),
        }
    }

    async fn delete(&self, key: &ShortKey) -> Result<()> {
        match self.store.delete(key).await? {
            0 => Err(ShortenerError::NotFound(key.to_string())),
            _ => {
                info!(key = %key, "deleted short url");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyhole_core::ReadKeyStore;
    use keyhole_generator::GeneratorSettings;
    use keyhole_storage::InMemoryKeyStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE_URL: &str = "http://localhost:5000";

    fn test_service() -> ShortenerService<InMemoryKeyStore> {
        ShortenerService::new(
            InMemoryKeyStore::new(),
            HashKeyGenerator::default(),
            BASE_URL,
        )
    }

    /// Lets a rival writer claim the key right before the first insert lands.
    struct RacingStore {
        inner: InMemoryKeyStore,
        rival_url: String,
        raced: AtomicUsize,
    }

    impl RacingStore {
        fn new(rival_url: &str) -> Self {
            Self {
                inner: InMemoryKeyStore::new(),
                rival_url: rival_url.to_string(),
                raced: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReadKeyStore for RacingStore {
        async fn find_by_key(
            &self,
            key: &ShortKey,
        ) -> keyhole_core::store::Result<Option<UrlMapping>> {
            self.inner.find_by_key(key).await
        }

        async fn find_by_url(&self, url: &str) -> keyhole_core::store::Result<Option<UrlMapping>> {
            self.inner.find_by_url(url).await
        }
    }

    #[async_trait]
    impl KeyStore for RacingStore {
        async fn insert(&self, mapping: UrlMapping) -> keyhole_core::store::Result<UrlMapping> {
            if self.raced.fetch_add(1, Ordering::SeqCst) == 0 {
                let rival = UrlMapping::new(mapping.key.clone(), &self.rival_url, BASE_URL);
                self.inner.insert(rival).await?;
            }
            self.inner.insert(mapping).await
        }

        async fn delete(&self, key: &ShortKey) -> keyhole_core::store::Result<u64> {
            self.inner.delete(key).await
        }
    }

    /// Rejects every insert as a duplicate without ever storing anything.
    struct AlwaysConflictStore {
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl ReadKeyStore for AlwaysConflictStore {
        async fn find_by_key(
            &self,
            _key: &ShortKey,
        ) -> keyhole_core::store::Result<Option<UrlMapping>> {
            Ok(None)
        }

        async fn find_by_url(&self, _url: &str) -> keyhole_core::store::Result<Option<UrlMapping>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl KeyStore for AlwaysConflictStore {
        async fn insert(&self, mapping: UrlMapping) -> keyhole_core::store::Result<UrlMapping> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Conflict(mapping.key.to_string()))
        }

        async fn delete(&self, _key: &ShortKey) -> keyhole_core::store::Result<u64> {
            Ok(0)
        }
    }

    /// Accepts reads but fails every write.
    struct ReadOnlyStore;

    #[async_trait]
    impl ReadKeyStore for ReadOnlyStore {
        async fn find_by_key(
            &self,
            _key: &ShortKey,
        ) -> keyhole_core::store::Result<Option<UrlMapping>> {
            Ok(None)
        }

        async fn find_by_url(&self, _url: &str) -> keyhole_core::store::Result<Option<UrlMapping>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl KeyStore for ReadOnlyStore {
        async fn insert(&self, _mapping: UrlMapping) -> keyhole_core::store::Result<UrlMapping> {
            Err(StorageError::Unavailable("read-only replica".to_string()))
        }

        async fn delete(&self, _key: &ShortKey) -> keyhole_core::store::Result<u64> {
            Err(StorageError::Unavailable("read-only replica".to_string()))
        }
    }

    #[tokio::test]
    async fn shorten_creates_mapping() {
        let service = test_service();

        let mapping = service.shorten("https://example.com/a/b").await.unwrap();

        assert_eq!(mapping.key.as_str(), "ed1d4137");
        assert_eq!(mapping.url, "https://example.com/a/b");
        assert_eq!(mapping.short_url, "http://localhost:5000/ed1d4137");
    }

    #[tokio::test]
    async fn shorten_is_idempotent() {
        let service = test_service();

        let first = service.shorten("https://example.com/a/b").await.unwrap();
        let second = service.shorten("https://example.com/a/b").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn shorten_reuses_salted_key_after_collision_is_freed() {
        let store = Arc::new(InMemoryKeyStore::new());
        let service = ShortenerService::with_shared_store(
            Arc::clone(&store),
            HashKeyGenerator::default(),
            BASE_URL,
        );
        // A rival holds our first candidate, then frees it again.
        store
            .insert(UrlMapping::new(
                ShortKey::new_unchecked("ed1d4137"),
                "https://rival.example",
                BASE_URL,
            ))
            .await
            .unwrap();

        let first = service.shorten("https://example.com/a/b").await.unwrap();
        assert_eq!(first.key.as_str(), "6fa898e5");

        store
            .delete(&ShortKey::new_unchecked("ed1d4137"))
            .await
            .unwrap();

        let second = service.shorten("https://example.com/a/b").await.unwrap();
        assert_eq!(second.key, first.key);
    }

    #[tokio::test]
    async fn shorten_accepts_empty_url() {
        let service = test_service();

        let mapping = service.shorten("").await.unwrap();
        assert_eq!(mapping.key.as_str(), "e3b0c442");
        assert_eq!(mapping.url, "");
        assert_eq!(service.resolve(&mapping.key).await.unwrap(), "");
    }

    #[tokio::test]
    async fn lost_race_against_other_url_moves_to_next_salt() {
        let store = RacingStore::new("https://rival.example");
        let service = ShortenerService::new(store, HashKeyGenerator::default(), BASE_URL);

        let mapping = service.shorten("https://example.com/a/b").await.unwrap();

        assert_eq!(mapping.key.as_str(), "6fa898e5");
        assert_eq!(mapping.url, "https://example.com/a/b");
    }

    #[tokio::test]
    async fn lost_race_against_same_url_returns_winner() {
        let store = RacingStore::new("https://example.com/a/b");
        let service = ShortenerService::new(store, HashKeyGenerator::default(), BASE_URL);

        let mapping = service.shorten("https://example.com/a/b").await.unwrap();

        assert_eq!(mapping.key.as_str(), "ed1d4137");
    }

    #[tokio::test]
    async fn endless_conflicts_exhaust_the_budget() {
        let store = Arc::new(AlwaysConflictStore {
            inserts: AtomicUsize::new(0),
        });
        let generator = HashKeyGenerator::new(GeneratorSettings::builder().max_retries(4).build())
            .unwrap();
        let service = ShortenerService::with_shared_store(Arc::clone(&store), generator, BASE_URL);

        let err = service.shorten("https://example.com").await.unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::Generation(GenerationError::RetriesExhausted { max_retries: 4, .. })
        ));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn other_storage_errors_fail_fast() {
        let service = ShortenerService::new(ReadOnlyStore, HashKeyGenerator::default(), BASE_URL);

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn resolve_and_delete_round_trip() {
        let service = test_service();
        let mapping = service.shorten("https://example.com/a/b").await.unwrap();

        let url = service.resolve(&mapping.key).await.unwrap();
        assert_eq!(url, "https://example.com/a/b");

        service.delete(&mapping.key).await.unwrap();

        let err = service.resolve(&mapping.key).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_nonexistent_key() {
        let service = test_service();

        let err = service
            .delete(&ShortKey::new_unchecked("deadbeef"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(ref k) if k == "deadbeef"));
    }

    #[tokio::test]
    async fn concurrent_shortens_of_same_url_agree() {
        let service = Arc::new(test_service());
        let mut handles = vec![];

        for _ in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.shorten("https://example.com/a/b").await
            }));
        }

        for handle in handles {
            let mapping = handle.await.unwrap().unwrap();
            assert_eq!(mapping.key.as_str(), "ed1d4137");
        }
    }
}
