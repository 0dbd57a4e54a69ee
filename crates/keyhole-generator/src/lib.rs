//! Deterministic short key generation.
//!
//! A key is the first `key_length` hex characters of the SHA-256 digest of
//! the URL. When that candidate is already taken by a different URL the
//! URL is salted with the attempt number (`"{url}-{attempt}"`) and hashed
//! again, so every URL has a fixed, reproducible sequence of candidates.

pub mod error;
pub mod settings;

pub use error::{GenerationError, SettingsError};
pub use settings::GeneratorSettings;

use keyhole_core::{ReadKeyStore, ShortKey, UrlMapping};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use tracing::{debug, trace, warn};

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Outcome of a successful key search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// No mapping uses the key yet; the caller is expected to insert one.
    Fresh { key: ShortKey, attempt: u32 },
    /// The key already maps to the very same URL.
    Existing(UrlMapping),
}

impl Generated {
    pub fn key(&self) -> &ShortKey {
        match self {
            Generated::Fresh { key, .. } => key,
            Generated::Existing(mapping) => &mapping.key,
        }
    }
}

/// Returns the input hashed for `attempt`: the URL itself first, then `"{url}-{attempt}"`.
pub fn salted_input(url: &str, attempt: u32) -> Cow<'_, str> {
    if attempt == 0 {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("{url}-{attempt}"))
    }
}

/// Salted SHA-256 key generator.
#[derive(Debug, Clone)]
pub struct HashKeyGenerator {
    key_length: usize,
    max_retries: u32,
}

impl HashKeyGenerator {
    pub fn new(settings: GeneratorSettings) -> std::result::Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            key_length: settings.key_length,
            max_retries: settings.max_retries,
        })
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Computes the candidate key for `url` at `attempt` without touching any store.
    pub fn candidate(&self, url: &str, attempt: u32) -> ShortKey {
        let digest = Sha256::digest(salted_input(url, attempt).as_bytes());
        let hex = hex::encode(digest);
        ShortKey::new_unchecked(&hex[..self.key_length])
    }

    /// Finds a usable key for `url`, starting from the unsalted candidate.
    pub async fn generate<S>(&self, url: &str, store: &S) -> Result<Generated>
    where
        S: ReadKeyStore + ?Sized,
    {
        self.generate_from(url, 0, store).await
    }

    /// Finds a usable key for `url`, starting the candidate sequence at `first_attempt`.
    ///
    /// Each candidate is classified against the store:
    /// * absent: returned as [`Generated::Fresh`];
    /// * mapped to the same URL: returned as [`Generated::Existing`];
    /// * mapped to a different URL: a true collision, the next salt is tried.
    ///
    /// Attempts never go past `max_retries - 1`, whatever `first_attempt` is.
    pub async fn generate_from<S>(&self, url: &str, first_attempt: u32, store: &S) -> Result<Generated>
    where
        S: ReadKeyStore + ?Sized,
    {
        for attempt in first_attempt..self.max_retries {
            let key = self.candidate(url, attempt);

            match store.find_by_key(&key).await? {
                None => {
                    trace!(key = %key, attempt, "candidate key is free");
                    return Ok(Generated::Fresh { key, attempt });
                }
                Some(existing) if existing.url == url => {
                    debug!(key = %key, url, "found existing key for url");
                    return Ok(Generated::Existing(existing));
                }
                Some(_) => {
                    debug!(key = %key, attempt, "collision detected, retrying with salted url");
                }
            }
        }

        warn!(url, max_retries = self.max_retries, "key generation retries exhausted");
        Err(GenerationError::RetriesExhausted {
            url: url.to_string(),
            max_retries: self.max_retries,
        })
    }
}

impl Default for HashKeyGenerator {
    fn default() -> Self {
        Self {
            key_length: settings::DEFAULT_KEY_LENGTH,
            max_retries: settings::DEFAULT_MAX_RETRIES,
        }
    }
}
