use keyhole_core::StorageError;
use thiserror::Error;

/// Errors returned while searching for a usable key.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("could not generate a unique key for '{url}' after {max_retries} retries")]
    RetriesExhausted { url: String, max_retries: u32 },
    #[error("key store lookup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Errors returned when a generator is built from invalid settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid key length {key_length}; expected 1..={max_key_length}")]
    InvalidKeyLength {
        key_length: usize,
        max_key_length: usize,
    },
    #[error("max retries must be at least 1")]
    InvalidMaxRetries,
}
