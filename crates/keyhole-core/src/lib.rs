//! Core types and traits for the Keyhole URL shortener.
//!
//! This crate provides the short key type, the persisted mapping, and the
//! key store contract shared by the generator, the storage backends and
//! the shortener service.

pub mod error;
pub mod key;
pub mod store;

pub use error::{CoreError, StorageError};
pub use key::ShortKey;
pub use store::{KeyStore, ReadKeyStore, UrlMapping};
