//! Key store backends.
//!
//! [`InMemoryKeyStore`] keeps mappings in a sharded map and is meant for
//! tests and single-process deployments; [`MySqlKeyStore`] is the durable
//! backend.

pub mod memory;
pub mod mysql;

pub use keyhole_core::{KeyStore, ReadKeyStore, StorageError, UrlMapping};
pub use memory::InMemoryKeyStore;
pub use mysql::MySqlKeyStore;
