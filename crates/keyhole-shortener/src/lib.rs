//! URL shortener service implementation.
//!
//! This crate wires the key generator to a key store and exposes the three
//! operations the HTTP layer calls: shorten, resolve and delete.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::{Result, ShortenerError};
pub use service::ShortenerService;
pub use shortener::Shortener;
