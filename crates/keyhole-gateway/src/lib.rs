//! HTTP gateway for the Keyhole URL shortener.
//!
//! Routes:
//! * `POST /shorturl` creates (or reuses) a short URL;
//! * `GET /{key}` and `GET /shorturl/{key}` redirect to the original URL;
//! * `DELETE /{key}` and `DELETE /shorturl/{key}` remove a mapping;
//! * `GET /health` reports liveness.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
