mod url;

pub use url::{CreateUrlRequest, HealthResponse, MessageResponse, UrlResponse};
