use keyhole_core::UrlMapping;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
    pub key: String,
    pub short_url: String,
}

impl From<UrlMapping> for UrlResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            url: mapping.url,
            key: mapping.key.into(),
            short_url: mapping.short_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
