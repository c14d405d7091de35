// Port for fetching widget payloads from user-supplied JSON endpoints
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before any request is attempted.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error! status: {0}")]
    Http(u16),
    /// Transport failure or a body that is not valid JSON.
    #[error("{0}")]
    Transport(String),
}

/// Successful fetch: the parsed body plus its flattened field paths.
#[derive(Debug, Clone)]
pub struct ApiFetch {
    pub data: Value,
    pub fields: Vec<String>,
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET the URL and parse the body as JSON, listing its field paths.
    async fn fetch_json(&self, url: &str) -> Result<ApiFetch, ApiError>;
}
