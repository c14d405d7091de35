// reqwest-backed ApiClient for user-supplied JSON endpoints
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::application::api_client::{ApiClient, ApiError, ApiFetch};
use crate::domain::fields::extract_fields;

/// Plain GET client: no custom headers, no timeout beyond the platform's
/// network stack. Any content type is accepted as long as the body parses as
/// JSON.
#[derive(Debug, Clone, Default)]
pub struct HttpApiClient {
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch_json(&self, url: &str) -> Result<ApiFetch, ApiError> {
        let url = Url::parse(url).map_err(|_| ApiError::InvalidUrl(url.to_string()))?;

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http(status.as_u16()));
        }

        let data: Value = response.json().await.map_err(transport)?;
        let fields = extract_fields(&data);
        Ok(ApiFetch { data, fields })
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    let message = err.to_string();
    if message.is_empty() {
        ApiError::Transport("Unknown error".to_string())
    } else {
        ApiError::Transport(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_url_rejected_before_request() {
        let client = HttpApiClient::new();

        let err = client.fetch_json("not a url").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));

        let err = client.fetch_json("/relative/path").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
