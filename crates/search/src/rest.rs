//! REST search backend implementation.
//!
//! Talks to a hosted search service over its documents-search endpoint:
//! `POST {endpoint}/indexes/{index}/docs/search?api-version=...` with an
//! `api-key` header and a JSON query body.

use crate::client::{SearchBackend, SearchRequest};
use grounded_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::Value;

/// Search REST API version.
const API_VERSION: &str = "2024-07-01";

/// Response envelope from the documents-search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(rename = "value", default)]
    value: Vec<Value>,
}

/// REST search client.
///
/// Holds a reusable HTTP connection pool; construct once per process and
/// share across requests.
pub struct RestSearchClient {
    endpoint: String,
    api_key: String,
    index: String,
    client: reqwest::Client,
}

impl RestSearchClient {
    /// Create a new client for one index of a search service.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            index: index.into(),
            client: reqwest::Client::new(),
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, API_VERSION
        )
    }
}

#[async_trait::async_trait]
impl SearchBackend for RestSearchClient {
    fn backend_name(&self) -> &str {
        "rest"
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<Value>> {
        tracing::debug!(index = %self.index, top = request.top, "Sending search request");

        let response = self
            .client
            .post(self.search_url())
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to reach search service: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search(format!(
                "Search service error ({}): {}",
                status, error_text
            )));
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!(hits = body.value.len(), "Search request completed");

        Ok(body.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let client = RestSearchClient::new("https://search.example.com/", "key", "kb");
        assert_eq!(
            client.search_url(),
            format!(
                "https://search.example.com/indexes/kb/docs/search?api-version={}",
                API_VERSION
            )
        );
    }

    #[test]
    fn test_response_envelope_parsing() {
        let body: SearchResponseBody =
            serde_json::from_str(r#"{"value": [{"id": "1"}, {"id": "2"}]}"#).unwrap();
        assert_eq!(body.value.len(), 2);

        let empty: SearchResponseBody = serde_json::from_str("{}").unwrap();
        assert!(empty.value.is_empty());
    }
}
