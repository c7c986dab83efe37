//! Request handlers and wire types.

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use grounded_core::AppError;
use grounded_search::{FilterValues, SourceRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/filters", get(filters))
        .route("/health", get(health))
        .with_state(state)
}

/// `POST /chat` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

/// `POST /chat` response body.
///
/// Echoes the query and filters back so clients can correlate, and always
/// reports the retrieval sources alongside the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponseBody {
    pub answer: String,
    pub documents: Vec<SourceRecord>,
    pub query: String,
    pub filters: BTreeMap<String, String>,
}

/// JSON error envelope with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let status = match error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match status {
            StatusCode::BAD_REQUEST => error.to_string(),
            _ => format!("Internal server error: {}", error),
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Answer a question grounded in retrieved documents.
async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let query = body.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query is required"));
    }

    let result = state.pipeline.answer(&query, &body.filters).await?;

    Ok(Json(ChatResponseBody {
        answer: result.answer,
        documents: result.sources,
        query,
        filters: body.filters,
    }))
}

/// List distinct filterable values from the index.
async fn filters(State(state): State<AppState>) -> Json<FilterValues> {
    Json(state.pipeline.filter_values().await)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grounded_core::AppResult;
    use grounded_llm::{ChatDelta, ChatRequest, ChatResponse, ChatStream, LlmClient, Usage};
    use grounded_pipeline::{ChatPipeline, PipelineOptions};
    use grounded_search::{SearchBackend, SearchRequest};
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct StubSearch {
        documents: Vec<Value>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SearchBackend for StubSearch {
        fn backend_name(&self) -> &str {
            "stub"
        }

        async fn search(&self, _request: &SearchRequest) -> AppResult<Vec<Value>> {
            if self.fail {
                return Err(AppError::Search("index unreachable".to_string()));
            }
            Ok(self.documents.clone())
        }
    }

    struct StubLlm {
        reply: String,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubLlm {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            Ok(ChatResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: Usage::default(),
            })
        }

        async fn stream(&self, _request: &ChatRequest) -> AppResult<ChatStream> {
            let delta = ChatDelta {
                content: self.reply.clone(),
                done: true,
            };
            Ok(Box::pin(futures::stream::iter(vec![Ok(delta)])))
        }
    }

    fn state(documents: Vec<Value>, fail: bool) -> AppState {
        let pipeline = ChatPipeline::new(
            Arc::new(StubSearch { documents, fail }),
            Arc::new(StubLlm {
                reply: "Stub answer.".to_string(),
            }),
            PipelineOptions::new("stub-model"),
        );
        AppState {
            pipeline: Arc::new(pipeline),
        }
    }

    fn sample_documents() -> Vec<Value> {
        vec![json!({
            "id": "1",
            "title": "Refund policy",
            "content": "Refunds within 30 days.",
            "author": "Jane Doe",
            "category": "billing",
        })]
    }

    #[tokio::test]
    async fn test_chat_answers_with_documents() {
        let body = ChatRequestBody {
            query: "What is the refund policy?".to_string(),
            filters: BTreeMap::new(),
        };

        let Json(response) = chat(State(state(sample_documents(), false)), Json(body))
            .await
            .unwrap();

        assert_eq!(response.answer, "Stub answer.");
        assert_eq!(response.documents.len(), 1);
        assert_eq!(response.documents[0].title, "Refund policy");
        assert_eq!(response.query, "What is the refund policy?");
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_query() {
        let body = ChatRequestBody {
            query: "   ".to_string(),
            filters: BTreeMap::new(),
        };

        let error = chat(State(state(sample_documents(), false)), Json(body))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "Query is required");
    }

    #[tokio::test]
    async fn test_chat_maps_retrieval_failure_to_500() {
        let body = ChatRequestBody {
            query: "anything".to_string(),
            filters: BTreeMap::new(),
        };

        let error = chat(State(state(Vec::new(), true)), Json(body))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.message.contains("Internal server error"));
    }

    #[tokio::test]
    async fn test_chat_empty_retrieval_is_still_200() {
        let body = ChatRequestBody {
            query: "anything".to_string(),
            filters: BTreeMap::new(),
        };

        let Json(response) = chat(State(state(Vec::new(), false)), Json(body))
            .await
            .unwrap();

        assert!(response.documents.is_empty());
        assert!(!response.answer.is_empty());
    }

    #[tokio::test]
    async fn test_filters_endpoint_shape() {
        let Json(values) = filters(State(state(sample_documents(), false))).await;
        assert_eq!(values.authors, vec!["Jane Doe"]);
        assert_eq!(values.categories, vec!["billing"]);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_request_body_defaults() {
        let body: ChatRequestBody = serde_json::from_str(r#"{"query": "q"}"#).unwrap();
        assert!(body.filters.is_empty());

        let body: ChatRequestBody = serde_json::from_str("{}").unwrap();
        assert!(body.query.is_empty());
    }
}
