//! Search backend abstraction and request types.
//!
//! The search service is a collaborator: the pipeline describes what to
//! search for and the backend ranks and returns raw documents. The trait
//! seam keeps the pipeline testable with stub backends.

use grounded_core::AppResult;
use serde::Serialize;
use serde_json::Value;

/// A single search request.
///
/// Serializes directly into the backend's query body. `vector_queries` is
/// present only in hybrid mode; the backend vectorizes the query text
/// itself and fuses the keyword and vector rankings.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Full-text query
    #[serde(rename = "search")]
    pub search_text: String,

    /// Optional filter predicate; absent means "no filtering"
    #[serde(rename = "filter", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Comma-separated field selection
    pub select: String,

    /// Maximum number of results
    pub top: usize,

    /// Require all query terms to match
    #[serde(rename = "searchMode")]
    pub search_mode: &'static str,

    /// Vector leg of a hybrid query
    #[serde(rename = "vectorQueries", skip_serializing_if = "Option::is_none")]
    pub vector_queries: Option<Vec<VectorQuery>>,
}

impl SearchRequest {
    /// Create a keyword-only request.
    pub fn keyword(search_text: impl Into<String>, select: impl Into<String>, top: usize) -> Self {
        Self {
            search_text: search_text.into(),
            filter: None,
            select: select.into(),
            top,
            search_mode: "all",
            vector_queries: None,
        }
    }

    /// Set the filter predicate.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Add a text-vectorization query leg, turning this into a hybrid
    /// request.
    pub fn with_vector_query(mut self, fields: impl Into<String>, k: usize) -> Self {
        self.vector_queries = Some(vec![VectorQuery {
            kind: "text",
            text: self.search_text.clone(),
            fields: fields.into(),
            k,
        }]);
        self
    }
}

/// One vector-similarity leg of a hybrid search.
///
/// `kind: "text"` delegates embedding computation to the backend's
/// configured vectorizer; the core never produces embeddings.
#[derive(Debug, Clone, Serialize)]
pub struct VectorQuery {
    pub kind: &'static str,
    pub text: String,
    pub fields: String,
    pub k: usize,
}

/// Trait for search backends.
///
/// Implementations issue the request and return the raw ranked documents;
/// normalization into [`crate::SourceRecord`]s happens in the retriever so
/// it can be tested without a live backend.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the backend name (e.g., "rest").
    fn backend_name(&self) -> &str;

    /// Execute a search and return raw documents in backend relevance
    /// order.
    ///
    /// An `Err` here is a retrieval failure (transport, auth, malformed
    /// schema); a successful call with zero documents returns `Ok(vec![])`.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<Value>>;
}
