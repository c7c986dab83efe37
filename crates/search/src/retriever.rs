//! Retrieval over a search backend.
//!
//! Issues the configured search request, normalizes the raw documents and
//! assembles the context blob. Zero hits is a successful, empty outcome;
//! only a failed backend call is an error.

use crate::client::{SearchBackend, SearchRequest};
use crate::types::{FilterValues, IndexSchema, Retrieval, SourceRecord};
use grounded_core::AppResult;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Result cap for the match-all filter-values scan.
const FILTER_SCAN_LIMIT: usize = 1000;

/// Search mode, selected by deployment configuration rather than user
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Full-text match only
    Keyword,

    /// Full-text match fused with a vector-similarity query computed by
    /// the backend from the query text
    Hybrid,
}

impl SearchMode {
    /// Parse a mode from its configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyword" => Some(Self::Keyword),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Get the canonical mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Retrieval tuning options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,

    /// Result cap. Small by default: larger values inflate prompt size and
    /// generation cost with diminishing precision gains.
    pub top_k: usize,

    /// Candidate count for the vector leg of a hybrid query
    pub k_nearest_neighbors: usize,

    pub schema: IndexSchema,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Keyword,
            top_k: 5,
            k_nearest_neighbors: 5,
            schema: IndexSchema::default(),
        }
    }
}

/// Retriever over a shared search backend handle.
pub struct Retriever {
    backend: Arc<dyn SearchBackend>,
    options: SearchOptions,
}

impl Retriever {
    /// Create a retriever with an injected backend handle.
    pub fn new(backend: Arc<dyn SearchBackend>, options: SearchOptions) -> Self {
        Self { backend, options }
    }

    /// Retrieval options in effect.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Retrieve documents relevant to `query`.
    ///
    /// Returns a [`Retrieval`] whose sources are in backend relevance
    /// order. An empty result is success; an `Err` means the backend call
    /// itself failed and the caller must not treat it as "no documents".
    pub async fn retrieve(&self, query: &str, predicate: Option<String>) -> AppResult<Retrieval> {
        let schema = &self.options.schema;

        let mut request = SearchRequest::keyword(query, schema.select(), self.options.top_k)
            .with_filter(predicate);
        if self.options.mode == SearchMode::Hybrid {
            request = request
                .with_vector_query(schema.vector.clone(), self.options.k_nearest_neighbors);
        }

        let documents = self.backend.search(&request).await?;

        let sources: Vec<SourceRecord> = documents
            .iter()
            .map(|doc| SourceRecord::from_document(doc, schema))
            .collect();

        if sources.is_empty() {
            tracing::info!(mode = self.options.mode.as_str(), "Search matched no documents");
        } else {
            tracing::info!(
                mode = self.options.mode.as_str(),
                count = sources.len(),
                "Retrieved documents"
            );
        }

        Ok(Retrieval::from_sources(sources))
    }

    /// Scan the index for distinct author and category values.
    ///
    /// Issues a match-all query selecting only the filterable fields,
    /// deduplicates and sorts. Degrades to empty lists on backend error so
    /// a broken scan never blocks the chat path.
    pub async fn filter_values(&self) -> FilterValues {
        let schema = &self.options.schema;
        let select = format!("{},{}", schema.author, schema.category);
        let request = SearchRequest::keyword("*", select, FILTER_SCAN_LIMIT);

        let documents = match self.backend.search(&request).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!("Filter value scan failed: {}", e);
                return FilterValues::default();
            }
        };

        let mut authors = BTreeSet::new();
        let mut categories = BTreeSet::new();

        for doc in &documents {
            if let Some(author) = doc.get(&schema.author).and_then(|v| v.as_str()) {
                if !author.trim().is_empty() {
                    authors.insert(author.to_string());
                }
            }
            if let Some(category) = doc.get(&schema.category).and_then(|v| v.as_str()) {
                if !category.trim().is_empty() {
                    categories.insert(category.to_string());
                }
            }
        }

        FilterValues {
            authors: authors.into_iter().collect(),
            categories: categories.into_iter().collect(),
        }
    }
}
