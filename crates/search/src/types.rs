//! Retrieval result types and index schema configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel used when a record is missing a metadata field.
///
/// Partial metadata must never fail a retrieval; absent fields default to
/// this marker instead.
pub const MISSING_FIELD: &str = "N/A";

/// Names of the selectable fields in the search index.
///
/// The field schema is index-specific, so it is configured rather than
/// hard-coded. The defaults match the reference index layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Document key field
    pub id: String,

    /// Fragment title field
    pub title: String,

    /// Parent document title field, when the index stores chunked
    /// documents with a separate parent record
    pub parent_title: Option<String>,

    /// Author field
    pub author: String,

    /// Category/topic field
    pub category: String,

    /// Date field
    pub date: String,

    /// Content field used both for keyword matching and for the context
    /// blob
    pub content: String,

    /// Vector field used by hybrid search
    pub vector: String,

    /// Backend-assigned relevance score key
    pub score: String,
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            title: "title".to_string(),
            parent_title: None,
            author: "author".to_string(),
            category: "category".to_string(),
            date: "date".to_string(),
            content: "content".to_string(),
            vector: "contentVector".to_string(),
            score: "@search.score".to_string(),
        }
    }
}

impl IndexSchema {
    /// Comma-separated field selection for a search request.
    pub fn select(&self) -> String {
        let mut fields = vec![
            self.id.as_str(),
            self.title.as_str(),
            self.author.as_str(),
            self.category.as_str(),
            self.date.as_str(),
            self.content.as_str(),
        ];
        if let Some(parent) = &self.parent_title {
            fields.push(parent.as_str());
        }
        fields.join(",")
    }
}

/// A normalized retrieval result.
///
/// Created fresh per retrieval call from a backend-specific result object
/// and never mutated afterwards. The relevance score is an opaque,
/// backend-defined float kept for display and audit only; scores are not
/// comparable across search modes and are never used to re-rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    pub title: String,

    /// Title of the parent document for chunked indexes
    pub document: String,

    pub author: String,
    pub category: String,
    pub date: String,
    pub content: String,

    #[serde(default)]
    pub score: f64,
}

impl SourceRecord {
    /// Normalize a raw backend document into a `SourceRecord`.
    ///
    /// Any field absent in the document defaults to [`MISSING_FIELD`]; the
    /// score defaults to 0.0 when unavailable.
    pub fn from_document(doc: &Value, schema: &IndexSchema) -> Self {
        let field = |name: &str| -> String {
            doc.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| MISSING_FIELD.to_string())
        };

        Self {
            id: field(&schema.id),
            title: field(&schema.title),
            document: schema
                .parent_title
                .as_deref()
                .map(|name| field(name))
                .unwrap_or_else(|| MISSING_FIELD.to_string()),
            author: field(&schema.author),
            category: field(&schema.category),
            date: field(&schema.date),
            content: field(&schema.content),
            score: doc.get(&schema.score).and_then(Value::as_f64).unwrap_or(0.0),
        }
    }
}

/// Outcome of a successful retrieval call.
///
/// `sources` is in backend relevance order (the backend's ranking is
/// authoritative) and `context` is the blank-line-joined concatenation of
/// the sources' content fields in that order. A successful call that
/// matched nothing produces an empty `Retrieval`, a distinct outcome from
/// a failed call, which is an error.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    /// Concatenated content of all retrieved records
    pub context: String,

    /// Normalized records, in backend order
    pub sources: Vec<SourceRecord>,
}

impl Retrieval {
    /// Build a retrieval outcome from normalized records.
    pub fn from_sources(sources: Vec<SourceRecord>) -> Self {
        let context = sources
            .iter()
            .map(|record| record.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self { context, sources }
    }

    /// True when the call succeeded but matched no records.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Distinct values usable as filters, scanned from the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterValues {
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_complete_document() {
        let doc = json!({
            "id": "doc-1",
            "title": "Refund policy",
            "author": "Jane Doe",
            "category": "billing",
            "date": "2024-01-15",
            "content": "Refunds within 30 days.",
            "@search.score": 2.17,
        });

        let record = SourceRecord::from_document(&doc, &IndexSchema::default());
        assert_eq!(record.id, "doc-1");
        assert_eq!(record.title, "Refund policy");
        assert_eq!(record.author, "Jane Doe");
        assert_eq!(record.content, "Refunds within 30 days.");
        assert_eq!(record.score, 2.17);
        assert_eq!(record.document, MISSING_FIELD);
    }

    #[test]
    fn test_missing_fields_default_to_sentinel() {
        let doc = json!({ "content": "Some text." });

        let record = SourceRecord::from_document(&doc, &IndexSchema::default());
        assert_eq!(record.id, MISSING_FIELD);
        assert_eq!(record.title, MISSING_FIELD);
        assert_eq!(record.author, MISSING_FIELD);
        assert_eq!(record.content, "Some text.");
        assert_eq!(record.score, 0.0);
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let doc = json!({ "title": "", "content": "x" });
        let record = SourceRecord::from_document(&doc, &IndexSchema::default());
        assert_eq!(record.title, MISSING_FIELD);
    }

    #[test]
    fn test_context_joins_content_in_order() {
        let docs = [
            json!({ "content": "Refunds within 30 days." }),
            json!({ "content": "Contact support for exceptions." }),
        ];
        let schema = IndexSchema::default();
        let sources = docs
            .iter()
            .map(|d| SourceRecord::from_document(d, &schema))
            .collect();

        let retrieval = Retrieval::from_sources(sources);
        assert_eq!(
            retrieval.context,
            "Refunds within 30 days.\n\nContact support for exceptions."
        );
        assert_eq!(retrieval.sources.len(), 2);
        assert!(!retrieval.is_empty());
    }

    #[test]
    fn test_empty_retrieval() {
        let retrieval = Retrieval::from_sources(Vec::new());
        assert!(retrieval.is_empty());
        assert!(retrieval.context.is_empty());
    }

    #[test]
    fn test_schema_select_list() {
        let schema = IndexSchema::default();
        assert_eq!(schema.select(), "id,title,author,category,date,content");

        let chunked = IndexSchema {
            parent_title: Some("documentTitle".to_string()),
            ..IndexSchema::default()
        };
        assert!(chunked.select().ends_with(",documentTitle"));
    }
}
