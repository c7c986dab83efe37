//! Search backend integration for the Grounded answering service.
//!
//! This crate covers the retrieval side of the pipeline: building safely
//! escaped filter predicates, issuing keyword or hybrid search requests
//! against a remote search index, and normalizing heterogeneous result
//! records into a uniform source list with a concatenated context blob.
//!
//! The search service itself is a collaborator behind the [`SearchBackend`]
//! trait; this crate never builds indexes or computes embeddings.

pub mod client;
pub mod predicate;
pub mod rest;
pub mod retriever;
pub mod types;

// Re-export commonly used types
pub use client::{SearchBackend, SearchRequest, VectorQuery};
pub use predicate::build_predicate;
pub use rest::RestSearchClient;
pub use retriever::{Retriever, SearchMode, SearchOptions};
pub use types::{FilterValues, IndexSchema, Retrieval, SourceRecord};
