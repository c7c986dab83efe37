//! Answer pipeline orchestration.
//!
//! Sequences the retrieval-augmentation-generation flow for one request:
//! validate the question, build the filter predicate, retrieve documents,
//! short-circuit when nothing was found, assemble the grounding prompt,
//! invoke the completion backend (buffered or streamed) and package the
//! final answer with its source list.
//!
//! Each request is an independent, stateless unit of work: the pipeline
//! holds only shared, read-only client handles injected at construction.
//! The retrieval and generation calls within one request are strictly
//! sequential; independent requests may run concurrently without
//! coordination.

pub mod types;

pub use types::{AnswerResult, AnswerStatus, DeltaStream, StreamedAnswer};

use futures::StreamExt;
use grounded_core::{AppError, AppResult};
use grounded_llm::{ChatMessage, ChatRequest, LlmClient};
use grounded_prompt::{assemble, NO_ANSWER_MESSAGE};
use grounded_search::{
    build_predicate, FilterValues, Retriever, SearchBackend, SearchOptions, SourceRecord,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sampling temperature for answer generation. Low on purpose: grounded
/// answering favors factual reproduction over creative variation.
const GENERATION_TEMPERATURE: f32 = 0.3;

/// Cap on generated answer length, in tokens.
const MAX_ANSWER_TOKENS: u32 = 500;

/// Pipeline configuration.
///
/// One canonical pipeline covers every deployment variant; these options
/// are the only differences between them. Delivery mode is chosen per call
/// ([`ChatPipeline::answer`] vs [`ChatPipeline::answer_stream`]).
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Model deployment identifier passed to the completion backend
    pub deployment: String,

    /// Retrieval tuning (mode, top_k, schema)
    pub search: SearchOptions,

    /// Whether caller-supplied filters are applied
    pub use_filters: bool,
}

impl PipelineOptions {
    /// Options with default retrieval tuning.
    pub fn new(deployment: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            search: SearchOptions::default(),
            use_filters: true,
        }
    }
}

/// Prepared state after the pre-generation stages.
enum Prepared {
    /// Retrieval succeeded but matched nothing
    NoContext,

    /// Ready to generate
    Ready {
        sources: Vec<SourceRecord>,
        request: ChatRequest,
    },
}

/// The answer pipeline.
///
/// Constructed once with already-initialized backend handles (they are
/// expensive to build and shared across requests); never reaches into
/// ambient global state.
pub struct ChatPipeline {
    retriever: Retriever,
    llm: Arc<dyn LlmClient>,
    deployment: String,
    use_filters: bool,
}

impl ChatPipeline {
    /// Create a pipeline from injected backend handles.
    pub fn new(
        search: Arc<dyn SearchBackend>,
        llm: Arc<dyn LlmClient>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            retriever: Retriever::new(search, options.search),
            llm,
            deployment: options.deployment,
            use_filters: options.use_filters,
        }
    }

    /// Answer a question, buffered.
    ///
    /// Returns a well-formed [`AnswerResult`] for every outcome the caller
    /// can display: a grounded answer, the fixed no-context apology, or a
    /// degraded generation-failure notice with the retrieval sources
    /// intact. Errors are limited to invalid input (`Validation`) and a
    /// failed retrieval call (`Search`); generation never raises.
    pub async fn answer(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
    ) -> AppResult<AnswerResult> {
        match self.prepare(query, filters).await? {
            Prepared::NoContext => Ok(AnswerResult::no_context()),
            Prepared::Ready { sources, request } => match self.llm.complete(&request).await {
                Ok(response) => Ok(AnswerResult::grounded(response.content, sources)),
                Err(e) => {
                    tracing::error!("Generation failed: {}", e);
                    Ok(AnswerResult::degraded(degraded_message(&e), sources))
                }
            },
        }
    }

    /// Answer a question, streamed.
    ///
    /// The source list is available immediately; answer text arrives as
    /// deltas in generation order. The same fail-soft contract applies: a
    /// generation failure is delivered as one final explanatory delta
    /// rather than an error, and an empty retrieval yields the fixed
    /// apology as a one-shot delta.
    pub async fn answer_stream(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
    ) -> AppResult<StreamedAnswer> {
        match self.prepare(query, filters).await? {
            Prepared::NoContext => Ok(StreamedAnswer {
                sources: Vec::new(),
                deltas: Box::pin(futures::stream::iter(vec![NO_ANSWER_MESSAGE.to_string()])),
            }),
            Prepared::Ready { sources, request } => {
                let deltas: DeltaStream = match self.llm.stream(&request).await {
                    Ok(inner) => Box::pin(futures::stream::unfold(
                        Some(inner),
                        |state| async move {
                            let mut inner = state?;
                            match inner.next().await {
                                Some(Ok(delta)) => Some((delta.content, Some(inner))),
                                Some(Err(e)) => {
                                    tracing::error!("Generation stream failed: {}", e);
                                    Some((degraded_message(&e), None))
                                }
                                None => None,
                            }
                        },
                    )),
                    Err(e) => {
                        tracing::error!("Generation failed: {}", e);
                        Box::pin(futures::stream::iter(vec![degraded_message(&e)]))
                    }
                };

                Ok(StreamedAnswer { sources, deltas })
            }
        }
    }

    /// Distinct filterable values from the index.
    pub async fn filter_values(&self) -> FilterValues {
        self.retriever.filter_values().await
    }

    /// Run the pre-generation stages: validate, filter, retrieve,
    /// assemble.
    async fn prepare(
        &self,
        query: &str,
        filters: &BTreeMap<String, String>,
    ) -> AppResult<Prepared> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Query must not be empty".to_string()));
        }

        let predicate = if self.use_filters {
            build_predicate(filters)
        } else {
            None
        };

        let retrieval = self.retriever.retrieve(query, predicate).await?;
        if retrieval.is_empty() {
            tracing::info!("No documents retrieved, skipping generation");
            return Ok(Prepared::NoContext);
        }

        let prompt = assemble(query, &retrieval.context)?;
        let request = ChatRequest::new(
            &self.deployment,
            vec![
                ChatMessage::system(prompt.system),
                ChatMessage::user(prompt.user),
            ],
        )
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_tokens(MAX_ANSWER_TOKENS);

        Ok(Prepared::Ready {
            sources: retrieval.sources,
            request,
        })
    }
}

/// User-visible text for a failed generation.
fn degraded_message(error: &AppError) -> String {
    format!(
        "Sorry, I couldn't generate an answer due to an error: {}",
        error
    )
}
