//! Pipeline result types.

use futures::Stream;
use grounded_prompt::NO_ANSWER_MESSAGE;
use grounded_search::SourceRecord;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// How the answer was produced.
///
/// Lets callers distinguish "no answer because nothing was retrieved" from
/// "the answer text is a generation-failure notice" without parsing the
/// answer string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Normal path: generated from retrieved context
    Grounded,

    /// Retrieval succeeded but matched nothing; generation was skipped
    NoContext,

    /// Generation failed; the answer is a user-visible explanation and the
    /// sources are still the retrieval result
    Degraded,
}

/// Final result of one answering request.
///
/// Produced once per request and immutable afterwards. `sources` is in
/// retrieval order and is always reported, even though the answer does
/// not literally quote them, so a caller can audit grounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub status: AnswerStatus,
    pub answer: String,
    pub sources: Vec<SourceRecord>,
}

impl AnswerResult {
    /// Normal result: a generated answer over retrieved sources.
    pub fn grounded(answer: String, sources: Vec<SourceRecord>) -> Self {
        Self {
            status: AnswerStatus::Grounded,
            answer,
            sources,
        }
    }

    /// Short-circuit result for an empty retrieval.
    pub fn no_context() -> Self {
        Self {
            status: AnswerStatus::NoContext,
            answer: NO_ANSWER_MESSAGE.to_string(),
            sources: Vec::new(),
        }
    }

    /// Fail-soft result for a generation failure.
    pub fn degraded(answer: String, sources: Vec<SourceRecord>) -> Self {
        Self {
            status: AnswerStatus::Degraded,
            answer,
            sources,
        }
    }
}

/// Stream of answer text deltas.
///
/// Fail-soft is already applied: a generation error surfaces as one final
/// explanatory delta, after which the stream ends. Single consumer;
/// dropping the stream early releases the backend connection.
pub type DeltaStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Streamed variant of [`AnswerResult`].
///
/// Sources are known before generation starts (retrieval completes first),
/// so they are available immediately; the answer arrives incrementally
/// through `deltas`, in arrival order.
pub struct StreamedAnswer {
    pub sources: Vec<SourceRecord>,
    pub deltas: DeltaStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_context_uses_canonical_sentence() {
        let result = AnswerResult::no_context();
        assert_eq!(result.status, AnswerStatus::NoContext);
        assert_eq!(result.answer, NO_ANSWER_MESSAGE);
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_status_serialization() {
        let result = AnswerResult::grounded("text".to_string(), Vec::new());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "grounded");
    }
}
