//! Prompt assembler.

use grounded_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;

/// Canonical sentence used when the retrieved context cannot answer the
/// question.
///
/// The system instruction tells the model to reply with exactly this
/// sentence, and the orchestrator uses the same sentence for its
/// empty-retrieval short-circuit, so callers and tests can match a single
/// string.
pub const NO_ANSWER_MESSAGE: &str =
    "I don't have enough information in the provided documents to answer that question.";

/// User-turn template. The context block precedes the question block:
/// models weight recency, so the grounding material is anchored before the
/// task instruction.
const USER_TEMPLATE: &str = "Context documents:\n{{context}}\n\nQuestion:\n{{question}}\n\n\
Answer the question using only the context documents above.";

/// An assembled prompt, ready for the completion backend.
#[derive(Debug, Clone, Serialize)]
pub struct ChatPrompt {
    /// Fixed grounding instruction
    pub system: String,

    /// Rendered user turn embedding context and question
    pub user: String,
}

/// Fixed system instruction for grounded answering.
pub fn system_prompt() -> String {
    format!(
        "You are an assistant that answers questions using only the context documents \
supplied in the user message.\n\n\
Instructions:\n\
- Base every statement on the context documents; never use outside knowledge\n\
- Use structured formatting (short paragraphs, lists where helpful)\n\
- Do not invent citations or facts that are not in the context\n\
- If the context documents do not contain enough information to answer, reply with \
exactly this sentence: \"{}\"\n",
        NO_ANSWER_MESSAGE
    )
}

/// Assemble the grounding prompt for one request.
///
/// `context` is the retrieved context blob; `query` is the trimmed user
/// question. Both are embedded verbatim; no truncation happens here, the
/// retrieval cap bounds the context size.
pub fn assemble(query: &str, context: &str) -> AppResult<ChatPrompt> {
    let mut handlebars = Handlebars::new();

    // Plain text output; HTML escaping would corrupt the context.
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("user", USER_TEMPLATE)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let mut variables = BTreeMap::new();
    variables.insert("context", context);
    variables.insert("question", query);

    let user = handlebars
        .render("user", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    tracing::debug!(
        context_bytes = context.len(),
        "Assembled grounding prompt"
    );

    Ok(ChatPrompt {
        system: system_prompt(),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_carries_refusal_sentence() {
        let system = system_prompt();
        assert!(system.contains(NO_ANSWER_MESSAGE));
        assert!(system.contains("only the context documents"));
    }

    #[test]
    fn test_context_precedes_question() {
        let prompt = assemble("What is the refund policy?", "Refunds within 30 days.").unwrap();

        let context_pos = prompt.user.find("Refunds within 30 days.").unwrap();
        let question_pos = prompt.user.find("What is the refund policy?").unwrap();
        assert!(context_pos < question_pos);
    }

    #[test]
    fn test_blocks_are_labeled() {
        let prompt = assemble("q", "ctx").unwrap();
        assert!(prompt.user.contains("Context documents:"));
        assert!(prompt.user.contains("Question:"));
    }

    #[test]
    fn test_content_is_embedded_verbatim() {
        let context = "Use <b>bold</b> & 'quotes' {{literally}}";
        let prompt = assemble("why?", context).unwrap();
        assert!(prompt.user.contains("Use <b>bold</b> & 'quotes'"));
    }

    #[test]
    fn test_fresh_prompt_per_call() {
        let a = assemble("first", "ctx-a").unwrap();
        let b = assemble("second", "ctx-b").unwrap();
        assert_ne!(a.user, b.user);
        assert_eq!(a.system, b.system);
    }
}
