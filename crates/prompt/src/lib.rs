//! Grounding prompt assembly.
//!
//! Combines a fixed grounding instruction, the retrieved context and the
//! user question into the structured prompt sent to the completion
//! backend. Prompts are constructed fresh per request and never cached.

mod assembler;

pub use assembler::{assemble, system_prompt, ChatPrompt, NO_ANSWER_MESSAGE};
