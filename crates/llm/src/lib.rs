//! Completion backend integration for the Grounded answering service.
//!
//! Provides a provider-agnostic abstraction for chat completions with two
//! delivery modes: buffered (single final string) and streamed (incremental
//! text deltas delivered in arrival order).
//!
//! # Example
//! ```no_run
//! use grounded_llm::{ChatMessage, ChatRequest, LlmClient, OpenAiChatClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiChatClient::new("https://api.openai.com/v1", "key");
//! let request = ChatRequest::new(
//!     "gpt-4o-mini",
//!     vec![ChatMessage::user("Hello, world!")],
//! );
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod providers;

// Re-export main types
pub use client::{
    ChatDelta, ChatMessage, ChatRequest, ChatResponse, ChatStream, LlmClient, Role, Usage,
};
pub use providers::OpenAiChatClient;
