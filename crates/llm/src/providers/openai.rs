//! OpenAI-compatible chat completion provider.
//!
//! Works against any endpoint implementing the `/chat/completions` wire
//! contract with bearer authentication. Streaming uses server-sent events:
//! `data: {json}` frames terminated by a `data: [DONE]` sentinel. Frames
//! can straddle transport chunk boundaries, so incoming bytes are
//! line-buffered before parsing.

use crate::client::{ChatDelta, ChatMessage, ChatRequest, ChatResponse, ChatStream, LlmClient, Usage};
use futures::StreamExt;
use grounded_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Wire request format.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

impl<'a> ApiRequest<'a> {
    fn from_request(request: &'a ChatRequest, stream: bool) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }
}

/// Buffered wire response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// Streamed wire frame.
#[derive(Debug, Deserialize)]
struct ApiStreamFrame {
    #[serde(default)]
    choices: Vec<ApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChoice {
    #[serde(default)]
    delta: ApiStreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiStreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// SSE payload terminator.
const DONE_SENTINEL: &str = "[DONE]";

/// Pop the next complete line out of the buffer, or `None` if no full line
/// has arrived yet.
fn next_line(buffer: &mut String) -> Option<String> {
    let pos = buffer.find('\n')?;
    let line: String = buffer.drain(..=pos).collect();
    Some(line.trim().to_string())
}

/// Extract the JSON payload from an SSE line, if it carries one.
fn sse_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Parse one SSE payload into a delta. `None` for the `[DONE]` sentinel.
fn parse_frame(payload: &str) -> AppResult<Option<ChatDelta>> {
    if payload == DONE_SENTINEL {
        return Ok(None);
    }

    let frame: ApiStreamFrame = serde_json::from_str(payload)
        .map_err(|e| AppError::Llm(format!("Failed to parse stream frame: {}", e)))?;

    let Some(choice) = frame.choices.into_iter().next() else {
        // Bookkeeping frames (e.g., content-filter annotations) carry no
        // choices; surface them as empty deltas to preserve arrival order.
        return Ok(Some(ChatDelta {
            content: String::new(),
            done: false,
        }));
    };

    Ok(Some(ChatDelta {
        content: choice.delta.content.unwrap_or_default(),
        done: choice.finish_reason.is_some(),
    }))
}

/// OpenAI-compatible chat client.
///
/// Holds a reusable HTTP connection pool; construct once per process and
/// share across requests.
pub struct OpenAiChatClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiChatClient {
    /// Create a new client for an OpenAI-compatible endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(&self, body: &ApiRequest<'_>) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to reach completion service: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Completion service error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiChatClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(model = %request.model, "Sending completion request");

        let response = self.send(&ApiRequest::from_request(request, false)).await?;

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse completion response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Completion response had no choices".to_string()))?;

        let usage = body.usage.unwrap_or_default();

        tracing::debug!(tokens = usage.total_tokens, "Completion received");

        Ok(ChatResponse {
            content,
            model: body.model,
            usage: Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }

    async fn stream(&self, request: &ChatRequest) -> AppResult<ChatStream> {
        tracing::debug!(model = %request.model, "Starting streaming completion");

        let response = self.send(&ApiRequest::from_request(request, true)).await?;

        let bytes = Box::pin(response.bytes_stream());
        let stream = futures::stream::try_unfold(
            (bytes, String::new()),
            |(mut bytes, mut buffer)| async move {
                loop {
                    if let Some(line) = next_line(&mut buffer) {
                        let Some(payload) = sse_payload(&line) else {
                            continue;
                        };
                        return match parse_frame(payload)? {
                            Some(delta) => Ok(Some((delta, (bytes, buffer)))),
                            None => Ok(None),
                        };
                    }

                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            buffer.push_str(&String::from_utf8_lossy(&chunk));
                        }
                        Some(Err(e)) => {
                            return Err(AppError::Llm(format!("Stream error: {}", e)));
                        }
                        None => return Ok(None),
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let client = OpenAiChatClient::new("https://api.example.com/v1/", "key");
        assert_eq!(
            client.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("hi")])
            .with_temperature(0.3);
        let body = serde_json::to_value(ApiRequest::from_request(&request, true)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], true);
        assert_eq!(body["temperature"], 0.3);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_next_line_waits_for_newline() {
        let mut buffer = String::from("data: {\"choices\"");
        assert_eq!(next_line(&mut buffer), None);

        buffer.push_str(":[]}\ndata: more");
        assert_eq!(next_line(&mut buffer), Some("data: {\"choices\":[]}".to_string()));
        assert_eq!(buffer, "data: more");
    }

    #[test]
    fn test_sse_payload_extraction() {
        assert_eq!(sse_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_payload("data: [DONE]"), Some("[DONE]"));
        assert_eq!(sse_payload(": keep-alive"), None);
        assert_eq!(sse_payload(""), None);
    }

    #[test]
    fn test_parse_frame_delta() {
        let payload = r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#;
        let delta = parse_frame(payload).unwrap().unwrap();
        assert_eq!(delta.content, "Hel");
        assert!(!delta.done);
    }

    #[test]
    fn test_parse_frame_finish() {
        let payload = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let delta = parse_frame(payload).unwrap().unwrap();
        assert!(delta.content.is_empty());
        assert!(delta.done);
    }

    #[test]
    fn test_parse_frame_done_sentinel() {
        assert!(parse_frame("[DONE]").unwrap().is_none());
    }

    #[test]
    fn test_parse_frame_empty_choices() {
        let delta = parse_frame(r#"{"choices":[]}"#).unwrap().unwrap();
        assert!(delta.content.is_empty());
        assert!(!delta.done);
    }

    #[test]
    fn test_parse_frame_malformed() {
        assert!(parse_frame("{not json").is_err());
    }

    #[test]
    fn test_buffered_response_parsing() {
        let raw = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "Answer."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        }"#;
        let body: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.choices[0].message.content, "Answer.");
        assert_eq!(body.usage.unwrap().total_tokens, 13);
    }
}
