//! Error types for the Grounded answering service.
//!
//! This module defines a unified error enum covering every error category
//! in the application: validation, configuration, search, prompt, LLM and
//! serialization errors.

use thiserror::Error;

/// Unified error type for the Grounded answering service.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// Backend-originated errors are converted into one of these variants at
/// the component boundary that made the call; raw transport errors never
/// cross into the orchestrator.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid user input, rejected before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or inconsistent configuration, surfaced at initialization
    #[error("Configuration error: {0}")]
    Config(String),

    /// Search backend errors during retrieval
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt assembly errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Completion backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Validation("query must not be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: query must not be empty");

        let err = AppError::Search("timeout".to_string());
        assert_eq!(err.to_string(), "Search error: timeout");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
