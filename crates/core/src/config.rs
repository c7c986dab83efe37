//! Configuration management for the Grounded answering service.
//!
//! The configuration surface is environment-driven: backend endpoints and
//! credentials come from environment variables (optionally loaded from a
//! `.env` file by the binaries). Absence of any required value blocks
//! startup with an enumerated list of the missing names rather than a
//! generic failure.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// Holds the connection settings for both backend collaborators plus the
/// pipeline tuning options. Loaded once per process; the client handles
/// built from it are shared across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search service endpoint (e.g., "https://example.search.windows.net")
    pub search_endpoint: String,

    /// Search service API key
    pub search_api_key: String,

    /// Name of the search index to query
    pub search_index: String,

    /// Completion service endpoint
    pub llm_endpoint: String,

    /// Completion service API key
    pub llm_api_key: String,

    /// Model deployment identifier (e.g., "gpt-4o-mini")
    pub llm_deployment: String,

    /// Search mode: "keyword" or "hybrid"
    pub search_mode: String,

    /// Number of documents to retrieve per question
    pub top_k: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Disable colored output
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables: `SEARCH_ENDPOINT`, `SEARCH_API_KEY`,
    /// `SEARCH_INDEX`, `LLM_ENDPOINT`, `LLM_API_KEY`, `LLM_DEPLOYMENT`.
    /// If any are unset or blank, a single `Config` error naming all of
    /// them is returned.
    ///
    /// Optional variables: `SEARCH_MODE` ("keyword" or "hybrid", default
    /// "keyword"), `TOP_K` (default 5), `RUST_LOG`, `NO_COLOR`.
    pub fn from_env() -> AppResult<Self> {
        Self::load_from(|name| std::env::var(name).ok())
    }

    fn load_from<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| -> String {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(value) => value,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let search_endpoint = required("SEARCH_ENDPOINT");
        let search_api_key = required("SEARCH_API_KEY");
        let search_index = required("SEARCH_INDEX");
        let llm_endpoint = required("LLM_ENDPOINT");
        let llm_api_key = required("LLM_API_KEY");
        let llm_deployment = required("LLM_DEPLOYMENT");

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let search_mode = lookup("SEARCH_MODE").unwrap_or_else(|| "keyword".to_string());
        let top_k = match lookup("TOP_K") {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                AppError::Config(format!("TOP_K must be a positive integer, got '{}'", raw))
            })?,
            None => 5,
        };

        Ok(Self {
            search_endpoint,
            search_api_key,
            search_index,
            llm_endpoint,
            llm_api_key,
            llm_deployment,
            search_mode,
            top_k,
            log_level: lookup("RUST_LOG"),
            no_color: lookup("NO_COLOR").is_some(),
        })
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        search_mode: Option<String>,
        top_k: Option<usize>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(search_mode) = search_mode {
            self.search_mode = search_mode;
        }

        if let Some(top_k) = top_k {
            self.top_k = top_k;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }
}
