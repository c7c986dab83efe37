//! Command handlers for the Grounded CLI.

mod ask;
mod filters;
mod serve;

pub use ask::AskCommand;
pub use filters::FiltersCommand;
pub use serve::ServeCommand;

use grounded_core::{AppConfig, AppError, AppResult};
use grounded_llm::OpenAiChatClient;
use grounded_pipeline::{ChatPipeline, PipelineOptions};
use grounded_search::{RestSearchClient, SearchMode, SearchOptions};
use std::sync::Arc;

/// Build the answer pipeline from configuration.
///
/// Constructs both backend clients once; the returned pipeline shares them
/// across all requests it serves.
pub fn build_pipeline(config: &AppConfig) -> AppResult<ChatPipeline> {
    let mode = SearchMode::parse(&config.search_mode).ok_or_else(|| {
        AppError::Config(format!(
            "Unknown search mode '{}'. Supported: keyword, hybrid",
            config.search_mode
        ))
    })?;

    let search = Arc::new(RestSearchClient::new(
        &config.search_endpoint,
        &config.search_api_key,
        &config.search_index,
    ));

    let llm = Arc::new(OpenAiChatClient::new(
        &config.llm_endpoint,
        &config.llm_api_key,
    ));

    let options = PipelineOptions {
        deployment: config.llm_deployment.clone(),
        search: SearchOptions {
            mode,
            top_k: config.top_k,
            ..SearchOptions::default()
        },
        use_filters: true,
    };

    Ok(ChatPipeline::new(search, llm, options))
}
