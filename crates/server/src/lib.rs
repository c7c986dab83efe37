//! HTTP front-end for the Grounded answering service.
//!
//! Exposes the answer pipeline as a small JSON API:
//! - `POST /chat`: answer a question with optional metadata filters
//! - `GET /filters`: distinct filterable values from the index
//! - `GET /health`: liveness probe
//!
//! The pipeline handle is built once by the caller and shared across
//! requests through the router state.

mod routes;

pub use routes::{router, ChatRequestBody, ChatResponseBody};

use grounded_core::AppResult;
use grounded_pipeline::ChatPipeline;
use std::sync::Arc;
use tokio::signal;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

/// Serve the API on `addr` until Ctrl+C.
pub async fn serve(addr: &str, pipeline: Arc<ChatPipeline>) -> AppResult<()> {
    let app = router(AppState { pipeline });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| grounded_core::AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| grounded_core::AppError::Other(format!("Server error: {}", e)))?;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
