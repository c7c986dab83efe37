//! Serve command handler.

use clap::Args;
use grounded_core::AppResult;
use grounded_pipeline::ChatPipeline;
use std::sync::Arc;

/// Run the HTTP service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:8080", env = "BIND_ADDR")]
    pub addr: String,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, pipeline: Arc<ChatPipeline>) -> AppResult<()> {
        grounded_server::serve(&self.addr, pipeline).await
    }
}
