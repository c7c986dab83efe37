//! Grounded CLI
//!
//! Main entry point for the grounded command-line tool. Answers questions
//! over a search index, lists filterable values and runs the HTTP service.

mod commands;

use clap::{Parser, Subcommand};
use commands::{build_pipeline, AskCommand, FiltersCommand, ServeCommand};
use grounded_core::{config::AppConfig, logging, AppResult};
use std::sync::Arc;

/// Grounded CLI - question answering over a search index
#[derive(Parser, Debug)]
#[command(name = "grounded")]
#[command(about = "Answer questions grounded in retrieved documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Search mode (keyword, hybrid)
    #[arg(long, global = true, env = "SEARCH_MODE")]
    search_mode: Option<String>,

    /// Number of documents to retrieve per question
    #[arg(long, global = true, env = "TOP_K")]
    top_k: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question
    Ask(AskCommand),

    /// List filterable author and category values
    Filters(FiltersCommand),

    /// Run the HTTP service
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Pick up a local .env before reading the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load base configuration from environment, then apply CLI overrides
    let config = AppConfig::from_env()?.with_overrides(
        cli.search_mode,
        cli.top_k,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!(
        mode = %config.search_mode,
        top_k = config.top_k,
        "Grounded CLI starting"
    );

    // Backend clients are built once and shared across requests
    let pipeline = Arc::new(build_pipeline(&config)?);

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&pipeline).await,
        Commands::Filters(cmd) => cmd.execute(&pipeline).await,
        Commands::Serve(cmd) => cmd.execute(pipeline).await,
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {}", e);
    }

    result
}
