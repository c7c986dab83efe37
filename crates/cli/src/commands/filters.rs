//! Filters command handler.

use clap::Args;
use grounded_core::AppResult;
use grounded_pipeline::ChatPipeline;

/// List filterable author and category values
#[derive(Args, Debug)]
pub struct FiltersCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl FiltersCommand {
    /// Execute the filters command.
    pub async fn execute(&self, pipeline: &ChatPipeline) -> AppResult<()> {
        let values = pipeline.filter_values().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&values)?);
            return Ok(());
        }

        println!("Authors:");
        for author in &values.authors {
            println!("  - {}", author);
        }

        println!("Categories:");
        for category in &values.categories {
            println!("  - {}", category);
        }

        Ok(())
    }
}
