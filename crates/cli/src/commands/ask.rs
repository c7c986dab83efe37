//! Ask command handler.

use clap::Args;
use futures::StreamExt;
use grounded_core::AppResult;
use grounded_pipeline::ChatPipeline;
use grounded_search::SourceRecord;
use std::collections::BTreeMap;
use std::io::Write;

/// Ask a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Metadata filter as field=value (repeatable)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filter: Vec<(String, String)>,

    /// Disable streaming and print the full answer at once
    #[arg(long)]
    pub no_stream: bool,

    /// Output the full result as JSON (implies --no-stream)
    #[arg(long)]
    pub json: bool,
}

/// Parse a `field=value` filter argument.
fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid filter '{}', expected field=value", s)),
    }
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, pipeline: &ChatPipeline) -> AppResult<()> {
        let filters: BTreeMap<String, String> = self.filter.iter().cloned().collect();

        if self.json || self.no_stream {
            let result = pipeline.answer(&self.query, &filters).await?;

            if self.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.answer);
                print_sources(&result.sources);
            }
            return Ok(());
        }

        // Streamed delivery: print each delta as it arrives
        let mut streamed = pipeline.answer_stream(&self.query, &filters).await?;

        while let Some(delta) = streamed.deltas.next().await {
            print!("{}", delta);
            std::io::stdout().flush().ok();
        }
        println!();

        print_sources(&streamed.sources);

        Ok(())
    }
}

/// Print the source list after an answer.
fn print_sources(sources: &[SourceRecord]) {
    if sources.is_empty() {
        return;
    }

    println!("\nSources:");
    for (i, source) in sources.iter().enumerate() {
        println!(
            "  {}. {} by {} ({}, {})",
            i + 1,
            source.title,
            source.author,
            source.category,
            source.date
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("author=O'Brien"),
            Ok(("author".to_string(), "O'Brien".to_string()))
        );
        assert_eq!(
            parse_filter("category=a=b"),
            Ok(("category".to_string(), "a=b".to_string()))
        );
        assert!(parse_filter("no-separator").is_err());
        assert!(parse_filter("=value").is_err());
    }
}
