use anyhow::Context;
use clap::Parser;
use devto_analyzer::{run_analysis, DevToAnalyzer, FetchConfig, InsightConfig, InsightGeneratorRegistry, LlmProvider};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Engagement analysis for a dev.to author
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// dev.to username to analyze
    username: String,

    /// dev.to API key (falls back to DEVTO_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Maximum number of article list pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,

    /// Articles per page
    #[arg(long)]
    per_page: Option<u32>,

    /// Insight provider: openai, groq, mock or none
    #[arg(long, default_value = "openai")]
    llm_provider: String,

    /// Number of topic ideas to generate
    #[arg(long, default_value_t = 5)]
    num_ideas: usize,

    /// Write the JSON result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the condensed report instead of the full one
    #[arg(long)]
    condensed: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "devto_analyzer=debug" } else { "devto_analyzer=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the JSON result
        .init();

    let mut fetch_config = FetchConfig::from_env();
    if let Some(api_key) = args.api_key {
        fetch_config.api_key = Some(api_key);
    }
    if let Some(max_pages) = args.max_pages {
        fetch_config.max_pages = max_pages;
    }
    if let Some(per_page) = args.per_page {
        fetch_config.per_page = per_page;
    }

    let provider: LlmProvider = args.llm_provider.parse()?;
    let insight_config = InsightConfig::new(provider, args.num_ideas);
    let registry = InsightGeneratorRegistry::default();

    let analyzer = DevToAnalyzer::new(fetch_config).context("invalid analyzer configuration")?;
    let outcome = run_analysis(&analyzer, &args.username, &insight_config, &registry)
        .await
        .with_context(|| format!("analysis of {} failed", args.username))?;

    let result = if args.condensed {
        json!({
            "username": outcome.username,
            "condensed": outcome.condensed,
            "insights": outcome.insights,
            "topic_ideas": outcome.topic_ideas,
            "llm_enabled": outcome.llm_enabled,
            "llm_provider": outcome.llm_provider,
        })
    } else {
        serde_json::to_value(&outcome)?
    };
    let rendered = serde_json::to_string_pretty(&result)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered).with_context(|| format!("could not write {}", path.display()))?;
            info!("Wrote analysis for {} to {}", outcome.username, path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
