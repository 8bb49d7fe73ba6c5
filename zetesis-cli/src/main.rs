//! Zetesis CLI - run research passes and inspect saved reports

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use zetesis_core::prelude::*;

const DEFAULT_TOPIC: &str = "Штучний інтелект в освіті 2025";

#[derive(Parser)]
#[command(name = "zetesis")]
#[command(about = "Search, score and summarize a research topic", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file layered over zetesis.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the research pipeline (default)
    Research(ResearchArgs),
    /// Render a saved report
    Show {
        /// Path to a report_*.json file
        path: PathBuf,
    },
    /// Show credential and configuration status
    Check,
    /// Version information
    Version,
}

#[derive(Args, Default)]
struct ResearchArgs {
    /// Topic to research
    topic: Option<String>,

    /// Number of search results to keep
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Directory for the JSON report
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Do not print the formatted report
    #[arg(long)]
    no_render: bool,

    /// Skip the insight stage
    #[arg(long)]
    no_insight: bool,

    /// Also write a Markdown copy of the report
    #[arg(long)]
    markdown: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Research(ResearchArgs::default()));

    match command {
        Commands::Research(args) => research(cli.config.as_deref(), args).await?,
        Commands::Show { path } => {
            let report = ReportSink::load(&path)
                .with_context(|| format!("failed to load report {}", path.display()))?;
            println!("{}", render(&report));
        }
        Commands::Check => check(&load_config(cli.config.as_deref())?),
        Commands::Version => {
            println!("zetesis {}", env!("CARGO_PKG_VERSION"));
            println!("zetesis-core {}", zetesis_core::VERSION);
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<ZetesisConfig> {
    ZetesisConfig::load_from(explicit).context("failed to load configuration")
}

async fn research(explicit: Option<&Path>, args: ResearchArgs) -> Result<()> {
    let mut config = load_config(explicit)?;

    if let Some(max_results) = args.max_results {
        config.search.max_results = max_results;
    }
    if let Some(output_dir) = args.output_dir {
        config.report.output_dir = output_dir;
    }
    if args.no_render {
        config.report.render = false;
    }
    if args.no_insight {
        config.insight.enabled = false;
    }
    if args.markdown {
        config.report.markdown = true;
    }
    config.validate().context("invalid command-line options")?;

    let topic = args.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    tracing::debug!(
        search = config.search.provider.as_str(),
        llm = config.llm.provider.as_str(),
        output_dir = %config.report.output_dir.display(),
        "Configuration loaded"
    );

    let client = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let pipeline = ResearchPipeline::from_config(&config, &client);

    println!("Researching: {}", topic);
    let output = pipeline
        .run_with_progress(&topic, |stage| {
            println!("[{}/{}] {}...", stage.number(), Stage::ALL.len(), stage.label());
        })
        .await
        .with_context(|| format!("research run for '{}' failed", topic))?;

    if config.report.render {
        println!();
        println!("{}", render(&output.report));
    }

    println!("Report saved to {}", output.path.display());
    if output.trace.is_degraded() {
        println!("Note: some results are canned (see provenance in the report)");
    }

    Ok(())
}

fn check(config: &ZetesisConfig) {
    let llm = &config.llm;

    println!("LLM provider:  {}", llm.provider.as_str());
    println!("Model:         {}", llm.model);
    println!("Endpoint:      {}", llm.resolved_base_url());
    match llm.masked_api_key().filter(|_| llm.has_credential()) {
        Some(masked) => println!("API key:       {}", masked),
        None => println!(
            "API key:       not set ({} missing, insights will be canned)",
            llm.provider.credential_env()
        ),
    }
    println!("Search:        {}", config.search.provider.as_str());
    println!("Max results:   {}", config.search.max_results);
    println!("Insight stage: {}", if config.insight.enabled { "enabled" } else { "disabled" });
    println!("Output dir:    {}", config.report.output_dir.display());
    println!("Markdown copy: {}", if config.report.markdown { "yes" } else { "no" });
    if let Some(history) = &config.report.history_file {
        println!("History file:  {}", history.display());
    }
}
