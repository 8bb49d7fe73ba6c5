//! Offline research example
//!
//! Runs the whole pipeline without network access or an API key: search
//! falls back to canned snippets and the insight to the canned paragraph.
//! The report is written to a temporary directory.

use std::sync::Arc;
use zetesis_core::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Offline Research Example");
    println!("========================\n");

    let output_dir = tempfile::TempDir::new()?;

    let pipeline = ResearchPipeline::new(
        QuerySource::new(Arc::new(StaticSearchProvider::unavailable())),
        TextScorer::new(),
        InsightGenerator::new(Arc::new(StubLLMProvider)),
        ReportSink::new(output_dir.path()),
    );

    let output = pipeline
        .run_with_progress("AI in education", |stage| {
            println!("[{}/{}] {}...", stage.number(), Stage::ALL.len(), stage.label());
        })
        .await?;

    println!("\n{}", render(&output.report));

    println!("Stage timings:");
    for stage in &output.trace.stages {
        let mode = stage.mode.map(|m| m.to_string()).unwrap_or_default();
        println!("  {:<16} {:>5} ms  {} {}", stage.stage, stage.duration_ms, mode, stage.detail);
    }

    println!("\nSaved to {}", output.path.display());
    println!("(temporary directory, removed on exit)");

    Ok(())
}
