//! # Zetesis - a small research pipeline
//!
//! Zetesis (Ζήτησις, "inquiry") runs one research pass over a topic:
//! - Web search for short snippets, with canned snippets when search fails
//! - Keyword-count sentiment scoring over the snippet text
//! - Optional commentary from a hosted chat-completions model
//! - A JSON report on disk (optionally Markdown too) plus a console rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zetesis_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ZetesisConfig::load()?;
//!     let client = reqwest::Client::new();
//!
//!     let pipeline = ResearchPipeline::from_config(&config, &client);
//!     let output = pipeline.run("AI in education").await?;
//!
//!     println!("{}", render(&output.report));
//!     Ok(())
//! }
//! ```
//!
//! ## Degraded mode
//!
//! Neither a network connection nor an API key is required. Every component
//! backed by an external service returns an [`outcome::Outcome`], and the
//! report's provenance records whether each part is live or canned.

pub mod config;
pub mod error;
pub mod insight;
pub mod llm;
pub mod outcome;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod search;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        InsightConfig, LLMProvider as LLMProviderType, LLMProviderConfig, ReportConfig,
        SearchBackend, SearchConfig, ZetesisConfig,
    };
    pub use crate::error::{Result, ZetesisError};
    pub use crate::insight::{FALLBACK_INSIGHT, InsightGenerator};
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, Message, MessageRole,
        StubLLMProvider,
    };
    pub use crate::outcome::{FallbackReason, Outcome, SourceMode};
    pub use crate::pipeline::{PipelineOutput, PipelineTrace, ResearchPipeline, Stage, StageTrace};
    pub use crate::report::{Provenance, ReportSink, ResearchReport, render, render_markdown};
    pub use crate::scoring::{ScoreResult, Sentiment, TextScorer, TextStats};
    pub use crate::search::{
        DuckDuckGoSearch, QuerySource, SearchProvider, Snippet, StaticSearchProvider,
        fallback_snippets,
    };
}
