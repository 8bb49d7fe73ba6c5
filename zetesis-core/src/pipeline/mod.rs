//! The research pipeline: search, score, generate insight, save
//!
//! Stages run strictly in the order of [`Stage::ALL`]. Search and insight
//! failures degrade to canned data; invalid input and I/O errors abort the
//! run.

use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ZetesisConfig;
use crate::error::{Result, ZetesisError};
use crate::insight::InsightGenerator;
use crate::outcome::SourceMode;
use crate::report::{Provenance, ReportSink, ResearchReport};
use crate::scoring::{ScoreResult, TextScorer, TextStats};
use crate::search::{QuerySource, Snippet, combined_text};

pub mod stage;
pub mod trace;

pub use stage::Stage;
pub use trace::{PipelineTrace, StageTrace};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: ResearchReport,
    pub path: PathBuf,
    pub trace: PipelineTrace,
}

/// Intermediate results carried from one stage to the next
struct RunState {
    snippets: Vec<Snippet>,
    search_mode: SourceMode,
    score: ScoreResult,
    stats: TextStats,
    insight: Option<String>,
    insight_mode: SourceMode,
    saved: Option<(ResearchReport, PathBuf)>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            snippets: Vec::new(),
            search_mode: SourceMode::Fallback,
            score: ScoreResult::from_counts(0, 0),
            stats: TextStats::default(),
            insight: None,
            insight_mode: SourceMode::Skipped,
            saved: None,
        }
    }
}

/// Four-stage research run over injected components
#[derive(Debug)]
pub struct ResearchPipeline {
    source: QuerySource,
    scorer: TextScorer,
    insight: InsightGenerator,
    sink: ReportSink,
    max_results: usize,
    insight_enabled: bool,
}

impl ResearchPipeline {
    pub fn new(
        source: QuerySource,
        scorer: TextScorer,
        insight: InsightGenerator,
        sink: ReportSink,
    ) -> Self {
        Self {
            source,
            scorer,
            insight,
            sink,
            max_results: 3,
            insight_enabled: true,
        }
    }

    /// Wire every component from configuration, sharing one HTTP client
    pub fn from_config(config: &ZetesisConfig, client: &reqwest::Client) -> Self {
        Self::new(
            QuerySource::from_config(&config.search, client),
            TextScorer::new(),
            InsightGenerator::from_config(&config.llm, client),
            ReportSink::from_config(&config.report),
        )
        .with_max_results(config.search.max_results)
        .with_insight_enabled(config.insight.enabled)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_insight_enabled(mut self, enabled: bool) -> Self {
        self.insight_enabled = enabled;
        self
    }

    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }

    /// Run every stage for `topic`.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank topic, a zero result limit, or a report
    /// that cannot be written.
    pub async fn run(&self, topic: &str) -> Result<PipelineOutput> {
        self.run_with_progress(topic, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_stage` as each stage starts.
    pub async fn run_with_progress<F>(&self, topic: &str, mut on_stage: F) -> Result<PipelineOutput>
    where
        F: FnMut(Stage),
    {
        info!(topic, "Starting research run");

        let created_at = Utc::now();
        let mut trace = PipelineTrace::new(topic);
        let mut state = RunState::default();

        for stage in Stage::ALL {
            on_stage(stage);
            let started = Instant::now();

            let stage_trace = match stage {
                Stage::Search => {
                    let outcome = self.source.fetch(topic, self.max_results).await?;
                    state.search_mode = outcome.mode();
                    state.snippets = outcome.into_value();
                    let detail = format!("{} snippets", state.snippets.len());
                    StageTrace::new(stage, elapsed_ms(started), detail).with_mode(state.search_mode)
                }
                Stage::Score => {
                    let text = combined_text(&state.snippets);
                    state.score = self.scorer.score(&text);
                    state.stats = TextStats::from_text(&text);
                    info!(
                        label = %state.score.label,
                        positive = state.score.positive_count,
                        negative = state.score.negative_count,
                        "Scored snippets"
                    );
                    StageTrace::new(stage, elapsed_ms(started), state.score.label.to_string())
                }
                Stage::GenerateInsight => {
                    if self.insight_enabled {
                        let outcome = self.insight.generate(topic, &state.snippets).await;
                        state.insight_mode = outcome.mode();
                        let detail = match outcome.reason() {
                            Some(reason) => format!("canned ({})", reason),
                            None => "live".to_string(),
                        };
                        state.insight = Some(outcome.into_value());
                        StageTrace::new(stage, elapsed_ms(started), detail)
                            .with_mode(state.insight_mode)
                    } else {
                        debug!("Insight stage disabled");
                        state.insight_mode = SourceMode::Skipped;
                        StageTrace::new(stage, elapsed_ms(started), "disabled")
                            .with_mode(SourceMode::Skipped)
                    }
                }
                Stage::Save => {
                    let report = ResearchReport {
                        topic: topic.to_string(),
                        created_at,
                        snippets: std::mem::take(&mut state.snippets),
                        score: state.score,
                        insight: state.insight.take(),
                        stats: state.stats,
                        provenance: Provenance {
                            search: state.search_mode,
                            insight: state.insight_mode,
                            search_provider: self.source.provider_name().to_string(),
                            model: (state.insight_mode == SourceMode::Live)
                                .then(|| self.insight.model_info().model_name),
                        },
                    };
                    let path = self.sink.save(&report)?;
                    let detail = path.display().to_string();
                    state.saved = Some((report, path));
                    StageTrace::new(stage, elapsed_ms(started), detail)
                }
            };

            debug!(stage = %stage, duration_ms = stage_trace.duration_ms, "Stage finished");
            trace.add_stage(stage_trace);
        }

        let (report, path) = state
            .saved
            .ok_or_else(|| ZetesisError::Other("run finished without saving a report".to_string()))?;

        info!(
            path = %path.display(),
            degraded = trace.is_degraded(),
            duration_ms = trace.total_duration_ms,
            "Research run complete"
        );

        Ok(PipelineOutput { report, path, trace })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
