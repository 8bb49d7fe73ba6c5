//! Execution traces for pipeline runs

use serde::{Deserialize, Serialize};

use super::Stage;
use crate::outcome::SourceMode;

/// Trace of a single stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTrace {
    pub stage: Stage,

    /// Wall-clock time spent in the stage
    pub duration_ms: u64,

    /// Live/fallback/skipped, for stages backed by an external service
    pub mode: Option<SourceMode>,

    /// Short human-readable summary
    pub detail: String,
}

impl StageTrace {
    pub fn new(stage: Stage, duration_ms: u64, detail: impl Into<String>) -> Self {
        Self {
            stage,
            duration_ms,
            mode: None,
            detail: detail.into(),
        }
    }

    pub fn with_mode(mut self, mode: SourceMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Complete trace of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTrace {
    pub topic: String,

    /// Stage traces in execution order
    pub stages: Vec<StageTrace>,

    pub total_duration_ms: u64,
}

impl PipelineTrace {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            stages: Vec::new(),
            total_duration_ms: 0,
        }
    }

    pub fn add_stage(&mut self, stage: StageTrace) {
        self.total_duration_ms += stage.duration_ms;
        self.stages.push(stage);
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageTrace> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn completed_stages(&self) -> usize {
        self.stages.len()
    }

    /// Whether any stage substituted canned data
    pub fn is_degraded(&self) -> bool {
        self.stages
            .iter()
            .any(|s| s.mode == Some(SourceMode::Fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_trace() {
        let mut trace = PipelineTrace::new("rust");

        trace.add_stage(
            StageTrace::new(Stage::Search, 120, "3 snippets").with_mode(SourceMode::Live),
        );
        trace.add_stage(StageTrace::new(Stage::Score, 1, "positive"));

        assert_eq!(trace.completed_stages(), 2);
        assert_eq!(trace.total_duration_ms, 121);
        assert!(!trace.is_degraded());
        assert_eq!(trace.stage(Stage::Score).map(|s| s.detail.as_str()), Some("positive"));
        assert!(trace.stage(Stage::Save).is_none());

        trace.add_stage(
            StageTrace::new(Stage::GenerateInsight, 0, "canned").with_mode(SourceMode::Fallback),
        );
        assert!(trace.is_degraded());
    }

    #[test]
    fn test_skipped_is_not_degraded() {
        let mut trace = PipelineTrace::new("rust");
        trace.add_stage(
            StageTrace::new(Stage::GenerateInsight, 0, "disabled").with_mode(SourceMode::Skipped),
        );
        assert!(!trace.is_degraded());
    }
}
