//! The fixed set of pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Search,
    Score,
    GenerateInsight,
    Save,
}

impl Stage {
    /// Every stage, in execution order
    pub const ALL: [Stage; 4] = [
        Stage::Search,
        Stage::Score,
        Stage::GenerateInsight,
        Stage::Save,
    ];

    /// 1-based position in [`Stage::ALL`]
    pub fn number(self) -> usize {
        match self {
            Stage::Search => 1,
            Stage::Score => 2,
            Stage::GenerateInsight => 3,
            Stage::Save => 4,
        }
    }

    /// Progress text shown while the stage runs
    pub fn label(self) -> &'static str {
        match self {
            Stage::Search => "Searching",
            Stage::Score => "Scoring text",
            Stage::GenerateInsight => "Generating insight",
            Stage::Save => "Saving report",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::Score => "score",
            Stage::GenerateInsight => "generate_insight",
            Stage::Save => "save",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
