//! Research reports: the single persisted artifact of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::SourceMode;
use crate::scoring::{ScoreResult, TextStats};
use crate::search::Snippet;

pub mod history;
pub mod render;
pub mod sink;

pub use history::{HistoryEntry, HistoryJournal};
pub use render::{render, render_markdown};
pub use sink::ReportSink;

/// Where each part of a report came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Provenance {
    pub search: SourceMode,
    pub insight: SourceMode,
    #[serde(default)]
    pub search_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Result of one research run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub snippets: Vec<Snippet>,
    pub score: ScoreResult,
    pub insight: Option<String>,

    /// Word and sentence counts over the scored text
    #[serde(default)]
    pub stats: TextStats,

    #[serde(default)]
    pub provenance: Provenance,
}

impl ResearchReport {
    /// File stem derived from the creation time, down to the millisecond
    pub fn file_stem(&self) -> String {
        self.created_at
            .format("report_%Y%m%d_%H%M%S_%3f")
            .to_string()
    }

    /// Default JSON file name; the sink adds a suffix if it is taken
    pub fn file_name(&self) -> String {
        format!("{}.json", self.file_stem())
    }
}
