//! Journal of saved reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::scoring::Sentiment;

use super::ResearchReport;

/// One line of the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub path: PathBuf,
    pub label: Sentiment,
}

impl HistoryEntry {
    pub fn new(report: &ResearchReport, path: impl Into<PathBuf>) -> Self {
        Self {
            topic: report.topic.clone(),
            created_at: report.created_at,
            path: path.into(),
            label: report.score.label,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    sessions: Vec<HistoryEntry>,
}

/// JSON document `{"sessions": [...]}` listing every saved report
#[derive(Debug, Clone)]
pub struct HistoryJournal {
    path: PathBuf,
}

impl HistoryJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recorded sessions. A missing or unreadable journal is empty.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<HistoryDocument>(&content) {
            Ok(document) => document.sessions,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt history journal");
                Vec::new()
            }
        }
    }

    /// Append an entry, replacing the file through a temporary sibling.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written.
    pub fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut document = HistoryDocument {
            sessions: self.entries(),
        };
        document.sessions.push(entry);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, serde_json::to_string_pretty(&document)?)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            sessions = document.sessions.len(),
            "Updated history journal"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_and_grows_journal() {
        let dir = TempDir::new().unwrap();
        let journal = HistoryJournal::new(dir.path().join("history.json"));
        let report = sample_report();

        journal.append(HistoryEntry::new(&report, "a.json")).unwrap();
        journal.append(HistoryEntry::new(&report, "b.json")).unwrap();

        let entries = journal.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].path, PathBuf::from("b.json"));
        assert_eq!(entries[0].label, Sentiment::Positive);
        assert!(!dir.path().join("history.json.tmp").exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(journal.path()).unwrap()).unwrap();
        assert_eq!(raw["sessions"][0]["topic"], "AI in education");
    }

    #[test]
    fn test_corrupt_journal_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        let journal = HistoryJournal::new(&path);
        assert!(journal.entries().is_empty());

        journal
            .append(HistoryEntry::new(&sample_report(), "c.json"))
            .unwrap();
        assert_eq!(journal.entries().len(), 1);
    }
}
