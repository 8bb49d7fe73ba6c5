//! Writing reports to disk

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::error::Result;

use super::history::{HistoryEntry, HistoryJournal};
use super::render::render_markdown;
use super::ResearchReport;

/// Highest `_N` suffix tried before giving up on a free file name
const MAX_NAME_SUFFIX: usize = 999;

/// Stage 4 of the pipeline: persists reports as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct ReportSink {
    output_dir: PathBuf,
    markdown: bool,
    history: Option<HistoryJournal>,
}

impl ReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            markdown: false,
            history: None,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        let sink = Self::new(&config.output_dir).with_markdown(config.markdown);
        match &config.history_file {
            Some(path) => sink.with_history(path),
            None => sink,
        }
    }

    /// Also write a Markdown rendering next to each JSON file
    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Record every saved report in a journal at `path`
    pub fn with_history(mut self, path: impl Into<PathBuf>) -> Self {
        self.history = Some(HistoryJournal::new(path));
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report` into the output directory and return the JSON path.
    ///
    /// Existing files are never replaced: when the timestamped name is
    /// taken, `_1`, `_2`, ... is appended to the stem. With Markdown enabled
    /// a `.md` file with the same stem is written as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, no free name is
    /// left, or a file cannot be written. Journal failures are only logged.
    pub fn save(&self, report: &ResearchReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let content = serde_json::to_string_pretty(report)?;
        let (stem, mut file) = self.create_unique(&report.file_stem())?;
        file.write_all(content.as_bytes())?;

        let path = self.output_dir.join(format!("{}.json", stem));
        info!(path = %path.display(), "Saved report");

        if self.markdown {
            let md_path = self.output_dir.join(format!("{}.md", stem));
            let mut md_file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&md_path)?;
            md_file.write_all(render_markdown(report).as_bytes())?;
            info!(path = %md_path.display(), "Saved Markdown report");
        }

        if let Some(history) = &self.history {
            if let Err(e) = history.append(HistoryEntry::new(report, &path)) {
                warn!(
                    path = %history.path().display(),
                    error = %e,
                    "Failed to update history journal"
                );
            }
        }

        Ok(path)
    }

    /// Create `<stem>.json`, or the first free `<stem>_N.json`.
    fn create_unique(&self, base: &str) -> Result<(String, File)> {
        for attempt in 0..=MAX_NAME_SUFFIX {
            let stem = match attempt {
                0 => base.to_string(),
                n => format!("{}_{}", base, n),
            };
            let path = self.output_dir.join(format!("{}.json", stem));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((stem, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Report name taken, trying next suffix");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free report name for {} in {}", base, self.output_dir.display()),
        )
        .into())
    }

    /// Read a saved report back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a report.
    pub fn load(path: impl AsRef<Path>) -> Result<ResearchReport> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZetesisError;
    use crate::report::fixtures::sample_report;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let sink = ReportSink::new(dir.path());
        let report = sample_report();

        let path = sink.save(&report).unwrap();
        assert_eq!(path, dir.path().join("report_20250314_092653_589.json"));

        let loaded = ReportSink::load(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_same_timestamp_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = ReportSink::new(dir.path());
        let first = sample_report();
        let mut second = sample_report();
        second.topic = "Другий запуск".to_string();

        let first_path = sink.save(&first).unwrap();
        let second_path = sink.save(&second).unwrap();

        assert_ne!(first_path, second_path);
        assert_eq!(
            second_path,
            dir.path().join("report_20250314_092653_589_1.json")
        );
        assert_eq!(ReportSink::load(&first_path).unwrap(), first);
        assert_eq!(ReportSink::load(&second_path).unwrap(), second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_markdown_written_next_to_json() {
        let dir = TempDir::new().unwrap();
        let sink = ReportSink::new(dir.path()).with_markdown(true);
        let report = sample_report();

        let path = sink.save(&report).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));

        let md_path = dir.path().join("report_20250314_092653_589.md");
        let markdown = std::fs::read_to_string(&md_path).unwrap();
        assert_eq!(markdown, render_markdown(&report));
        assert!(markdown.starts_with("# Research report: AI in education"));
        assert!(markdown.contains("- **Sentiment:** positive"));

        // A second save at the same instant gets its own pair of files
        sink.save(&report).unwrap();
        assert!(dir.path().join("report_20250314_092653_589_1.md").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_markdown_off_by_default() {
        let dir = TempDir::new().unwrap();
        ReportSink::from_config(&ReportConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .save(&sample_report())
        .unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_keeps_non_ascii_readable() {
        let dir = TempDir::new().unwrap();
        let path = ReportSink::new(dir.path()).save(&sample_report()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("покращення"));
        assert!(!content.contains("\\u"));
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("reports").join("2025");
        let path = ReportSink::new(&nested).save(&sample_report()).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn test_save_into_a_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let result = ReportSink::new(&blocker).save(&sample_report());
        assert!(matches!(result, Err(ZetesisError::Io(_))));
    }

    #[test]
    fn test_save_records_history() {
        let dir = TempDir::new().unwrap();
        let history = dir.path().join("history.json");
        let config = ReportConfig {
            output_dir: dir.path().join("out"),
            render: false,
            markdown: false,
            history_file: Some(history.clone()),
        };

        let path = ReportSink::from_config(&config).save(&sample_report()).unwrap();

        let entries = HistoryJournal::new(&history).entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, path);
    }

    #[test]
    fn test_load_rejects_non_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(&path, r#"{"sessions": []}"#).unwrap();

        assert!(matches!(
            ReportSink::load(&path),
            Err(ZetesisError::Serialization(_))
        ));
    }
}
