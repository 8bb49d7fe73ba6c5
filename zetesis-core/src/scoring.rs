//! Keyword sentiment scoring
//!
//! Counts how many keywords from fixed positive and negative sets appear in
//! a text. Matching is Unicode-lowercased substring containment: each keyword
//! contributes at most one point, and `позитив` also matches `позитивний`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ZetesisError};

/// Positive markers, Ukrainian then English
pub const POSITIVE_KEYWORDS: &[&str] = &[
    "успіх",
    "покращення",
    "інновація",
    "прогрес",
    "добре",
    "чудово",
    "позитив",
    "ефективність",
    "success",
    "improvement",
    "innovation",
    "progress",
    "good",
    "great",
];

/// Negative markers, Ukrainian then English
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "проблема",
    "виклик",
    "ризик",
    "загроза",
    "погано",
    "негатив",
    "складність",
    "problem",
    "challenge",
    "risk",
    "threat",
    "bad",
];

/// Sentiment label derived from keyword counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Outcome of scoring one text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub label: Sentiment,
    pub positive_count: usize,
    pub negative_count: usize,
}

impl ScoreResult {
    /// Build a result, deriving the label from the counts. Ties are neutral.
    pub fn from_counts(positive_count: usize, negative_count: usize) -> Self {
        let label = match positive_count.cmp(&negative_count) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        };

        Self {
            label,
            positive_count,
            negative_count,
        }
    }

    /// Share of markers agreeing with the label, 0.0 when nothing matched
    pub fn confidence(&self) -> f64 {
        let total = self.positive_count + self.negative_count;
        if total == 0 {
            return 0.0;
        }
        self.positive_count.abs_diff(self.negative_count) as f64 / total as f64
    }
}

/// Scores text against a pair of keyword sets
#[derive(Debug, Clone)]
pub struct TextScorer {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for TextScorer {
    fn default() -> Self {
        Self::with_keywords(POSITIVE_KEYWORDS, NEGATIVE_KEYWORDS)
    }
}

impl TextScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer over custom keyword sets. Keywords are lowercased once here.
    pub fn with_keywords(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|k| k.to_lowercase()).collect(),
            negative: negative.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn score(&self, text: &str) -> ScoreResult {
        let lowered = text.to_lowercase();
        let count = |keywords: &[String]| {
            keywords
                .iter()
                .filter(|k| lowered.contains(k.as_str()))
                .count()
        };

        ScoreResult::from_counts(count(&self.positive), count(&self.negative))
    }

    /// Score raw bytes, rejecting anything that is not UTF-8 text.
    pub fn score_bytes(&self, bytes: &[u8]) -> Result<ScoreResult> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ZetesisError::InvalidInput(format!("text to score is not valid UTF-8: {}", e))
        })?;
        Ok(self.score(text))
    }
}

/// Simple size statistics over the scored text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            sentence_count: text
                .split(['.', '!', '?'])
                .filter(|s| !s.trim().is_empty())
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let result = TextScorer::new().score("");
        assert_eq!(result, ScoreResult::from_counts(0, 0));
        assert_eq!(result.label, Sentiment::Neutral);
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        let scorer = TextScorer::new();
        let upper = scorer.score("SUCCESS");
        let lower = scorer.score("success");
        assert_eq!(upper, lower);
        assert_eq!(upper.label, Sentiment::Positive);
        assert_eq!(upper.positive_count, 1);

        assert_eq!(scorer.score("ПОКРАЩЕННЯ"), scorer.score("покращення"));
    }

    #[test]
    fn test_containment_counts_each_keyword_once() {
        let scorer = TextScorer::new();
        let result = scorer.score("risk, risk and more risk");
        assert_eq!(result.negative_count, 1);
        assert_eq!(result.label, Sentiment::Negative);
    }

    #[test]
    fn test_substring_matching() {
        // "позитив" is contained in "позитивний"
        let result = TextScorer::new().score("позитивний досвід");
        assert_eq!(result.positive_count, 1);
    }

    #[test]
    fn test_tie_is_neutral() {
        let result = TextScorer::new().score("great progress despite the risk and a problem");
        assert_eq!(result.positive_count, 2);
        assert_eq!(result.negative_count, 2);
        assert_eq!(result.label, Sentiment::Neutral);
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn test_confidence() {
        let result = ScoreResult::from_counts(3, 1);
        assert_eq!(result.label, Sentiment::Positive);
        assert!((result.confidence() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_bytes_rejects_non_text() {
        let scorer = TextScorer::new();
        assert!(matches!(
            scorer.score_bytes(&[0xff, 0xfe, 0x00]),
            Err(ZetesisError::InvalidInput(_))
        ));
        assert_eq!(
            scorer.score_bytes("good".as_bytes()).unwrap().label,
            Sentiment::Positive
        );
    }

    #[test]
    fn test_custom_keywords() {
        let scorer = TextScorer::with_keywords(&["Rust"], &["segfault"]);
        assert_eq!(scorer.score("rust rocks").label, Sentiment::Positive);
        assert_eq!(scorer.score("a SEGFAULT").label, Sentiment::Negative);
    }

    #[test]
    fn test_text_stats() {
        let stats = TextStats::from_text("One two three. Four five! Six?  ");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.sentence_count, 3);
        assert_eq!(TextStats::from_text(""), TextStats::default());
    }

    #[test]
    fn test_score_serialization() {
        let json = serde_json::to_value(ScoreResult::from_counts(1, 0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"label": "positive", "positive_count": 1, "negative_count": 0})
        );
    }
}
