//! Query source: web search with a canned fallback
//!
//! [`QuerySource::fetch`] never returns an empty list. Provider errors and
//! empty result sets are logged and replaced by [`fallback_snippets`], tagged
//! as [`Outcome::Fallback`] so the report can say so.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{SearchBackend, SearchConfig};
use crate::error::{Result, ZetesisError};
use crate::outcome::{FallbackReason, Outcome};

pub mod duckduckgo;
pub mod fixed;

pub use duckduckgo::DuckDuckGoSearch;
pub use fixed::StaticSearchProvider;

/// A short piece of retrieved text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Snippet {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            source_url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Concatenate snippet bodies the way the scorer and statistics see them
pub fn combined_text(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .map(|s| s.body.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Backend performing the actual search call
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search. Implementations must not retry.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>>;

    /// Short identifier recorded in report provenance
    fn name(&self) -> &str;
}

/// Snippets used whenever live search is unavailable
pub fn fallback_snippets() -> Vec<Snippet> {
    vec![
        Snippet::new(
            "AI в освіті: персоналізація навчання",
            "Адаптивні системи підлаштовують темп і зміст навчання під кожного студента, \
             що дає помітне покращення результатів.",
        )
        .with_url("https://example.com/ai-education"),
        Snippet::new(
            "Статистика 2025: 85% університетів використовують AI",
            "Дослідження показує, що 85% університетів уже застосовують інструменти \
             штучного інтелекту для автоматизації оцінювання та підтримки викладачів.",
        )
        .with_url("https://example.com/stats"),
    ]
}

/// Stage 1 of the pipeline
pub struct QuerySource {
    provider: Arc<dyn SearchProvider>,
}

impl std::fmt::Debug for QuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySource")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl QuerySource {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Build the configured backend around a shared HTTP client
    pub fn from_config(config: &SearchConfig, client: &reqwest::Client) -> Self {
        let provider: Arc<dyn SearchProvider> = match config.provider {
            SearchBackend::DuckDuckGo => {
                let search = DuckDuckGoSearch::new(client.clone(), config.timeout);
                match &config.base_url {
                    Some(url) => Arc::new(search.with_base_url(url)),
                    None => Arc::new(search),
                }
            }
            SearchBackend::Static => Arc::new(StaticSearchProvider::unavailable()),
        };

        Self::new(provider)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch up to `max_results` snippets for `topic`.
    ///
    /// # Errors
    ///
    /// Only for caller mistakes: a blank topic or `max_results == 0`.
    /// Search failures are absorbed into the fallback.
    pub async fn fetch(&self, topic: &str, max_results: usize) -> Result<Outcome<Vec<Snippet>>> {
        if topic.trim().is_empty() {
            return Err(ZetesisError::InvalidInput(
                "topic must not be empty".to_string(),
            ));
        }
        if max_results == 0 {
            return Err(ZetesisError::InvalidInput(
                "max_results must be at least 1".to_string(),
            ));
        }

        debug!(provider = self.provider.name(), topic, max_results, "Running search");

        match self.provider.search(topic, max_results).await {
            Ok(mut snippets) if !snippets.is_empty() => {
                snippets.truncate(max_results);
                info!(count = snippets.len(), "Search returned live results");
                Ok(Outcome::Live(snippets))
            }
            Ok(_) => {
                warn!(provider = self.provider.name(), "Search returned nothing, using fallback");
                Ok(Outcome::fallback(fallback_snippets(), FallbackReason::NoResults))
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Search failed, using fallback");
                Ok(Outcome::fallback(
                    fallback_snippets(),
                    FallbackReason::RequestFailed(e.to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Sentiment, TextScorer};

    fn snippets(n: usize) -> Vec<Snippet> {
        (0..n)
            .map(|i| Snippet::new(format!("title {}", i), format!("body {}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_live_results_are_truncated() {
        let source = QuerySource::new(Arc::new(StaticSearchProvider::with_results(snippets(5))));
        let outcome = source.fetch("rust", 3).await.unwrap();
        assert!(outcome.is_live());
        assert_eq!(outcome.value().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_yields_fallback() {
        let provider = Arc::new(StaticSearchProvider::unavailable());
        let source = QuerySource::new(provider.clone());

        let outcome = source.fetch("AI in education", 3).await.unwrap();
        assert!(!outcome.is_live());
        assert!(matches!(outcome.reason(), Some(FallbackReason::RequestFailed(_))));
        assert_eq!(outcome.value(), &fallback_snippets());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_results_yield_fallback() {
        let source = QuerySource::new(Arc::new(StaticSearchProvider::with_results(Vec::new())));
        let outcome = source.fetch("anything", 3).await.unwrap();
        assert_eq!(outcome.reason(), Some(&FallbackReason::NoResults));
        assert!(!outcome.value().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_is_never_empty() {
        let source = QuerySource::new(Arc::new(StaticSearchProvider::unavailable()));
        for topic in ["a", "AI in education", "Штучний інтелект в освіті 2025"] {
            let outcome = source.fetch(topic, 1).await.unwrap();
            assert!(!outcome.value().is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let provider = Arc::new(StaticSearchProvider::with_results(snippets(1)));
        let source = QuerySource::new(provider.clone());

        assert!(matches!(
            source.fetch("   ", 3).await,
            Err(ZetesisError::InvalidInput(_))
        ));
        assert!(matches!(
            source.fetch("rust", 0).await,
            Err(ZetesisError::InvalidInput(_))
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_fallback_snippets_score_positive() {
        let snippets = fallback_snippets();
        assert_eq!(snippets.len(), 2);

        let result = TextScorer::new().score(&combined_text(&snippets));
        assert_eq!(result.label, Sentiment::Positive);
        assert_eq!(result.positive_count, 1);
        assert_eq!(result.negative_count, 0);
    }

    #[test]
    fn test_snippet_serialization_skips_missing_url() {
        let json = serde_json::to_value(Snippet::new("t", "b")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "t", "body": "b"}));
    }
}
