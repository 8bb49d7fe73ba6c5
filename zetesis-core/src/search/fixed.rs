//! Offline search provider returning predetermined results

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{SearchProvider, Snippet};
use crate::error::{Result, ZetesisError};

/// Search provider that never touches the network.
///
/// Either always returns the same snippets or always fails, which makes
/// both query-source paths reachable without a live endpoint. The number
/// of calls is tracked so callers can assert on it.
#[derive(Debug)]
pub struct StaticSearchProvider {
    results: Option<Vec<Snippet>>,
    calls: AtomicUsize,
}

impl StaticSearchProvider {
    /// Provider answering every query with `results`
    pub fn with_results(results: Vec<Snippet>) -> Self {
        Self {
            results: Some(results),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider failing every query
    pub fn unavailable() -> Self {
        Self {
            results: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of searches issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<Snippet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.results {
            Some(results) => Ok(results.iter().take(max_results).cloned().collect()),
            None => Err(ZetesisError::Search(
                "static search provider has no live results".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_calls() {
        let provider = StaticSearchProvider::with_results(vec![Snippet::new("a", "b")]);
        assert_eq!(provider.calls(), 0);
        provider.search("q", 5).await.unwrap();
        provider.search("q", 5).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_errors() {
        let provider = StaticSearchProvider::unavailable();
        let err = provider.search("q", 5).await.unwrap_err();
        assert!(matches!(err, ZetesisError::Search(_)));
    }
}
