//! Factory for creating LLM providers from configuration

use std::sync::Arc;
use tracing::warn;

use crate::config::LLMProviderConfig;
use crate::llm::providers::OpenAIProvider;
use crate::llm::{LLMProvider, StubLLMProvider};

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration.
    ///
    /// Both supported providers speak the OpenAI chat-completions protocol,
    /// so they share [`OpenAIProvider`] with different base URLs. Without a
    /// credential a [`StubLLMProvider`] is returned, which reports itself as
    /// unconfigured; this is a degraded mode, not an error.
    pub fn create(config: &LLMProviderConfig, client: &reqwest::Client) -> Arc<dyn LLMProvider> {
        match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(api_key) => Arc::new(
                OpenAIProvider::with_client(
                    client.clone(),
                    api_key,
                    &config.model,
                    config.resolved_base_url(),
                )
                .with_provider_name(config.provider.as_str())
                .with_timeout(config.timeout),
            ),
            None => {
                warn!(
                    provider = config.provider.as_str(),
                    env = config.provider.credential_env(),
                    "No API key found, LLM features disabled"
                );
                Arc::new(StubLLMProvider)
            }
        }
    }
}
