//! Insight generation: one completion request over the collected snippets
//!
//! The generator never fails. A missing credential, a transport error or an
//! empty answer all produce [`FALLBACK_INSIGHT`] tagged with the reason.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::LLMProviderConfig;
use crate::llm::{LLMProvider, LLMProviderFactory, LLMRequest, ModelInfo};
use crate::outcome::{FallbackReason, Outcome};
use crate::search::Snippet;

/// Paragraph returned whenever no live insight is available
pub const FALLBACK_INSIGHT: &str = "AI суттєво змінює освіту: адаптивні платформи \
персоналізують навчання, автоматизоване оцінювання звільняє час викладачів, а \
більшість університетів уже впроваджує такі інструменти. Варто стежити за якістю \
даних і прозорістю алгоритмів, щоб ефект залишався позитивним.";

const SYSTEM_PROMPT: &str = "You are a professional research analyst. Analyze the \
provided search results and write a short, evidence-based commentary on the topic. \
Focus on actionable insights.";

/// Stage 3 of the pipeline
pub struct InsightGenerator {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    prompt_char_limit: usize,
}

impl std::fmt::Debug for InsightGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightGenerator")
            .field("provider", &self.provider.model_info().provider)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt_char_limit", &self.prompt_char_limit)
            .finish()
    }
}

impl InsightGenerator {
    /// Wrap a provider using the default generation settings
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let defaults = LLMProviderConfig::default();
        Self {
            provider,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            prompt_char_limit: defaults.prompt_char_limit,
        }
    }

    /// Build the configured provider around a shared HTTP client
    pub fn from_config(config: &LLMProviderConfig, client: &reqwest::Client) -> Self {
        Self::new(LLMProviderFactory::create(config, client))
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_prompt_char_limit(config.prompt_char_limit)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_prompt_char_limit(mut self, limit: usize) -> Self {
        self.prompt_char_limit = limit;
        self
    }

    pub fn model_info(&self) -> ModelInfo {
        self.provider.model_info()
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Ask the provider for commentary on `topic`.
    pub async fn generate(&self, topic: &str, snippets: &[Snippet]) -> Outcome<String> {
        if !self.provider.is_configured() {
            warn!("No LLM credential configured, using canned insight");
            return Outcome::fallback(
                FALLBACK_INSIGHT.to_string(),
                FallbackReason::MissingCredential,
            );
        }

        let prompt = build_prompt(topic, snippets, self.prompt_char_limit);
        debug!(chars = prompt.chars().count(), "Built insight prompt");

        let request = LLMRequest::with_system_prompt(SYSTEM_PROMPT, prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        match self.provider.generate_request(&request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                if let Some(usage) = &response.usage {
                    debug!(total_tokens = usage.total_tokens, "Insight token usage");
                }
                info!("Generated live insight");
                Outcome::Live(response.content.trim().to_string())
            }
            Ok(_) => {
                warn!("LLM returned an empty response, using canned insight");
                Outcome::fallback(FALLBACK_INSIGHT.to_string(), FallbackReason::EmptyResponse)
            }
            Err(e) => {
                warn!(error = %e, "Insight request failed, using canned insight");
                Outcome::fallback(
                    FALLBACK_INSIGHT.to_string(),
                    FallbackReason::RequestFailed(e.to_string()),
                )
            }
        }
    }
}

/// User prompt: the topic plus one `- title: body` line per snippet.
///
/// The snippet data is cut to `char_limit` characters on a char boundary.
pub fn build_prompt(topic: &str, snippets: &[Snippet], char_limit: usize) -> String {
    let data = snippets
        .iter()
        .map(|s| format!("- {}: {}", s.title, s.body))
        .collect::<Vec<_>>()
        .join("\n");

    let data = match data.char_indices().nth(char_limit) {
        Some((byte_index, _)) => &data[..byte_index],
        None => data.as_str(),
    };

    format!("Topic: {}\n\nData:\n{}\n\nProvide a detailed analysis.", topic, data)
}
