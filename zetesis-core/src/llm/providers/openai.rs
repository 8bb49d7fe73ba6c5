//! OpenAI-compatible chat-completions provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ZetesisError};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, ModelInfo, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI LLM provider (GPT-4, GPT-4o, and compatible APIs such as Groq).
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    provider_name: String,
    timeout: Option<Duration>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with its own HTTP client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name (e.g., "gpt-4o", "gpt-4-turbo")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, model, DEFAULT_BASE_URL)
    }

    /// Create a provider sharing an existing HTTP client.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `api_key` - API key sent as a bearer token
    /// * `model` - Model name
    /// * `base_url` - API root, e.g. `https://api.groq.com/openai/v1`
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            provider_name: "openai".to_string(),
            timeout: None,
        }
    }

    /// Name reported in [`ModelInfo`] (e.g. "groq" for a Groq endpoint)
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    /// Per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessageResponse>,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

fn convert_messages(messages: &[Message]) -> Vec<OpenAIMessage> {
    messages
        .iter()
        .map(|m| OpenAIMessage {
            role: match m.role {
                MessageRole::System => "system".to_string(),
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "assistant".to_string(),
            },
            content: m.content.clone(),
        })
        .collect()
}

fn parse_response(body: &str) -> Result<LLMResponse> {
    let openai_response: OpenAIResponse = serde_json::from_str(body)
        .map_err(|e| ZetesisError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

    let content = openai_response
        .choices
        .first()
        .ok_or_else(|| ZetesisError::Llm("OpenAI API returned no choices".to_string()))?
        .message
        .as_ref()
        .and_then(|m| m.content.clone())
        .unwrap_or_default();

    let usage = openai_response.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(LLMResponse { content, usage })
}

fn parse_error(status: reqwest::StatusCode, body: &str) -> ZetesisError {
    match serde_json::from_str::<OpenAIError>(body) {
        Ok(error) => ZetesisError::Llm(format!(
            "OpenAI API error ({}): {}",
            error.error.error_type.unwrap_or_else(|| status.to_string()),
            error.error.message
        )),
        Err(_) => ZetesisError::Llm(format!("OpenAI API error ({}): {}", status, body)),
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let openai_request = OpenAIRequest {
            model: self.model.clone(),
            messages: convert_messages(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "Sending completion request");

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            ZetesisError::Llm(format!("Failed to send request to {}: {}", self.provider_name, e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ZetesisError::Llm(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(parse_error(status, &text));
        }

        parse_response(&text)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.provider_name.clone(),
            model_name: self.model.clone(),
        }
    }
}
