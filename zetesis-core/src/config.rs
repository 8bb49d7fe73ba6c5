//! Configuration types for the research pipeline
//!
//! Sources are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `zetesis.toml` in the working directory
//! 3. An explicit file (`--config` or `ZETESIS_CONFIG_PATH`)
//! 4. `ZETESIS_*` environment variables, `__` separating sections
//!    (`ZETESIS_LLM__MODEL=gpt-4o-mini` sets `llm.model`)
//!
//! The LLM credential is never required. When neither the file nor the
//! `ZETESIS_LLM__API_KEY` variable provide one, the provider's conventional
//! variable (`OPENAI_API_KEY`, `GROQ_API_KEY`) is consulted.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ZetesisError};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "zetesis.toml";

/// Environment variable naming an extra config file
pub const CONFIG_PATH_ENV: &str = "ZETESIS_CONFIG_PATH";

/// Main configuration for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ZetesisConfig {
    /// Query source configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Completion provider configuration
    #[serde(default)]
    pub llm: LLMProviderConfig,

    /// Insight stage configuration
    #[serde(default)]
    pub insight: InsightConfig,

    /// Report sink configuration
    #[serde(default)]
    pub report: ReportConfig,
}

/// Search backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// DuckDuckGo HTML endpoint
    DuckDuckGo,
    /// Canned snippets only, never touches the network
    Static,
}

impl SearchBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBackend::DuckDuckGo => "duckduckgo",
            SearchBackend::Static => "static",
        }
    }
}

/// Query source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Backend used for live search
    pub provider: SearchBackend,

    /// Number of snippets requested (small, typically 3-5)
    pub max_results: usize,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Override for the search endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchBackend::DuckDuckGo,
            max_results: 3,
            timeout: Duration::from_secs(10),
            base_url: None,
        }
    }
}

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Groq,
}

impl LLMProvider {
    /// Conventional environment variable holding the credential
    pub fn credential_env(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "OPENAI_API_KEY",
            LLMProvider::Groq => "GROQ_API_KEY",
        }
    }

    /// Default OpenAI-compatible API root
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "openai",
            LLMProvider::Groq => "groq",
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMProviderConfig {
    /// Provider type
    pub provider: LLMProvider,

    /// Model name
    pub model: String,

    /// API key (prefer env vars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL (for Azure or other compatible endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,

    /// Completion token budget
    pub max_tokens: usize,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Upper bound on snippet text embedded in the prompt, in characters
    pub prompt_char_limit: usize,
}

impl Default for LLMProviderConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            model: "gpt-4".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(30),
            prompt_char_limit: 2000,
        }
    }
}

impl LLMProviderConfig {
    /// Whether a non-empty credential is available
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Base URL, falling back to the provider default
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Credential with everything but the first and last few characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        let key = self.api_key.as_deref()?;
        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 11 {
            return Some("*".repeat(chars.len()));
        }
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{}...{}", head, tail))
    }
}

/// Insight stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Run the insight stage at all
    pub enabled: bool,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Report sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving `report_*.json` files
    pub output_dir: PathBuf,

    /// Print the formatted report after saving
    pub render: bool,

    /// Also write a `report_*.md` file next to the JSON
    #[serde(default)]
    pub markdown: bool,

    /// Optional JSON journal listing every saved report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            render: true,
            markdown: false,
            history_file: None,
        }
    }
}

impl ZetesisConfig {
    /// Build the provider chain.
    ///
    /// `explicit` is layered above `zetesis.toml` and `ZETESIS_CONFIG_PATH`
    /// but below environment variables. `OPENAI_MODEL` and `OPENAI_BASE_URL`
    /// are honoured, with `ZETESIS_LLM__*` taking precedence over them.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE));

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(
                Env::raw()
                    .only(&["OPENAI_MODEL", "OPENAI_BASE_URL"])
                    .map(|key| {
                        if key.as_str().eq_ignore_ascii_case("OPENAI_MODEL") {
                            "llm.model".into()
                        } else {
                            "llm.base_url".into()
                        }
                    }),
            )
            .merge(Env::prefixed("ZETESIS_").split("__"))
    }

    /// Load configuration from files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is malformed or a value is
    /// out of range.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional explicit file on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file does not exist, a file is
    /// malformed, or a value is out of range.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ZetesisError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }

        let mut config: ZetesisConfig = Self::figment(explicit).extract().map_err(|e| {
            ZetesisError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.apply_credential_fallback();
        config.validate()?;
        Ok(config)
    }

    /// Fill a missing credential from the provider's conventional variable.
    fn apply_credential_fallback(&mut self) {
        if self.llm.has_credential() {
            return;
        }

        self.llm.api_key = std::env::var(self.llm.provider.credential_env())
            .ok()
            .filter(|k| !k.trim().is_empty());
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ZetesisError::Configuration(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.max_tokens == 0 {
            return Err(ZetesisError::Configuration(
                "llm.max_tokens must be positive".to_string(),
            ));
        }

        if self.llm.prompt_char_limit == 0 {
            return Err(ZetesisError::Configuration(
                "llm.prompt_char_limit must be positive".to_string(),
            ));
        }

        if self.search.max_results == 0 {
            return Err(ZetesisError::Configuration(
                "search.max_results must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let config = ZetesisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert!(config.insight.enabled);
        assert!(config.report.render);
        assert!(!config.report.markdown);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "zetesis.toml",
                r#"
                [search]
                provider = "static"
                max_results = 5
                timeout = "2s"

                [llm]
                provider = "groq"
                model = "llama-3.3-70b-versatile"
                api_key = "gsk-from-file"
                temperature = 0.2
                max_tokens = 256
                timeout = "15s"
                prompt_char_limit = 800
                "#,
            )?;

            let config = ZetesisConfig::load().expect("config loads");
            assert_eq!(config.search.provider, SearchBackend::Static);
            assert_eq!(config.search.max_results, 5);
            assert_eq!(config.search.timeout, Duration::from_secs(2));
            assert_eq!(config.llm.provider, LLMProvider::Groq);
            assert_eq!(config.llm.api_key.as_deref(), Some("gsk-from-file"));
            assert_eq!(config.llm.resolved_base_url(), "https://api.groq.com/openai/v1");
            assert_eq!(config.llm.prompt_char_limit, 800);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file("zetesis.toml", "[llm]\nmodel = \"from-file\"\n")?;
            jail.set_env("ZETESIS_LLM__MODEL", "from-env");
            jail.set_env("ZETESIS_REPORT__OUTPUT_DIR", "reports");
            jail.set_env("ZETESIS_REPORT__MARKDOWN", "true");

            let config = ZetesisConfig::load().expect("config loads");
            assert_eq!(config.llm.model, "from-env");
            assert_eq!(config.report.output_dir, PathBuf::from("reports"));
            assert!(config.report.markdown);
            Ok(())
        });
    }

    #[test]
    fn test_provider_credential_fallback() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENAI_API_KEY", "sk-test-credential-1234");

            let config = ZetesisConfig::load().expect("config loads");
            assert!(config.llm.has_credential());
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-test-credential-1234"));
            Ok(())
        });
    }

    #[test]
    fn test_openai_model_variables() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENAI_MODEL", "gpt-4o-mini");
            jail.set_env("OPENAI_BASE_URL", "http://localhost:8080/v1");

            let config = ZetesisConfig::load().expect("config loads");
            assert_eq!(config.llm.model, "gpt-4o-mini");
            assert_eq!(config.llm.resolved_base_url(), "http://localhost:8080/v1");

            jail.set_env("ZETESIS_LLM__MODEL", "gpt-4-turbo");
            let config = ZetesisConfig::load().expect("config loads");
            assert_eq!(config.llm.model, "gpt-4-turbo");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_layer() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[report]\nrender = false\n")?;

            let config =
                ZetesisConfig::load_from(Some(Path::new("custom.toml"))).expect("config loads");
            assert!(!config.report.render);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let result = ZetesisConfig::load_from(Some(Path::new("nope.toml")));
            assert!(matches!(result, Err(ZetesisError::Configuration(_))));
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let mut config = ZetesisConfig::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = ZetesisConfig::default();
        config.llm.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = ZetesisConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_api_key() {
        let mut llm = LLMProviderConfig::default();
        assert_eq!(llm.masked_api_key(), None);

        llm.api_key = Some("sk-abcdefghijklmnop".to_string());
        assert_eq!(llm.masked_api_key().as_deref(), Some("sk-abcd...mnop"));

        llm.api_key = Some("short".to_string());
        assert_eq!(llm.masked_api_key().as_deref(), Some("*****"));
    }
}
