//! Error types for Zetesis operations

/// Result type for Zetesis operations
pub type Result<T> = std::result::Result<T, ZetesisError>;

/// Error types for the research pipeline.
///
/// Search and LLM errors are produced by providers and absorbed into
/// fallbacks by the components that call them; the rest end a run.
#[derive(Debug, thiserror::Error)]
pub enum ZetesisError {
    /// Caller passed something the pipeline cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Web search provider failed
    #[error("Search error: {0}")]
    Search(String),

    /// Completion provider failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
