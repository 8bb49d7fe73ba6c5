//! Live-or-fallback results for components backed by external services

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a component substituted canned data for a live result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No credential configured; the service was never contacted
    MissingCredential,
    /// The request was made and failed
    RequestFailed(String),
    /// The service answered with nothing usable
    EmptyResponse,
    /// Search completed but produced no results
    NoResults,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredential => write!(f, "no credential configured"),
            FallbackReason::RequestFailed(message) => write!(f, "request failed: {}", message),
            FallbackReason::EmptyResponse => write!(f, "empty response"),
            FallbackReason::NoResults => write!(f, "no results"),
        }
    }
}

/// Result of a component that degrades instead of failing
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Produced by the live service
    Live(T),
    /// Canned value substituted for the live one
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Outcome<T> {
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Outcome::Fallback { value, reason }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Outcome::Live(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Live(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Live(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Outcome::Live(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn mode(&self) -> SourceMode {
        match self {
            Outcome::Live(_) => SourceMode::Live,
            Outcome::Fallback { .. } => SourceMode::Fallback,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Live(value) => Outcome::Live(f(value)),
            Outcome::Fallback { value, reason } => Outcome::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

/// Where a piece of report data came from, as recorded in the JSON file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Live,
    #[default]
    Fallback,
    /// Stage disabled in configuration
    Skipped,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Live => write!(f, "live"),
            SourceMode::Fallback => write!(f, "fallback"),
            SourceMode::Skipped => write!(f, "skipped"),
        }
    }
}
