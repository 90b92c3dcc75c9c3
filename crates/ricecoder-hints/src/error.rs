//! Error types for the hints system
//!
//! Only two failure paths ever reach a caller of the dispatcher:
//!
//! 1. **Synchronous provider faults** propagate unchanged to whoever triggered
//!    the completion. They are fatal to that one attempt and never retried.
//!
//! 2. **Runtime errors** occur when an asynchronous provider is triggered with no
//!    tokio runtime available to drive its deferred result.
//!
//! Asynchronous provider faults never surface as a `HintError` at the trigger
//! site: the host has no channel for them, so the dispatcher delivers "no
//! completions" instead. Missing providers and malformed options are not errors
//! at all.

use thiserror::Error;

/// Errors that can occur in the hints system
#[derive(Debug, Error)]
pub enum HintError {
    /// A provider failed while computing completions
    #[error("Provider failed: {0}")]
    ProviderFailed(String),

    /// An asynchronous provider was triggered outside a tokio runtime
    #[error("No async runtime available to drive a deferred provider")]
    RuntimeUnavailable,

    /// Invalid hints configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl HintError {
    /// Build a provider fault from any displayable error
    pub fn provider(err: impl std::fmt::Display) -> Self {
        HintError::ProviderFailed(err.to_string())
    }
}

pub type HintResult<T> = std::result::Result<T, HintError>;
