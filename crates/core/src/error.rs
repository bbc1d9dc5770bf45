//! Error types for the promptdoc service.
//!
//! This module defines a unified error enum covering every failure category
//! in the application: storage, template rendering, generation providers,
//! configuration, and the domain-level signals (not-found, no-active-prompt,
//! activation mismatch).

use thiserror::Error;

/// Unified error type for the promptdoc service.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown prompt id, or an ownership mismatch on update/delete.
    ///
    /// Ownership failures are deliberately indistinguishable from a missing
    /// prompt: callers only ever see "not found".
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// No activation entry exists for a (user, purpose) pair.
    #[error("No active prompt for purpose '{0}'")]
    NoActivePrompt(String),

    /// Activation target missing, or its purpose differs from the requested one.
    #[error("Activation mismatch: {0}")]
    ActivationMismatch(String),

    /// Unknown generation provider name.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Missing credential or invalid application configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed rich-dialect template; a client-input error, never retried.
    #[error("Template syntax error: {0}")]
    TemplateSyntax(String),

    /// All retries against a generation provider exhausted.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Storage backend errors (snapshot file, SQLite).
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_hides_ownership() {
        let err = AppError::NotFound("abc123".to_string());
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(!msg.contains("owner"));
    }

    #[test]
    fn test_no_active_prompt_names_purpose() {
        let err = AppError::NoActivePrompt("summarize".to_string());
        assert!(err.to_string().contains("summarize"));
    }
}
