//! Generation client abstraction and request/response types.
//!
//! This module defines the core abstractions for dispatching rendered prompt
//! text to a text-generation backend.

use promptdoc_core::AppResult;
use serde::{Deserialize, Serialize};

/// A single generation request.
///
/// Requests are immutable values built per call; a provider never stores
/// them, which keeps concurrent calls on one shared client isolated from
/// each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The rendered prompt text to send to the backend
    pub prompt: String,

    /// Model override (provider default when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    /// Create a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Override the provider's default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The outcome of a generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    /// The generated text
    pub text: String,

    /// Provider metadata (provider name, model version, token usage, ...)
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Wall-clock time spent in the call, in milliseconds, for audit
    pub elapsed_ms: u64,
}

/// Trait for generation providers.
///
/// This trait abstracts the underlying backend (mock, OpenAI, Gemini) and
/// provides a unified interface for one-shot text generation. Implementations
/// must be safe to call from many concurrent tasks; any retry/backoff policy
/// lives inside `generate`.
#[async_trait::async_trait]
pub trait GenClient: Send + Sync {
    /// Get the provider name (e.g., "mock", "openai").
    fn provider_name(&self) -> &str;

    /// Perform one generation call.
    ///
    /// # Errors
    /// - `Configuration` when a required credential is missing (not retried)
    /// - `Generation` when all retry attempts are exhausted
    async fn generate(&self, request: &GenerateRequest) -> AppResult<Generation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = GenerateRequest::new("Hello")
            .with_model("gpt-4o")
            .with_temperature(0.2)
            .with_max_tokens(128);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(128));
    }

    #[test]
    fn test_request_defaults() {
        let request = GenerateRequest::new("Hello");
        assert!(request.model.is_none());
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }
}
