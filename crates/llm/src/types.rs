//! Provider configuration types.

use promptdoc_core::config::ProviderOverrides;
use serde::{Deserialize, Serialize};

/// The closed set of generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Parse a provider kind from string.
    ///
    /// Returns `None` for unknown names; callers surface that as the
    /// unsupported-provider error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "openai" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

/// Static configuration for a cloud provider.
///
/// The credential itself is never stored here: only the name of the
/// environment variable it is read from, lazily, on each call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Additional attempts after the first failure
    pub retries: u32,

    /// Exponential backoff base in seconds (`backoff * 2^attempt`)
    pub backoff_secs: f64,

    /// Custom endpoint override
    pub endpoint: Option<String>,

    /// Environment variable holding the API credential
    pub api_key_env: String,
}

impl CloudConfig {
    /// Default OpenAI configuration.
    pub fn openai() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            retries: 3,
            backoff_secs: 0.5,
            endpoint: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }

    /// Default Gemini configuration.
    pub fn gemini() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            retries: 3,
            backoff_secs: 0.5,
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }

    /// Apply configuration-file overrides on top of the defaults.
    pub fn merged(mut self, overrides: &ProviderOverrides) -> Self {
        if let Some(ref model) = overrides.model {
            self.model = model.clone();
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(retries) = overrides.retries {
            self.retries = retries;
        }
        if let Some(backoff) = overrides.backoff {
            self.backoff_secs = backoff;
        }
        if let Some(ref endpoint) = overrides.endpoint {
            self.endpoint = Some(endpoint.clone());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!(ProviderKind::parse("mock"), Some(ProviderKind::Mock));
        assert_eq!(ProviderKind::parse("openai"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("gemini"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("google"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("ollama"), None);
    }

    #[test]
    fn test_cloud_config_defaults() {
        let config = CloudConfig::openai();
        assert_eq!(config.retries, 3);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");

        let config = CloudConfig::gemini();
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_cloud_config_merge() {
        let overrides = ProviderOverrides {
            model: Some("gpt-4o".to_string()),
            temperature: None,
            max_tokens: Some(256),
            retries: Some(1),
            backoff: None,
            endpoint: None,
        };
        let config = CloudConfig::openai().merged(&overrides);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.retries, 1);
        // Untouched fields keep their defaults
        assert_eq!(config.temperature, 0.7);
    }
}
