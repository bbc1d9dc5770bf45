//! Generation client factory.
//!
//! This module creates provider clients from a provider name plus the
//! application's provider configuration. The provider set is closed: an
//! unknown name is rejected up front, before any prompt is resolved.

use crate::client::GenClient;
use crate::providers::{GeminiClient, MockClient, OpenAiClient};
use crate::types::{CloudConfig, ProviderKind};
use promptdoc_core::config::ProvidersConfig;
use promptdoc_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client for the named provider.
///
/// Configuration-file overrides are merged onto the provider's built-in
/// defaults. Credentials are not checked here; cloud providers resolve
/// them lazily on first use.
///
/// # Errors
/// Returns [`AppError::UnsupportedProvider`] for unknown provider names.
pub fn create_client(name: &str, providers: &ProvidersConfig) -> AppResult<Arc<dyn GenClient>> {
    let kind = ProviderKind::parse(name)
        .ok_or_else(|| AppError::UnsupportedProvider(name.to_string()))?;

    match kind {
        ProviderKind::Mock => Ok(Arc::new(MockClient::new())),
        ProviderKind::OpenAi => {
            let config = CloudConfig::openai().merged(&providers.openai);
            Ok(Arc::new(OpenAiClient::new(config)))
        }
        ProviderKind::Gemini => {
            let config = CloudConfig::gemini().merged(&providers.gemini);
            Ok(Arc::new(GeminiClient::new(config)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_client() {
        let client = create_client("mock", &ProvidersConfig::default()).unwrap();
        assert_eq!(client.provider_name(), "mock");
    }

    #[test]
    fn test_create_cloud_clients() {
        let providers = ProvidersConfig::default();
        assert_eq!(
            create_client("openai", &providers).unwrap().provider_name(),
            "openai"
        );
        assert_eq!(
            create_client("gemini", &providers).unwrap().provider_name(),
            "gemini"
        );
        // Credential absence must not fail client creation
        assert_eq!(
            create_client("google", &providers).unwrap().provider_name(),
            "gemini"
        );
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("ollama", &ProvidersConfig::default()) {
            Err(AppError::UnsupportedProvider(name)) => assert_eq!(name, "ollama"),
            other => panic!("Expected UnsupportedProvider, got {:?}", other.map(|_| ())),
        }
    }
}
