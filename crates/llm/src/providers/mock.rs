//! Deterministic mock provider for testing and offline operation.

use crate::client::{GenClient, GenerateRequest, Generation};
use promptdoc_core::AppResult;
use serde_json::json;

/// Marker prefixed to every mock response.
pub const MOCK_MARKER: &str = "[MOCK OUTPUT]";

/// Number of prompt characters echoed back.
const ECHO_LIMIT: usize = 200;

/// Fabricated latency reported by the mock, in milliseconds.
const MOCK_LATENCY_MS: u64 = 100;

/// Mock generation client.
///
/// Echoes a truncated copy of the prompt with a fixed marker and a fixed
/// fabricated latency. Never fails, never touches the network.
#[derive(Debug, Default)]
pub struct MockClient;

impl MockClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl GenClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<Generation> {
        tracing::debug!("Mock generation for {} byte prompt", request.prompt.len());

        // Truncate on character boundaries, not bytes.
        let head: String = request.prompt.chars().take(ECHO_LIMIT).collect();

        let mut metadata = serde_json::Map::new();
        metadata.insert("provider".to_string(), json!("mock"));
        metadata.insert("model_version".to_string(), json!("1.0-mock"));

        Ok(Generation {
            text: format!("{}\n{} ...", MOCK_MARKER, head),
            metadata,
            elapsed_ms: MOCK_LATENCY_MS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_truncated_prompt() {
        let client = MockClient::new();
        let long_prompt = "x".repeat(500);
        let generation = client
            .generate(&GenerateRequest::new(long_prompt))
            .await
            .unwrap();

        assert!(generation.text.starts_with(MOCK_MARKER));
        // Marker line + 200 echoed chars + " ..."
        assert_eq!(
            generation.text.len(),
            MOCK_MARKER.len() + 1 + ECHO_LIMIT + 4
        );
        assert_eq!(generation.elapsed_ms, MOCK_LATENCY_MS);
    }

    #[tokio::test]
    async fn test_mock_deterministic() {
        let client = MockClient::new();
        let request = GenerateRequest::new("hello");
        let a = client.generate(&request).await.unwrap();
        let b = client.generate(&request).await.unwrap();
        assert_eq!(a.text, b.text);
        assert_eq!(a.metadata, b.metadata);
    }

    #[tokio::test]
    async fn test_mock_multibyte_prompt() {
        let client = MockClient::new();
        let request = GenerateRequest::new("é".repeat(300));
        let generation = client.generate(&request).await.unwrap();
        assert!(generation.text.contains(&"é".repeat(200)));
    }

    #[tokio::test]
    async fn test_mock_metadata() {
        let client = MockClient::new();
        let generation = client
            .generate(&GenerateRequest::new("hi"))
            .await
            .unwrap();
        assert_eq!(generation.metadata["provider"], "mock");
        assert_eq!(generation.metadata["model_version"], "1.0-mock");
    }
}
