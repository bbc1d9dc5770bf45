//! OpenAI chat-completions provider.
//!
//! API reference: https://platform.openai.com/docs/api-reference/chat

use crate::client::{GenClient, GenerateRequest, Generation};
use crate::retry::with_backoff;
use crate::types::CloudConfig;
use promptdoc_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// OpenAI generation client.
///
/// Holds only static configuration and a connection pool. The API key is
/// read from the environment on each call, so a missing credential fails
/// that request fast without poisoning the client.
pub struct OpenAiClient {
    config: CloudConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new OpenAI client from configuration.
    pub fn new(config: CloudConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn api_key(&self) -> AppResult<String> {
        std::env::var(&self.config.api_key_env).map_err(|_| {
            AppError::Configuration(format!(
                "OpenAI provider requires the {} environment variable",
                self.config.api_key_env
            ))
        })
    }

    fn to_chat_request(&self, request: &GenerateRequest) -> ChatRequest {
        ChatRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        }
    }

    async fn call_once(&self, api_key: &str, body: &ChatRequest) -> Result<ChatResponse, String> {
        let url = self
            .config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Failed to send request to OpenAI: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("OpenAI API error ({}): {}", status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse OpenAI response: {}", e))
    }
}

#[async_trait::async_trait]
impl GenClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<Generation> {
        // Missing credential is a configuration error, not retried.
        let api_key = self.api_key()?;
        let body = self.to_chat_request(request);

        tracing::info!("Sending completion request to OpenAI");
        let started = Instant::now();

        let response = with_backoff(self.config.retries, self.config.backoff_secs, |_| {
            self.call_once(&api_key, &body)
        })
        .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Generation("OpenAI response had no choices".to_string()))?;

        let mut metadata = serde_json::Map::new();
        metadata.insert("provider".to_string(), json!("openai"));
        metadata.insert("model_version".to_string(), json!(response.model));
        if let Some(usage) = response.usage {
            metadata.insert(
                "usage".to_string(),
                json!({
                    "prompt_tokens": usage.prompt_tokens,
                    "completion_tokens": usage.completion_tokens,
                    "total_tokens": usage.total_tokens,
                }),
            );
        }

        tracing::info!("Received completion from OpenAI in {}ms", elapsed_ms);

        Ok(Generation {
            text,
            metadata,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CloudConfig {
        CloudConfig {
            api_key_env: "PROMPTDOC_TEST_MISSING_OPENAI_KEY".to_string(),
            ..CloudConfig::openai()
        }
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let client = OpenAiClient::new(test_config());
        let err = client
            .generate(&GenerateRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_request_conversion_uses_overrides() {
        let client = OpenAiClient::new(test_config());
        let request = GenerateRequest::new("Hello")
            .with_model("gpt-4o")
            .with_temperature(0.1)
            .with_max_tokens(64);

        let body = client.to_chat_request(&request);
        assert_eq!(body.model, "gpt-4o");
        assert_eq!(body.temperature, 0.1);
        assert_eq!(body.max_tokens, 64);
        assert_eq!(body.messages[0].content, "Hello");
    }

    #[test]
    fn test_request_conversion_falls_back_to_config() {
        let client = OpenAiClient::new(test_config());
        let body = client.to_chat_request(&GenerateRequest::new("Hello"));
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.temperature, 0.7);
        assert_eq!(body.max_tokens, 1024);
    }
}
