//! Google Gemini provider.
//!
//! API reference: https://ai.google.dev/api/generate-content

use crate::client::{GenClient, GenerateRequest, Generation};
use crate::retry::with_backoff;
use crate::types::CloudConfig;
use promptdoc_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API request format.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "modelVersion", default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiPart>,
}

/// Gemini generation client.
///
/// Like the OpenAI client, this holds static configuration only; the
/// credential is resolved from the environment per call and every request
/// is an isolated value.
pub struct GeminiClient {
    config: CloudConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration.
    pub fn new(config: CloudConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn api_key(&self) -> AppResult<String> {
        std::env::var(&self.config.api_key_env).map_err(|_| {
            AppError::Configuration(format!(
                "Gemini provider requires the {} environment variable",
                self.config.api_key_env
            ))
        })
    }

    fn to_gemini_request(&self, request: &GenerateRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                max_output_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            },
        }
    }

    async fn call_once(
        &self,
        url: &str,
        body: &GeminiRequest,
    ) -> Result<GeminiResponse, String> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Failed to send request to Gemini: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("Gemini API error ({}): {}", status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))
    }
}

#[async_trait::async_trait]
impl GenClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<Generation> {
        let api_key = self.api_key()?;

        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let base = self
            .config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT);
        let url = format!("{}/models/{}:generateContent?key={}", base, model, api_key);
        let body = self.to_gemini_request(request);

        tracing::info!("Sending completion request to Gemini");
        let started = Instant::now();

        let response = with_backoff(self.config.retries, self.config.backoff_secs, |_| {
            self.call_once(&url, &body)
        })
        .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                AppError::Generation("Gemini response had no candidates".to_string())
            })?;

        let mut metadata = serde_json::Map::new();
        metadata.insert("provider".to_string(), json!("gemini"));
        metadata.insert(
            "model_version".to_string(),
            json!(response.model_version.unwrap_or_else(|| model.to_string())),
        );

        tracing::info!("Received completion from Gemini in {}ms", elapsed_ms);

        Ok(Generation {
            text,
            metadata,
            elapsed_ms,
        })
    }
}
