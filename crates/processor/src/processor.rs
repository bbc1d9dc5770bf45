//! The document processor: store lookup, rendering, generation, audit.

use crate::audit::{AuditRecord, AuditSink};
use promptdoc_core::config::ProvidersConfig;
use promptdoc_core::{AppError, AppResult};
use promptdoc_llm::{create_client, GenerateRequest};
use promptdoc_store::PromptStore;
use promptdoc_template::Bindings;
use std::sync::Arc;

/// One document-processing request.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Caller identity
    pub user: String,

    /// Purpose to resolve the active prompt for
    pub purpose: String,

    /// Input document text
    pub document: String,

    /// Provider name (e.g., "mock", "openai", "gemini")
    pub provider: String,

    /// Open-ended parameters: optional `model`, `temperature`, `max_tokens`
    /// generation overrides
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ProcessRequest {
    /// Build a request with empty params.
    pub fn new(
        user: impl Into<String>,
        purpose: impl Into<String>,
        document: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            purpose: purpose.into(),
            document: document.into(),
            provider: provider.into(),
            params: serde_json::Map::new(),
        }
    }
}

/// The result of a successful run through the pipeline.
#[derive(Debug, Clone)]
pub struct ProcessResponse {
    /// Generated output text
    pub output_text: String,

    /// Provider metadata
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Id of the prompt that served the request
    pub prompt_id: String,

    /// Version of that prompt at resolution time
    pub prompt_version: u32,

    /// Generation latency in milliseconds
    pub latency_ms: u64,
}

/// Orchestrates one request through store, renderer, provider, and audit log.
///
/// Holds no per-request state; a single instance serves many concurrent
/// callers. Collaborators are injected at construction.
pub struct DocumentProcessor {
    store: Arc<dyn PromptStore>,
    audit: Arc<dyn AuditSink>,
    providers: ProvidersConfig,
}

impl DocumentProcessor {
    /// Create a processor over the given store and audit sink.
    pub fn new(
        store: Arc<dyn PromptStore>,
        audit: Arc<dyn AuditSink>,
        providers: ProvidersConfig,
    ) -> Self {
        Self {
            store,
            audit,
            providers,
        }
    }

    /// Process one document through the active prompt for (user, purpose).
    ///
    /// Exactly one audit record is written per successful run; none on any
    /// failure. Store, renderer, and provider errors propagate unchanged;
    /// there is no silent fallback to the mock provider.
    pub async fn process(&self, request: &ProcessRequest) -> AppResult<ProcessResponse> {
        // 1. Reject unknown providers before touching the store.
        let client = create_client(&request.provider, &self.providers)?;

        // 2. Resolve the active prompt.
        let prompt = self
            .store
            .get_active(&request.user, &request.purpose)?
            .ok_or_else(|| AppError::NoActivePrompt(request.purpose.clone()))?;

        tracing::info!(
            "Processing document for user '{}' purpose '{}' with prompt {} v{}",
            request.user,
            request.purpose,
            prompt.id,
            prompt.version
        );

        // 3. Render the template.
        let rendered =
            promptdoc_template::render(&prompt.template, &request.document, &Bindings::new())?;

        // 4. Generate.
        let gen_request = build_gen_request(rendered.clone(), &request.params);
        let generation = client.generate(&gen_request).await?;

        // 5. Audit is fire and forget; a failed append never fails the response.
        let record = AuditRecord {
            prompt_text: rendered,
            response_text: generation.text.clone(),
            user: request.user.clone(),
            purpose: request.purpose.clone(),
            provider: client.provider_name().to_string(),
            prompt_id: prompt.id.clone(),
            latency_ms: generation.elapsed_ms,
        };
        if let Err(e) = self.audit.append(&record) {
            tracing::warn!("Failed to append audit record: {}", e);
        }

        Ok(ProcessResponse {
            output_text: generation.text,
            metadata: generation.metadata,
            prompt_id: prompt.id,
            prompt_version: prompt.version,
            latency_ms: generation.elapsed_ms,
        })
    }
}

/// Apply the request's generation overrides onto the rendered prompt.
fn build_gen_request(
    prompt: String,
    params: &serde_json::Map<String, serde_json::Value>,
) -> GenerateRequest {
    let mut request = GenerateRequest::new(prompt);

    if let Some(model) = params.get("model").and_then(|v| v.as_str()) {
        request = request.with_model(model);
    }
    if let Some(temperature) = params.get("temperature").and_then(|v| v.as_f64()) {
        request = request.with_temperature(temperature as f32);
    }
    if let Some(max_tokens) = params.get("max_tokens").and_then(|v| v.as_u64()) {
        request = request.with_max_tokens(max_tokens as u32);
    }

    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use promptdoc_store::MemoryStore;
    use serde_json::json;

    fn processor() -> (Arc<MemoryStore>, Arc<MemoryAuditLog>, DocumentProcessor) {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(MemoryAuditLog::new());
        let processor = DocumentProcessor::new(
            Arc::clone(&store) as Arc<dyn PromptStore>,
            Arc::clone(&audit) as Arc<dyn AuditSink>,
            ProvidersConfig::default(),
        );
        (store, audit, processor)
    }

    #[tokio::test]
    async fn test_end_to_end_with_mock_provider() {
        let (store, audit, processor) = processor();

        let prompt = store
            .create("summarize", "Summary", "{document}", "u1")
            .unwrap();
        store.activate("u1", "summarize", &prompt.id).unwrap();

        let response = processor
            .process(&ProcessRequest::new("u1", "summarize", "hello", "mock"))
            .await
            .unwrap();

        assert!(response.output_text.contains("[MOCK OUTPUT]"));
        assert!(response.output_text.contains("hello"));
        assert_eq!(response.prompt_id, prompt.id);
        assert_eq!(response.prompt_version, 1);
        assert!(response.latency_ms > 0);

        // Exactly one audit record, carrying the rendered prompt
        assert_eq!(audit.len(), 1);
        let entry = &audit.recent(1, None, None).unwrap()[0];
        assert_eq!(entry.record.prompt_text, "hello");
        assert_eq!(entry.record.provider, "mock");
        assert_eq!(entry.record.prompt_id, prompt.id);
    }

    #[tokio::test]
    async fn test_rich_template_renders_before_generation() {
        let (store, audit, processor) = processor();

        let prompt = store
            .create("shout", "Shout", "{{ document | upper }}", "u1")
            .unwrap();
        store.activate("u1", "shout", &prompt.id).unwrap();

        let response = processor
            .process(&ProcessRequest::new("u1", "shout", "hello", "mock"))
            .await
            .unwrap();

        assert!(response.output_text.contains("HELLO"));
        assert_eq!(audit.recent(1, None, None).unwrap()[0].record.prompt_text, "HELLO");
    }

    #[tokio::test]
    async fn test_no_active_prompt_writes_no_audit_record() {
        let (_store, audit, processor) = processor();

        let err = processor
            .process(&ProcessRequest::new("u1", "summarize", "hello", "mock"))
            .await
            .unwrap_err();

        match err {
            AppError::NoActivePrompt(purpose) => assert_eq!(purpose, "summarize"),
            other => panic!("Expected NoActivePrompt, got {:?}", other),
        }
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected_before_store_lookup() {
        let (store, audit, processor) = processor();

        let prompt = store.create("summarize", "a", "{document}", "u1").unwrap();
        store.activate("u1", "summarize", &prompt.id).unwrap();

        let err = processor
            .process(&ProcessRequest::new("u1", "summarize", "hello", "ollama"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedProvider(_)));
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn test_template_syntax_error_propagates_without_audit() {
        let (store, audit, processor) = processor();

        let prompt = store.create("bad", "Bad", "{% if %}", "u1").unwrap();
        store.activate("u1", "bad", &prompt.id).unwrap();

        let err = processor
            .process(&ProcessRequest::new("u1", "bad", "hello", "mock"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TemplateSyntax(_)));
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_propagates_without_mock_fallback() {
        let (store, audit, processor) = processor();

        let prompt = store.create("summarize", "a", "{document}", "u1").unwrap();
        store.activate("u1", "summarize", &prompt.id).unwrap();

        // No OPENAI_API_KEY in the test environment
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }

        let err = processor
            .process(&ProcessRequest::new("u1", "summarize", "hello", "openai"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
        assert!(audit.is_empty());
    }

    #[test]
    fn test_params_map_onto_generation_overrides() {
        let mut params = serde_json::Map::new();
        params.insert("model".to_string(), json!("gpt-4o"));
        params.insert("temperature".to_string(), json!(0.3));
        params.insert("max_tokens".to_string(), json!(256));

        let request = build_gen_request("prompt".to_string(), &params);
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_concurrent_processing_is_isolated() {
        let (store, audit, processor) = processor();

        let prompt = store.create("echo", "Echo", "{document}", "u1").unwrap();
        store.activate("u1", "echo", &prompt.id).unwrap();

        let processor = Arc::new(processor);
        let mut handles = Vec::new();
        for i in 0..8 {
            let processor = Arc::clone(&processor);
            handles.push(tokio::spawn(async move {
                let doc = format!("document-{}", i);
                let response = processor
                    .process(&ProcessRequest::new("u1", "echo", doc.clone(), "mock"))
                    .await
                    .unwrap();
                (doc, response.output_text)
            }));
        }

        for handle in handles {
            let (doc, output) = handle.await.unwrap();
            // Each task's output reflects its own document, never another's
            assert!(output.contains(&doc));
        }
        assert_eq!(audit.len(), 8);
    }
}
