//! Process command handler: run a document through the pipeline.

use clap::Args;
use promptdoc_core::config::AppConfig;
use promptdoc_core::{AppError, AppResult};
use promptdoc_processor::{DocumentProcessor, ProcessRequest};
use std::io::Read;
use std::path::PathBuf;

/// Run a document through the active prompt for a purpose
#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// Purpose to resolve the active prompt for
    #[arg(long)]
    pub purpose: String,

    /// Document text (inline)
    #[arg(long, conflicts_with = "file")]
    pub document: Option<String>,

    /// Read document text from a file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Extra generation parameters as a JSON object
    /// (e.g. '{"temperature": 0.2, "max_tokens": 256}')
    #[arg(long)]
    pub params: Option<String>,

    /// Output the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessCommand {
    /// Execute the process command.
    pub async fn execute(
        &self,
        processor: &DocumentProcessor,
        config: &AppConfig,
        user: &str,
    ) -> AppResult<()> {
        let document = self.read_document()?;

        let params = match &self.params {
            Some(raw) => {
                let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                    AppError::Configuration(format!("Invalid --params JSON: {}", e))
                })?;
                value
                    .as_object()
                    .cloned()
                    .ok_or_else(|| {
                        AppError::Configuration("--params must be a JSON object".to_string())
                    })?
            }
            None => serde_json::Map::new(),
        };

        let mut request = ProcessRequest::new(
            user,
            &self.purpose,
            document,
            &config.providers.default_provider,
        );
        request.params = params;

        let response = processor.process(&request).await?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "output_text": response.output_text,
                    "metadata": response.metadata,
                    "prompt_id": response.prompt_id,
                    "prompt_version": response.prompt_version,
                    "latency_ms": response.latency_ms,
                }))?
            );
        } else {
            println!("{}", response.output_text);
            eprintln!(
                "(prompt {} v{}, {}ms)",
                response.prompt_id, response.prompt_version, response.latency_ms
            );
        }

        Ok(())
    }

    fn read_document(&self) -> AppResult<String> {
        match (&self.document, &self.file) {
            (Some(document), None) => Ok(document.clone()),
            (None, Some(path)) if path.as_os_str() == "-" => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                AppError::Configuration(format!("Failed to read document {:?}: {}", path, e))
            }),
            _ => Err(AppError::Configuration(
                "Provide exactly one of --document or --file".to_string(),
            )),
        }
    }
}
