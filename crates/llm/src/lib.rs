//! Generation provider crate for the promptdoc service.
//!
//! This crate provides a provider-agnostic abstraction for turning rendered
//! prompt text into generated text. It supports multiple providers through a
//! unified trait-based interface.
//!
//! # Providers
//! - **mock**: deterministic offline provider (default)
//! - **openai**: OpenAI chat completions
//! - **gemini**: Google Gemini generateContent
//!
//! Providers hold only static configuration; all per-call state lives in the
//! request and response values, so one client instance is safe to share
//! across concurrent tasks.
//!
//! # Example
//! ```no_run
//! use promptdoc_llm::{GenClient, GenerateRequest, providers::MockClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MockClient::new();
//! let request = GenerateRequest::new("Hello, world!");
//! let generation = client.generate(&request).await?;
//! println!("{}", generation.text);
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod client;
pub mod factory;
pub mod providers;
pub mod retry;
pub mod types;

// Re-export main types
pub use client::{GenClient, GenerateRequest, Generation};
pub use factory::create_client;
pub use providers::MockClient;
pub use types::{CloudConfig, ProviderKind};
