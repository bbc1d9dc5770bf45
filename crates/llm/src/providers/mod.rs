//! Generation provider implementations.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiClient;
pub use mock::MockClient;
pub use openai::OpenAiClient;
