//! Command handlers for the promptdoc CLI.

pub mod history;
pub mod process;
pub mod prompt;

// Re-export command types for convenience
pub use history::{HistoryCommand, LogsCommand};
pub use process::ProcessCommand;
pub use prompt::PromptCommand;
