//! Template rendering for the promptdoc service.
//!
//! This crate turns a stored prompt template plus an input document into the
//! text sent to a generation provider. Two dialects are supported:
//! - Rich templates (Jinja-style, via minijinja): variables, conditionals,
//!   loops, and filters
//! - Legacy templates: a single `{document}` placeholder substitution

pub mod renderer;

// Re-export the contract
pub use renderer::{render, Bindings};
