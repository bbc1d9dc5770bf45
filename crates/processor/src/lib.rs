//! Document processing pipeline for the promptdoc service.
//!
//! This crate orchestrates store lookup, template rendering, provider
//! generation, and audit logging, turning a (user, purpose, document,
//! provider, params) request into a response or a typed failure. It holds
//! no persistent state of its own, only the injected store and audit sink.

pub mod audit;
pub mod layer;
pub mod processor;

// Re-export main types
pub use audit::{AuditRecord, AuditSink, MemoryAuditLog, SqliteAuditLog};
pub use layer::AuditLogLayer;
pub use processor::{DocumentProcessor, ProcessRequest, ProcessResponse};
