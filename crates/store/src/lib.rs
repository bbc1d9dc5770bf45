//! Prompt catalog and activation store for the promptdoc service.
//!
//! This crate owns the prompt catalog and the active-prompt assignment map.
//! It enforces version monotonicity, ownership checks, and activation
//! consistency, behind a single contract with three interchangeable
//! persistence strategies:
//! - [`MemoryStore`]: process-lifetime only
//! - [`SnapshotStore`]: full JSON rewrite after every mutation
//! - [`SqliteStore`]: individually durable SQLite writes
//!
//! All three agree exactly on rejected-ownership behavior, version
//! increments, and cascade deletion of activation entries.

pub mod catalog;
pub mod contract;
pub mod memory;
pub mod snapshot;
pub mod sqlite;
pub mod types;

// Re-export main types
pub use contract::PromptStore;
pub use memory::MemoryStore;
pub use snapshot::SnapshotStore;
pub use sqlite::SqliteStore;
pub use types::Prompt;
