//! The prompt store contract shared by every persistence strategy.

use crate::types::Prompt;
use promptdoc_core::AppResult;

/// Operations on the prompt catalog and activation map.
///
/// Implementations must be safe to share across concurrent callers:
/// mutating operations serialize per affected key so that two concurrent
/// updates of one prompt can never both observe version N (the second
/// writer sees N+1 and produces N+2). All operations complete in bounded
/// local time.
pub trait PromptStore: Send + Sync {
    /// Create a new prompt with a fresh id and version 1.
    fn create(&self, purpose: &str, name: &str, template: &str, owner: &str)
        -> AppResult<Prompt>;

    /// List all prompts, optionally filtered by exact purpose match.
    fn list(&self, purpose: Option<&str>) -> AppResult<Vec<Prompt>>;

    /// Look up a prompt by id.
    fn get(&self, id: &str) -> AppResult<Option<Prompt>>;

    /// Replace a prompt's template and bump its version by exactly 1.
    ///
    /// Fails with `NotFound` when the id is unknown **or** when `requester`
    /// is not the owner; the two cases are indistinguishable to the caller
    /// by design.
    fn update(&self, id: &str, template: &str, requester: &str) -> AppResult<Prompt>;

    /// Mark a prompt active for the (user, purpose) pair, overwriting any
    /// previous activation.
    ///
    /// Fails with `ActivationMismatch` when the prompt does not exist or its
    /// purpose differs from the requested one; the activation map is left
    /// untouched in that case.
    fn activate(&self, user: &str, purpose: &str, id: &str) -> AppResult<Prompt>;

    /// Resolve the active prompt for a (user, purpose) pair, if any.
    fn get_active(&self, user: &str, purpose: &str) -> AppResult<Option<Prompt>>;

    /// Delete a prompt and every activation entry referencing it.
    ///
    /// Ownership-checked like `update`: returns `Ok(false)` when the id is
    /// unknown or the requester is not the owner. The prompt and its
    /// activations disappear atomically from the caller's point of view.
    fn delete(&self, id: &str, requester: &str) -> AppResult<bool>;
}
