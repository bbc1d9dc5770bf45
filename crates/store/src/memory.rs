//! Volatile in-memory store.

use crate::catalog::Catalog;
use crate::contract::PromptStore;
use crate::types::Prompt;
use promptdoc_core::{AppError, AppResult};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-lifetime store with no persistence.
///
/// Mutations take the write lock for the duration of the read-modify-write,
/// so concurrent updates of one prompt serialize and never lose a version
/// bump. Reads share the read lock and proceed concurrently.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Catalog>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Catalog>> {
        self.inner
            .read()
            .map_err(|_| AppError::Storage("Prompt catalog lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Catalog>> {
        self.inner
            .write()
            .map_err(|_| AppError::Storage("Prompt catalog lock poisoned".to_string()))
    }
}

impl PromptStore for MemoryStore {
    fn create(
        &self,
        purpose: &str,
        name: &str,
        template: &str,
        owner: &str,
    ) -> AppResult<Prompt> {
        let prompt = self.write()?.create(purpose, name, template, owner);
        tracing::debug!("Created prompt {} for purpose '{}'", prompt.id, purpose);
        Ok(prompt)
    }

    fn list(&self, purpose: Option<&str>) -> AppResult<Vec<Prompt>> {
        Ok(self.read()?.list(purpose))
    }

    fn get(&self, id: &str) -> AppResult<Option<Prompt>> {
        Ok(self.read()?.get(id))
    }

    fn update(&self, id: &str, template: &str, requester: &str) -> AppResult<Prompt> {
        self.write()?
            .update(id, template, requester)
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    fn activate(&self, user: &str, purpose: &str, id: &str) -> AppResult<Prompt> {
        self.write()?.activate(user, purpose, id).ok_or_else(|| {
            AppError::ActivationMismatch(format!(
                "Prompt {} does not exist for purpose '{}'",
                id, purpose
            ))
        })
    }

    fn get_active(&self, user: &str, purpose: &str) -> AppResult<Option<Prompt>> {
        Ok(self.read()?.get_active(user, purpose))
    }

    fn delete(&self, id: &str, requester: &str) -> AppResult<bool> {
        Ok(self.write()?.delete(id, requester))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_signals() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update("missing", "t", "u1"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.activate("u1", "p", "missing"),
            Err(AppError::ActivationMismatch(_))
        ));
        assert!(!store.delete("missing", "u1").unwrap());
    }

    #[test]
    fn test_list_filters_by_purpose() {
        let store = MemoryStore::new();
        store.create("summarize", "a", "t", "u1").unwrap();
        store.create("summarize", "b", "t", "u1").unwrap();
        store.create("extract", "c", "t", "u1").unwrap();

        assert_eq!(store.list(Some("summarize")).unwrap().len(), 2);
        assert_eq!(store.list(Some("extract")).unwrap().len(), 1);
        assert_eq!(store.list(None).unwrap().len(), 3);
    }
}
