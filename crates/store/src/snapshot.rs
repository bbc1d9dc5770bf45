//! Snapshot-on-write store.
//!
//! The in-memory catalog is mirrored to a JSON file after every mutating
//! call: the entire catalog and activation map are rewritten each time,
//! which bounds write latency by total catalog size. The file is reloaded
//! fully at startup.

use crate::catalog::{Catalog, CatalogSnapshot};
use crate::contract::PromptStore;
use crate::types::Prompt;
use promptdoc_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory catalog persisted as a full JSON snapshot on each mutation.
#[derive(Debug)]
pub struct SnapshotStore {
    inner: RwLock<Catalog>,
    path: PathBuf,
}

impl SnapshotStore {
    /// Open a snapshot store, loading the existing snapshot if present.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let catalog = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Storage(format!("Failed to read snapshot {:?}: {}", path, e))
            })?;
            let snapshot: CatalogSnapshot = serde_json::from_str(&contents).map_err(|e| {
                AppError::Storage(format!("Failed to parse snapshot {:?}: {}", path, e))
            })?;
            tracing::info!("Loaded snapshot from {:?}", path);
            Catalog::from_snapshot(snapshot)
        } else {
            Catalog::default()
        };

        Ok(Self {
            inner: RwLock::new(catalog),
            path,
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
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

    /// Rewrite the whole snapshot file.
    ///
    /// Called while holding the write lock so the file always reflects a
    /// consistent catalog state.
    fn save(&self, catalog: &Catalog) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!(
                        "Failed to create snapshot directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&catalog.to_snapshot())
            .map_err(|e| AppError::Storage(format!("Failed to serialize snapshot: {}", e)))?;

        std::fs::write(&self.path, json).map_err(|e| {
            AppError::Storage(format!("Failed to write snapshot {:?}: {}", self.path, e))
        })?;

        tracing::debug!("Saved snapshot to {:?}", self.path);
        Ok(())
    }
}

impl PromptStore for SnapshotStore {
    fn create(
        &self,
        purpose: &str,
        name: &str,
        template: &str,
        owner: &str,
    ) -> AppResult<Prompt> {
        let mut catalog = self.write()?;
        let prompt = catalog.create(purpose, name, template, owner);
        self.save(&catalog)?;
        Ok(prompt)
    }

    fn list(&self, purpose: Option<&str>) -> AppResult<Vec<Prompt>> {
        Ok(self.read()?.list(purpose))
    }

    fn get(&self, id: &str) -> AppResult<Option<Prompt>> {
        Ok(self.read()?.get(id))
    }

    fn update(&self, id: &str, template: &str, requester: &str) -> AppResult<Prompt> {
        let mut catalog = self.write()?;
        let prompt = catalog
            .update(id, template, requester)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        self.save(&catalog)?;
        Ok(prompt)
    }

    fn activate(&self, user: &str, purpose: &str, id: &str) -> AppResult<Prompt> {
        let mut catalog = self.write()?;
        let prompt = catalog.activate(user, purpose, id).ok_or_else(|| {
            AppError::ActivationMismatch(format!(
                "Prompt {} does not exist for purpose '{}'",
                id, purpose
            ))
        })?;
        self.save(&catalog)?;
        Ok(prompt)
    }

    fn get_active(&self, user: &str, purpose: &str) -> AppResult<Option<Prompt>> {
        Ok(self.read()?.get_active(user, purpose))
    }

    fn delete(&self, id: &str, requester: &str) -> AppResult<bool> {
        let mut catalog = self.write()?;
        let removed = catalog.delete(id, requester);
        if removed {
            self.save(&catalog)?;
        }
        Ok(removed)
    }
}
