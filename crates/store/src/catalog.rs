//! Shared in-memory catalog state.
//!
//! Both the volatile and the snapshot strategies operate on this structure;
//! the methods here hold the actual invariant logic (version bumps,
//! ownership checks, activation consistency, cascade deletes) so the two
//! strategies cannot drift apart.

use crate::types::{activation_key, split_activation_key, Prompt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// The prompt catalog plus the activation map.
#[derive(Debug, Default)]
pub struct Catalog {
    prompts: HashMap<String, Prompt>,
    /// (user, purpose) -> prompt id
    active: HashMap<(String, String), String>,
}

/// Serialized snapshot layout: the full list of prompt records and the
/// activation map with `user:purpose` string keys. Must round-trip
/// losslessly.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub prompts: Vec<Prompt>,
    pub active: BTreeMap<String, String>,
}

impl Catalog {
    /// Create a prompt with a fresh uuid and version 1.
    pub fn create(&mut self, purpose: &str, name: &str, template: &str, owner: &str) -> Prompt {
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            purpose: purpose.to_string(),
            name: name.to_string(),
            template: template.to_string(),
            version: 1,
            owner: owner.to_string(),
        };
        self.prompts.insert(prompt.id.clone(), prompt.clone());
        prompt
    }

    /// List prompts, optionally filtered by exact purpose.
    pub fn list(&self, purpose: Option<&str>) -> Vec<Prompt> {
        self.prompts
            .values()
            .filter(|p| purpose.map_or(true, |want| p.purpose == want))
            .cloned()
            .collect()
    }

    /// Look up a prompt by id.
    pub fn get(&self, id: &str) -> Option<Prompt> {
        self.prompts.get(id).cloned()
    }

    /// Replace the template and bump the version.
    ///
    /// `None` when the id is unknown or the requester is not the owner.
    pub fn update(&mut self, id: &str, template: &str, requester: &str) -> Option<Prompt> {
        let prompt = self.prompts.get_mut(id).filter(|p| p.owner == requester)?;
        prompt.template = template.to_string();
        prompt.version += 1;
        Some(prompt.clone())
    }

    /// Activate a prompt for (user, purpose).
    ///
    /// `None` when the prompt is missing or its purpose differs; the
    /// activation map is untouched in that case.
    pub fn activate(&mut self, user: &str, purpose: &str, id: &str) -> Option<Prompt> {
        let prompt = self.prompts.get(id).filter(|p| p.purpose == purpose)?.clone();
        self.active
            .insert((user.to_string(), purpose.to_string()), id.to_string());
        Some(prompt)
    }

    /// Resolve the active prompt for (user, purpose).
    pub fn get_active(&self, user: &str, purpose: &str) -> Option<Prompt> {
        let id = self
            .active
            .get(&(user.to_string(), purpose.to_string()))?;
        self.prompts.get(id).cloned()
    }

    /// Delete a prompt and every activation entry referencing it.
    pub fn delete(&mut self, id: &str, requester: &str) -> bool {
        match self.prompts.get(id) {
            Some(p) if p.owner == requester => {}
            _ => return false,
        }
        self.prompts.remove(id);
        self.active.retain(|_, active_id| active_id != id);
        true
    }

    /// Export the catalog for the snapshot file.
    ///
    /// Prompts are sorted by id so repeated saves of the same state produce
    /// byte-identical files.
    pub fn to_snapshot(&self) -> CatalogSnapshot {
        let mut prompts: Vec<Prompt> = self.prompts.values().cloned().collect();
        prompts.sort_by(|a, b| a.id.cmp(&b.id));

        CatalogSnapshot {
            prompts,
            active: self
                .active
                .iter()
                .map(|((user, purpose), id)| (activation_key(user, purpose), id.clone()))
                .collect(),
        }
    }

    /// Rebuild the catalog from a snapshot.
    ///
    /// Activation keys that do not contain the delimiter are dropped; they
    /// cannot have been written by `to_snapshot`.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            prompts: snapshot
                .prompts
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            active: snapshot
                .active
                .into_iter()
                .filter_map(|(key, id)| split_activation_key(&key).map(|pair| (pair, id)))
                .collect(),
        }
    }
}
