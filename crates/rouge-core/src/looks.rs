//! Named, saved style snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::style::StyleState;

/// A look the user chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLook {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub style: StyleState,
    /// Unix time in milliseconds when the look was saved.
    pub timestamp_ms: u64,
    /// Thumbnail of the rendered surface at save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_png: Option<Vec<u8>>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookError {
    #[error("look name must not be empty")]
    EmptyName,

    #[error("no saved look named {0:?}")]
    NotFound(String),

    #[error("invalid looks document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render look preview: {0}")]
    Preview(#[from] crate::types::SurfaceError),
}

/// Storage backend for saved looks.
///
/// The engine ships [`MemoryLookStore`]; hosts can persist looks
/// elsewhere (browser storage, files) behind the same interface.
pub trait LookStore {
    /// Insert or replace the look with `look.name`.
    ///
    /// # Errors
    ///
    /// Implementations may reject a look they cannot store.
    fn save(&mut self, look: SavedLook) -> Result<(), LookError>;

    fn get(&self, name: &str) -> Option<&SavedLook>;

    /// Remove a look, returning it if it existed.
    fn delete(&mut self, name: &str) -> Option<SavedLook>;

    /// Stored look names in ascending order.
    fn names(&self) -> Vec<String>;
}

/// In-memory store ordered by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLookStore {
    looks: BTreeMap<String, SavedLook>,
}

impl MemoryLookStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.looks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.looks.is_empty()
    }

    /// Serialize every look as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`LookError::Json`] if serialization fails.
    pub fn export_json(&self) -> Result<String, LookError> {
        let all: Vec<&SavedLook> = self.looks.values().collect();
        Ok(serde_json::to_string(&all)?)
    }

    /// Merge looks from a JSON array produced by
    /// [`export_json`](Self::export_json). Same-named looks are replaced.
    ///
    /// Returns the number of looks imported. Nothing is imported if the
    /// document fails to parse.
    ///
    /// # Errors
    ///
    /// Returns [`LookError::Json`] for malformed input or
    /// [`LookError::EmptyName`] if any entry has a blank name.
    pub fn import_json(&mut self, json: &str) -> Result<usize, LookError> {
        let incoming: Vec<SavedLook> = serde_json::from_str(json)?;
        if incoming.iter().any(|l| l.name.trim().is_empty()) {
            return Err(LookError::EmptyName);
        }
        let count = incoming.len();
        for look in incoming {
            self.looks.insert(look.name.clone(), look);
        }
        Ok(count)
    }
}

impl LookStore for MemoryLookStore {
    fn save(&mut self, look: SavedLook) -> Result<(), LookError> {
        if look.name.trim().is_empty() {
            return Err(LookError::EmptyName);
        }
        self.looks.insert(look.name.clone(), look);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&SavedLook> {
        self.looks.get(name)
    }

    fn delete(&mut self, name: &str) -> Option<SavedLook> {
        self.looks.remove(name)
    }

    fn names(&self) -> Vec<String> {
        self.looks.keys().cloned().collect()
    }
}
