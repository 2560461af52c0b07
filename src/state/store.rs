// Patch export/import
//
// Import parses and validates the full document before anything is
// applied, so a malformed payload can never leave the engine half
// restored.

use thiserror::Error;

use crate::state::snapshot::{EngineSnapshot, PatchDocument, DOCUMENT_VERSION};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid patch document: {0}")]
    InvalidImport(#[from] serde_json::Error),

    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),
}

/// Stateless translator between engine snapshots and JSON documents.
#[derive(Debug, Default)]
pub struct StateStore;

impl StateStore {
    pub fn new() -> Self {
        Self
    }

    /// Wraps a snapshot in a versioned, timestamped document.
    pub fn export(&self, snapshot: &EngineSnapshot) -> Result<String, StateError> {
        let document = PatchDocument::new(snapshot.clone());
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Parses a document and returns its config. Fails without side
    /// effects on malformed JSON or an unknown version.
    pub fn import(&self, json: &str) -> Result<EngineSnapshot, StateError> {
        let document: PatchDocument = serde_json::from_str(json)?;
        if document.version > DOCUMENT_VERSION {
            return Err(StateError::UnsupportedVersion(document.version));
        }
        Ok(document.config)
    }
}
