//! Error types for Scenewright
//!
//! Centralized error handling using thiserror. `StoreError` is what the
//! document store adapter reports; `SceneError` is what the editor layer
//! hands back after attributing a store failure to the operation that hit it.

use thiserror::Error;

use crate::document::DocumentId;

/// Failure reported by a document store adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Main error type for Scenewright
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to fetch scene list: {0}")]
    Fetch(#[source] StoreError),

    #[error("Failed to load document {id}: {source}")]
    Load {
        id: DocumentId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create document: {0}")]
    Create(#[source] StoreError),

    #[error("Failed to save document {id}: {source}")]
    Save {
        id: DocumentId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete document {id}: {source}")]
    Delete {
        id: DocumentId,
        #[source]
        source: StoreError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("A new scene is already being created")]
    CreateInProgress,
}

/// Result type alias for Scenewright operations
pub type Result<T> = std::result::Result<T, SceneError>;

/// Banner shown when the initial list cannot be fetched
pub const FETCH_FAILED: &str = "Failed to load scenes.";
/// Banner shown when a single document cannot be loaded
pub const LOAD_FAILED: &str = "Failed to load document.";
/// Banner shown when creating a scene fails
pub const CREATE_FAILED: &str = "Unable to create a new scene.";
/// Banner shown when an autosave fails
pub const SAVE_FAILED: &str = "Failed to save. Changes are kept locally — try again.";
/// Banner shown when deleting a scene fails
pub const DELETE_FAILED: &str = "Failed to delete.";

impl StoreError {
    /// Whether repeating the same call could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Rejected { status, .. } => *status == 429 || *status >= 500,
            StoreError::NotFound(_) | StoreError::Decode(_) => false,
        }
    }
}

impl SceneError {
    /// The store failure underneath, if this came from the adapter
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            SceneError::Fetch(source) | SceneError::Create(source) => Some(source),
            SceneError::Load { source, .. }
            | SceneError::Save { source, .. }
            | SceneError::Delete { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if this error is recoverable by re-triggering the action
    pub fn is_recoverable(&self) -> bool {
        self.store_error().map_or(false, StoreError::is_transient)
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SceneError::Fetch(_) => FETCH_FAILED.to_string(),
            SceneError::Load { .. } => LOAD_FAILED.to_string(),
            SceneError::Create(_) => CREATE_FAILED.to_string(),
            SceneError::Save { .. } => SAVE_FAILED.to_string(),
            SceneError::Delete { .. } => DELETE_FAILED.to_string(),
            SceneError::Config(msg) => format!("Configuration error: {}", msg),
            _ => self.to_string(),
        }
    }
}
