//! Save status indicator
//!
//! Derived from the autosave pipeline, never persisted.

use chrono::{DateTime, Utc};

/// Where the most recent autosave stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// Nothing saved since the editor came up
    #[default]
    Idle,
    /// A patch is in flight
    Saving,
    /// Last patch was acknowledged at the given time
    Saved(DateTime<Utc>),
    /// Last patch failed; local edits are still in place
    Error(String),
}

impl SaveStatus {
    pub fn is_saving(&self) -> bool {
        matches!(self, SaveStatus::Saving)
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SaveStatus::Saved(at) => Some(*at),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SaveStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Short label for status bars
    pub fn label(&self) -> String {
        match self {
            SaveStatus::Idle => "Not saved yet".to_string(),
            SaveStatus::Saving => "Saving…".to_string(),
            SaveStatus::Saved(at) => format!("Saved at {}", at.format("%H:%M:%S")),
            SaveStatus::Error(message) => message.clone(),
        }
    }
}
