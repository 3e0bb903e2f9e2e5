//! Scene documents
//!
//! The full document the editor works on, the summary shown in the scene
//! list, and the field set written back by an autosave.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title shown for documents whose stored title is empty
pub const UNTITLED: &str = "Untitled";

/// Opaque identifier assigned by the store when a document is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Title to display for a possibly empty stored title
pub fn display_title(title: &str) -> &str {
    if title.is_empty() {
        UNTITLED
    } else {
        title
    }
}

/// One editable scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    /// Rich-text markup, opaque to this crate
    #[serde(default)]
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// List-view projection of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl DocumentSummary {
    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content: doc.content,
        }
    }
}

/// Fields written by a patch; both are always sent so the store ends up
/// with the latest local values (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    pub title: String,
    pub content: String,
}

impl DocumentFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}
