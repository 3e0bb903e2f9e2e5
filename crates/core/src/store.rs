//! Document Store Boundary
//!
//! Everything the editor persists goes through a [`DocumentStore`]. The
//! application root constructs one adapter and hands it to the components
//! as `Arc<dyn DocumentStore>`; nothing here keeps a global client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::document::{Document, DocumentFields, DocumentId, DocumentSummary};
use crate::error::StoreError;

/// Result type for store adapter calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Remote document store consumed by the editor.
///
/// Calls are independent; no transactional guarantee spans two of them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All scenes, most recently updated first
    async fn list_summaries(&self) -> StoreResult<Vec<DocumentSummary>>;

    /// Fetch one full document
    async fn get_document(&self, id: &DocumentId) -> StoreResult<Document>;

    /// Create a document; the store assigns the id
    async fn create_document(&self, title: &str, content: &str) -> StoreResult<Document>;

    /// Overwrite title and content. Repeating a call with the same fields is harmless.
    async fn patch_document(&self, id: &DocumentId, fields: &DocumentFields) -> StoreResult<()>;

    /// Remove a document
    async fn delete_document(&self, id: &DocumentId) -> StoreResult<()>;
}

struct StoredDocument {
    document: Document,
    updated: u64,
}

/// In-process store ordered by last update.
///
/// Used for offline sessions and tests.
pub struct MemoryStore {
    documents: RwLock<HashMap<DocumentId, StoredDocument>>,
    clock: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
        }
    }

    /// Create a store holding `documents`; later entries count as more recent
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        for document in documents {
            store.insert(document);
        }
        store
    }

    /// Insert or replace a document, marking it most recently updated
    pub fn insert(&self, document: Document) {
        let updated = self.tick();
        self.documents
            .write()
            .insert(document.id.clone(), StoredDocument { document, updated });
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Current copy of a document, bypassing the async interface
    pub fn snapshot(&self, id: &DocumentId) -> Option<Document> {
        self.documents.read().get(id).map(|s| s.document.clone())
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_summaries(&self) -> StoreResult<Vec<DocumentSummary>> {
        let documents = self.documents.read();
        let mut entries: Vec<&StoredDocument> = documents.values().collect();
        entries.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(entries.into_iter().map(|s| s.document.summary()).collect())
    }

    async fn get_document(&self, id: &DocumentId) -> StoreResult<Document> {
        self.snapshot(id).ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn create_document(&self, title: &str, content: &str) -> StoreResult<Document> {
        let document = Document::new(uuid::Uuid::new_v4().to_string(), title, content);
        debug!("memory store: create {}", document.id);
        self.insert(document.clone());
        Ok(document)
    }

    async fn patch_document(&self, id: &DocumentId, fields: &DocumentFields) -> StoreResult<()> {
        let updated = self.tick();
        let mut documents = self.documents.write();
        let stored = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        stored.document.title = fields.title.clone();
        stored.document.content = fields.content.clone();
        stored.updated = updated;
        debug!("memory store: patch {}", id);
        Ok(())
    }

    async fn delete_document(&self, id: &DocumentId) -> StoreResult<()> {
        self.documents
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}
