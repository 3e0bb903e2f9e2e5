//! Scriptable store for unit tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use scenewright_core::{
    Document, DocumentFields, DocumentId, DocumentStore, DocumentSummary, MemoryStore, StoreError,
    StoreResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    List,
    Get,
    Create,
    Patch,
    Delete,
}

/// Memory store with injectable failures, delays and fixed ids
#[derive(Default)]
pub(crate) struct ScriptedStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Op>>,
    get_delays: Mutex<HashMap<DocumentId, Duration>>,
    create_delay: Mutex<Option<Duration>>,
    patch_delays: Mutex<VecDeque<Duration>>,
    patch_failures: Mutex<VecDeque<bool>>,
    next_ids: Mutex<VecDeque<DocumentId>>,
    patches: Mutex<Vec<(DocumentId, DocumentFields)>>,
}

impl ScriptedStore {
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            inner: MemoryStore::with_documents(documents),
            ..Default::default()
        }
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().remove(&op);
    }

    pub fn delay_get(&self, id: &str, delay: Duration) {
        self.get_delays.lock().insert(DocumentId::from(id), delay);
    }

    pub fn delay_create(&self, delay: Duration) {
        *self.create_delay.lock() = Some(delay);
    }

    /// Delay and outcome for the next patch calls, in order
    pub fn script_patch(&self, delay: Duration, fails: bool) {
        self.patch_delays.lock().push_back(delay);
        self.patch_failures.lock().push_back(fails);
    }

    pub fn next_id(&self, id: &str) {
        self.next_ids.lock().push_back(DocumentId::from(id));
    }

    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    pub fn patches(&self) -> Vec<(DocumentId, DocumentFields)> {
        self.patches.lock().clone()
    }

    pub fn stored(&self, id: &str) -> Option<Document> {
        self.inner.snapshot(&DocumentId::from(id))
    }

    fn enter(&self, op: Op) -> StoreResult<()> {
        self.calls.lock().push(op);
        if self.failing.lock().contains(&op) {
            return Err(StoreError::Transport(format!("{:?} unavailable", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn list_summaries(&self) -> StoreResult<Vec<DocumentSummary>> {
        self.enter(Op::List)?;
        self.inner.list_summaries().await
    }

    async fn get_document(&self, id: &DocumentId) -> StoreResult<Document> {
        self.enter(Op::Get)?;
        let delay = self.get_delays.lock().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.get_document(id).await
    }

    async fn create_document(&self, title: &str, content: &str) -> StoreResult<Document> {
        self.enter(Op::Create)?;
        let delay = *self.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let fixed = self.next_ids.lock().pop_front();
        match fixed {
            Some(id) => {
                let document = Document::new(id, title, content);
                self.inner.insert(document.clone());
                Ok(document)
            }
            None => self.inner.create_document(title, content).await,
        }
    }

    async fn patch_document(&self, id: &DocumentId, fields: &DocumentFields) -> StoreResult<()> {
        self.enter(Op::Patch)?;
        let delay = self.patch_delays.lock().pop_front();
        let fails = self.patch_failures.lock().pop_front().unwrap_or(false);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fails {
            return Err(StoreError::Transport("patch dropped".into()));
        }
        self.patches.lock().push((id.clone(), fields.clone()));
        self.inner.patch_document(id, fields).await
    }

    async fn delete_document(&self, id: &DocumentId) -> StoreResult<()> {
        self.enter(Op::Delete)?;
        self.inner.delete_document(id).await
    }
}
