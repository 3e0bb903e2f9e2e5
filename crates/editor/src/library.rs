//! Scene Library
//!
//! The sidebar: the list of known scenes, the active selection and the
//! search query. The list keeps the order the store reported and is only
//! changed by a full fetch, a create or a delete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info};

use scenewright_core::{
    Document, DocumentId, DocumentStore, DocumentSummary, Event, EventBus, Result, SceneError,
    UNTITLED,
};

use crate::confirm::ConfirmGate;

/// What happened to a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Deleted remotely and locally
    Removed { was_selected: bool },
    /// The confirmation gate said no
    Declined,
    /// The id is not in the list
    NotListed,
}

#[derive(Debug, Default)]
struct LibraryState {
    summaries: Vec<DocumentSummary>,
    selection: Option<DocumentId>,
    query: String,
}

/// Case-insensitive title match; empty titles match as "untitled".
/// A blank query keeps everything.
pub fn filter_summaries(summaries: &[DocumentSummary], query: &str) -> Vec<DocumentSummary> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return summaries.to_vec();
    }
    summaries
        .iter()
        .filter(|s| {
            let title = if s.title.is_empty() { UNTITLED } else { s.title.as_str() };
            title.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// List and selection state for the scene sidebar
pub struct Library {
    store: Arc<dyn DocumentStore>,
    events: Arc<EventBus>,
    state: RwLock<LibraryState>,
    creating: AtomicBool,
}

/// Clears the creating flag when the create finishes or is dropped
struct CreatingGuard<'a>(&'a AtomicBool);

impl Drop for CreatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Library {
    pub fn new(store: Arc<dyn DocumentStore>, events: Arc<EventBus>) -> Self {
        Self {
            store,
            events,
            state: RwLock::new(LibraryState::default()),
            creating: AtomicBool::new(false),
        }
    }

    /// Fetch the scene list and select the first entry if nothing is selected.
    ///
    /// Failures are logged and leave the list as it was; there is no retry.
    pub async fn load_initial_list(&self) -> Result<usize> {
        let summaries = match self.store.list_summaries().await {
            Ok(summaries) => summaries,
            Err(source) => {
                let err = SceneError::Fetch(source);
                error!("{}", err);
                return Err(err);
            }
        };

        let count = summaries.len();
        let auto_selected = {
            let mut state = self.state.write();
            state.summaries = summaries;
            if state.selection.is_none() {
                state.selection = state.summaries.first().map(|s| s.id.clone());
                state.selection.clone()
            } else {
                None
            }
        };

        info!("Loaded {} scenes", count);
        self.events.emit(Event::ListLoaded { count });
        if let Some(id) = auto_selected {
            debug!("auto-selected {}", id);
            self.events.emit(Event::SelectionChanged(Some(id)));
        }
        Ok(count)
    }

    /// Select `id`; it does not have to be in the list yet
    pub fn select(&self, id: DocumentId) {
        self.state.write().selection = Some(id.clone());
        self.events.emit(Event::SelectionChanged(Some(id)));
    }

    pub fn selection(&self) -> Option<DocumentId> {
        self.state.read().selection.clone()
    }

    /// All summaries in store order
    pub fn summaries(&self) -> Vec<DocumentSummary> {
        self.state.read().summaries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().summaries.is_empty()
    }

    pub fn get(&self, id: &DocumentId) -> Option<DocumentSummary> {
        self.state.read().summaries.iter().find(|s| &s.id == id).cloned()
    }

    /// Summaries whose title matches `query`, without touching any state
    pub fn filter(&self, query: &str) -> Vec<DocumentSummary> {
        filter_summaries(&self.state.read().summaries, query)
    }

    /// Remember the sidebar search text
    pub fn set_query(&self, query: impl Into<String>) {
        self.state.write().query = query.into();
    }

    pub fn query(&self) -> String {
        self.state.read().query.clone()
    }

    /// Summaries matching the remembered query
    pub fn visible(&self) -> Vec<DocumentSummary> {
        let state = self.state.read();
        filter_summaries(&state.summaries, &state.query)
    }

    /// Whether a create call is waiting on the store
    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::SeqCst)
    }

    /// Create a scene, put it at the top of the list and select it.
    ///
    /// Only one create runs at a time; a second call while one is in flight
    /// fails with [`SceneError::CreateInProgress`] without reaching the store.
    pub async fn create(&self, title: &str, content: &str) -> Result<Document> {
        if self.creating.swap(true, Ordering::SeqCst) {
            debug!("create ignored: another create is in flight");
            return Err(SceneError::CreateInProgress);
        }
        let _creating = CreatingGuard(&self.creating);

        let document = match self.store.create_document(title, content).await {
            Ok(document) => document,
            Err(source) => {
                let err = SceneError::Create(source);
                error!("{}", err);
                return Err(err);
            }
        };

        {
            let mut state = self.state.write();
            state.summaries.insert(0, document.summary());
            state.selection = Some(document.id.clone());
        }

        info!("Created scene {}", document.id);
        self.events.emit(Event::DocumentCreated(document.id.clone()));
        self.events.emit(Event::SelectionChanged(Some(document.id.clone())));
        Ok(document)
    }

    /// Delete a scene after `gate` confirms.
    ///
    /// Nothing is removed locally unless the store delete succeeds.
    pub async fn remove(&self, id: &DocumentId, gate: &dyn ConfirmGate) -> Result<RemoveOutcome> {
        let Some(summary) = self.get(id) else {
            debug!("remove: {} is not listed", id);
            return Ok(RemoveOutcome::NotListed);
        };

        let prompt = format!("Delete \"{}\"?", summary.display_title());
        if !gate.confirm(&prompt) {
            debug!("remove: {} declined", id);
            return Ok(RemoveOutcome::Declined);
        }

        if let Err(source) = self.store.delete_document(id).await {
            let err = SceneError::Delete {
                id: id.clone(),
                source,
            };
            error!("{}", err);
            return Err(err);
        }

        let was_selected = {
            let mut state = self.state.write();
            state.summaries.retain(|s| &s.id != id);
            let was_selected = state.selection.as_ref() == Some(id);
            if was_selected {
                state.selection = None;
            }
            was_selected
        };

        info!("Deleted scene {}", id);
        self.events.emit(Event::DocumentDeleted(id.clone()));
        if was_selected {
            self.events.emit(Event::SelectionChanged(None));
        }
        Ok(RemoveOutcome::Removed { was_selected })
    }
}
