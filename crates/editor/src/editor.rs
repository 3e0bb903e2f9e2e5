//! Scene Editor State
//!
//! Holds the document being edited. Edits are applied locally right away
//! and written back through a debounced autosave; the local copy is only
//! ever replaced by a fresh full load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use scenewright_core::error::{LOAD_FAILED, SAVE_FAILED};
use scenewright_core::{
    DocumentFields, DocumentId, DocumentStore, Event, EventBus, SaveStatus, SceneError,
};

use crate::debounce::Debouncer;
use crate::word_count::count_words;

/// Editor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorPhase {
    /// No document selected
    #[default]
    Empty,
    /// Document fetch in flight
    Loading,
    /// Content loaded (or failed to load) and editable
    Ready,
}

/// Arguments of one autosave, captured when the edit happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub content: String,
    pub title: String,
    pub id: Option<DocumentId>,
}

/// Read-only copy of the editor state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub phase: EditorPhase,
    pub document_id: Option<DocumentId>,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub save_status: SaveStatus,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Banner message, if any
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct EditorState {
    phase: EditorPhase,
    document_id: Option<DocumentId>,
    title: String,
    content: String,
    save_status: SaveStatus,
    last_saved_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

struct EditorShared {
    store: Arc<dyn DocumentStore>,
    events: Arc<EventBus>,
    state: RwLock<EditorState>,
    /// Bumped on every selection change; loads check it before applying
    load_generation: AtomicU64,
    /// Bumped when a save starts; only the newest save reports status
    save_sequence: AtomicU64,
}

impl EditorShared {
    async fn perform_save(&self, request: SaveRequest) {
        let Some(id) = request.id else {
            debug!("autosave skipped: no active document");
            return;
        };

        let sequence = self.save_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_save_status(SaveStatus::Saving, true);

        let fields = DocumentFields::new(request.title, request.content);
        let result = self.store.patch_document(&id, &fields).await;

        if self.save_sequence.load(Ordering::SeqCst) != sequence {
            debug!("save #{} for {} finished after a newer save started", sequence, id);
            if let Err(e) = result {
                warn!("Superseded save of {} failed: {}", id, e);
            }
            return;
        }

        match result {
            Ok(()) => {
                let now = Utc::now();
                self.state.write().last_saved_at = Some(now);
                self.set_save_status(SaveStatus::Saved(now), false);
                debug!("saved {}", id);
            }
            Err(source) => {
                let err = SceneError::Save { id, source };
                warn!("{}", err);
                self.state.write().error = Some(SAVE_FAILED.to_string());
                self.set_save_status(SaveStatus::Error(SAVE_FAILED.to_string()), false);
            }
        }
    }

    fn set_save_status(&self, status: SaveStatus, clear_error: bool) {
        {
            let mut state = self.state.write();
            state.save_status = status.clone();
            if clear_error {
                state.error = None;
            }
        }
        self.events.emit(Event::SaveStatusChanged(status));
    }
}

/// Editor for the active scene
pub struct Editor {
    shared: Arc<EditorShared>,
    autosave: Debouncer<SaveRequest>,
}

impl Editor {
    /// Create an editor writing through `store` after `autosave_delay` of quiet.
    ///
    /// Autosaves run on the tokio runtime current at construction, so this
    /// panics outside of one; the edit methods themselves can then be called
    /// from any thread.
    pub fn new(store: Arc<dyn DocumentStore>, events: Arc<EventBus>, autosave_delay: Duration) -> Self {
        let shared = Arc::new(EditorShared {
            store,
            events,
            state: RwLock::new(EditorState::default()),
            load_generation: AtomicU64::new(0),
            save_sequence: AtomicU64::new(0),
        });

        let saver = Arc::clone(&shared);
        let autosave = Debouncer::new(autosave_delay, move |request: SaveRequest| {
            let saver = Arc::clone(&saver);
            async move { saver.perform_save(request).await }
        });

        Self { shared, autosave }
    }

    /// Point the editor at a new selection and load it.
    ///
    /// A load that is overtaken by a later selection change is discarded
    /// when it completes.
    pub async fn on_selection_change(&self, id: Option<DocumentId>) {
        let generation = self.shared.load_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(id) = id else {
            self.clear_state();
            return;
        };

        {
            let mut state = self.shared.state.write();
            state.phase = EditorPhase::Loading;
            state.document_id = Some(id.clone());
            state.title.clear();
            state.content.clear();
        }
        debug!("loading {}", id);

        let result = self.shared.store.get_document(&id).await;

        if self.shared.load_generation.load(Ordering::SeqCst) != generation {
            debug!("discarding load of {}: selection moved on", id);
            return;
        }

        match result {
            Ok(document) => {
                {
                    let mut state = self.shared.state.write();
                    state.title = document.title;
                    state.content = document.content;
                    state.error = None;
                    state.phase = EditorPhase::Ready;
                }
                info!("Loaded document {}", id);
                self.shared.events.emit(Event::DocumentLoaded(id));
            }
            Err(source) => {
                let err = SceneError::Load { id, source };
                warn!("{}", err);
                {
                    let mut state = self.shared.state.write();
                    state.title.clear();
                    state.content.clear();
                    state.error = Some(LOAD_FAILED.to_string());
                    state.phase = EditorPhase::Ready;
                }
                self.shared.events.emit(Event::Error {
                    message: LOAD_FAILED.to_string(),
                    details: Some(err.to_string()),
                });
            }
        }
    }

    /// Return to the empty state, e.g. after the active scene was deleted
    pub fn clear(&self) {
        self.shared.load_generation.fetch_add(1, Ordering::SeqCst);
        self.clear_state();
    }

    fn clear_state(&self) {
        {
            let mut state = self.shared.state.write();
            state.phase = EditorPhase::Empty;
            state.document_id = None;
            state.title.clear();
            state.content.clear();
        }
        self.shared.events.emit(Event::EditorCleared);
    }

    /// Replace the content locally and schedule an autosave.
    ///
    /// Returns `false` and changes nothing while a load is in flight.
    pub fn on_content_edit(&self, markup: impl Into<String>) -> bool {
        self.apply_edit(|state| state.content = markup.into())
    }

    /// Replace the title locally and schedule an autosave.
    ///
    /// Returns `false` and changes nothing while a load is in flight.
    pub fn on_title_edit(&self, title: impl Into<String>) -> bool {
        self.apply_edit(|state| state.title = title.into())
    }

    fn apply_edit(&self, edit: impl FnOnce(&mut EditorState)) -> bool {
        let request = {
            let mut state = self.shared.state.write();
            if state.phase == EditorPhase::Loading {
                debug!("edit ignored: {:?} is still loading", state.document_id);
                return false;
            }
            edit(&mut *state);
            SaveRequest {
                content: state.content.clone(),
                title: state.title.clone(),
                id: state.document_id.clone(),
            }
        };
        self.autosave.schedule(request);
        true
    }

    /// Write `request` to the store now. Local state is never rolled back.
    pub async fn perform_save(&self, request: SaveRequest) {
        self.shared.perform_save(request).await
    }

    /// Whether an autosave countdown is armed
    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Armed countdown or a save that has started and not finished
    pub fn has_outstanding_save(&self) -> bool {
        self.autosave.is_busy()
    }

    /// Show `message` in the banner
    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.shared.state.write().error = Some(message.clone());
        self.shared.events.emit(Event::Error {
            message,
            details: None,
        });
    }

    pub fn phase(&self) -> EditorPhase {
        self.shared.state.read().phase
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.shared.state.read().document_id.clone()
    }

    pub fn title(&self) -> String {
        self.shared.state.read().title.clone()
    }

    pub fn content(&self) -> String {
        self.shared.state.read().content.clone()
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.shared.state.read().content)
    }

    pub fn save_status(&self) -> SaveStatus {
        self.shared.state.read().save_status.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.shared.state.read().save_status.is_saving()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.shared.state.read().last_saved_at
    }

    pub fn error(&self) -> Option<String> {
        self.shared.state.read().error.clone()
    }

    /// Copy of the whole state
    pub fn snapshot(&self) -> EditorView {
        let state = self.shared.state.read();
        EditorView {
            phase: state.phase,
            document_id: state.document_id.clone(),
            title: state.title.clone(),
            content: state.content.clone(),
            word_count: count_words(&state.content),
            save_status: state.save_status.clone(),
            last_saved_at: state.last_saved_at,
            error: state.error.clone(),
        }
    }
}
