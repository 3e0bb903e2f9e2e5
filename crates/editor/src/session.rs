//! Editing Session
//!
//! Composes the library and the editor around one injected store: routes
//! selection changes into the editor and turns library failures into the
//! editor's banner.

use std::sync::Arc;

use tracing::{debug, info, warn};

use scenewright_core::config::EditorConfig;
use scenewright_core::{DocumentId, DocumentStore, DocumentSummary, EventBus, Result, SceneError};

use crate::confirm::ConfirmGate;
use crate::editor::{Editor, EditorView};
use crate::library::{Library, RemoveOutcome};

/// Library + editor wired to the same store and event bus
pub struct Session {
    library: Library,
    editor: Editor,
    events: Arc<EventBus>,
    default_title: String,
}

impl Session {
    /// Must be called inside a tokio runtime; autosaves run on it.
    pub fn new(store: Arc<dyn DocumentStore>, config: &EditorConfig, events: Arc<EventBus>) -> Self {
        Self {
            library: Library::new(Arc::clone(&store), Arc::clone(&events)),
            editor: Editor::new(store, Arc::clone(&events), config.autosave_delay()),
            events,
            default_title: config.default_title.clone(),
        }
    }

    /// Load the scene list and open whatever ends up selected
    pub async fn start(&self) -> Result<usize> {
        let count = match self.library.load_initial_list().await {
            Ok(count) => count,
            Err(err) => {
                self.editor.report_error(err.user_message());
                return Err(err);
            }
        };

        if let Some(id) = self.library.selection() {
            self.editor.on_selection_change(Some(id)).await;
        }
        info!("Session started with {} scenes", count);
        Ok(count)
    }

    /// Select a scene and load it into the editor.
    ///
    /// Selecting the scene that is already open does nothing, so local
    /// edits are not replaced by the stored copy.
    pub async fn select(&self, id: DocumentId) {
        if self.library.selection().as_ref() == Some(&id) && self.editor.document_id().as_ref() == Some(&id) {
            debug!("{} is already open", id);
            return;
        }
        self.library.select(id.clone());
        self.editor.on_selection_change(Some(id)).await;
    }

    /// Create an untitled scene and open it.
    ///
    /// Refused without a banner while another create is in flight.
    pub async fn create_scene(&self) -> Result<DocumentId> {
        match self.library.create(&self.default_title, "").await {
            Ok(document) => {
                self.editor.on_selection_change(Some(document.id.clone())).await;
                Ok(document.id)
            }
            Err(err @ SceneError::CreateInProgress) => Err(err),
            Err(err) => {
                self.editor.report_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Delete a scene once `gate` agrees; empties the editor if it was open
    pub async fn delete_scene(&self, id: &DocumentId, gate: &dyn ConfirmGate) -> Result<RemoveOutcome> {
        match self.library.remove(id, gate).await {
            Ok(outcome) => {
                if let RemoveOutcome::Removed { was_selected: true } = outcome {
                    self.editor.clear();
                }
                Ok(outcome)
            }
            Err(err) => {
                warn!("Delete of {} failed", id);
                self.editor.report_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Returns `false` when the edit was refused because a load is in flight
    pub fn edit_content(&self, markup: impl Into<String>) -> bool {
        self.editor.on_content_edit(markup)
    }

    pub fn edit_title(&self, title: impl Into<String>) -> bool {
        self.editor.on_title_edit(title)
    }

    pub fn is_creating(&self) -> bool {
        self.library.is_creating()
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.library.set_query(query);
    }

    /// Sidebar entries for the current query
    pub fn visible_scenes(&self) -> Vec<DocumentSummary> {
        self.library.visible()
    }

    pub fn view(&self) -> EditorView {
        self.editor.snapshot()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AlwaysConfirm, NeverConfirm};
    use crate::editor::EditorPhase;
    use crate::testing::{Op, ScriptedStore};
    use scenewright_core::error::{CREATE_FAILED, DELETE_FAILED, FETCH_FAILED};
    use scenewright_core::{Document, Event, SaveStatus};
    use std::time::Duration;

    fn session_over(store: &Arc<ScriptedStore>) -> Session {
        let store: Arc<dyn DocumentStore> = store.clone();
        Session::new(store, &EditorConfig::default(), Arc::new(EventBus::new()))
    }

    fn scenes() -> Arc<ScriptedStore> {
        Arc::new(ScriptedStore::with_documents([
            Document::new("b", "Chapter One", "<p>one</p>"),
            Document::new("a", "Prologue", "<p>In the beginning</p>"),
        ]))
    }

    #[tokio::test]
    async fn test_start_opens_first_scene() {
        let store = scenes();
        let session = session_over(&store);
        let events = session.events().subscribe();

        assert_eq!(session.start().await.unwrap(), 2);

        let view = session.view();
        assert_eq!(view.document_id, Some(DocumentId::from("a")));
        assert_eq!(view.title, "Prologue");
        assert_eq!(view.word_count, 3);
        assert_eq!(
            events.drain(),
            vec![
                Event::ListLoaded { count: 2 },
                Event::SelectionChanged(Some(DocumentId::from("a"))),
                Event::DocumentLoaded(DocumentId::from("a")),
            ]
        );
    }

    #[tokio::test]
    async fn test_start_failure_shows_banner() {
        let store = scenes();
        store.fail(Op::List);
        let session = session_over(&store);

        assert!(session.start().await.is_err());

        let view = session.view();
        assert_eq!(view.phase, EditorPhase::Empty);
        assert_eq!(view.error.as_deref(), Some(FETCH_FAILED));
        assert!(session.visible_scenes().is_empty());
    }

    #[tokio::test]
    async fn test_create_opens_new_scene() {
        let store = scenes();
        store.next_id("x");
        let session = session_over(&store);
        session.start().await.unwrap();

        let id = session.create_scene().await.unwrap();

        assert_eq!(id, DocumentId::from("x"));
        assert_eq!(session.library().selection(), Some(id.clone()));
        assert_eq!(session.visible_scenes()[0].id, id);
        let view = session.view();
        assert_eq!(view.document_id, Some(id));
        assert_eq!(view.title, "Untitled");
        assert!(view.content.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_keeps_state() {
        let store = scenes();
        store.fail(Op::Create);
        let session = session_over(&store);
        session.start().await.unwrap();

        assert!(session.create_scene().await.is_err());

        assert_eq!(session.view().error.as_deref(), Some(CREATE_FAILED));
        assert_eq!(session.view().document_id, Some(DocumentId::from("a")));
        assert_eq!(session.library().len(), 2);
    }

    #[tokio::test]
    async fn test_deleting_open_scene_empties_editor() {
        let store = scenes();
        let session = session_over(&store);
        session.start().await.unwrap();

        let outcome = session
            .delete_scene(&DocumentId::from("a"), &AlwaysConfirm)
            .await
            .unwrap();

        assert_eq!(outcome, RemoveOutcome::Removed { was_selected: true });
        assert_eq!(session.view().phase, EditorPhase::Empty);
        assert_eq!(session.library().selection(), None);
    }

    #[tokio::test]
    async fn test_deleting_other_scene_keeps_editor() {
        let store = scenes();
        let session = session_over(&store);
        session.start().await.unwrap();

        session
            .delete_scene(&DocumentId::from("b"), &AlwaysConfirm)
            .await
            .unwrap();
        assert_eq!(session.view().document_id, Some(DocumentId::from("a")));

        let outcome = session
            .delete_scene(&DocumentId::from("a"), &NeverConfirm)
            .await
            .unwrap();
        assert_eq!(outcome, RemoveOutcome::Declined);
        assert_eq!(session.view().phase, EditorPhase::Ready);
    }

    #[tokio::test]
    async fn test_delete_failure_shows_banner() {
        let store = scenes();
        store.fail(Op::Delete);
        let session = session_over(&store);
        session.start().await.unwrap();

        assert!(session
            .delete_scene(&DocumentId::from("a"), &AlwaysConfirm)
            .await
            .is_err());

        assert_eq!(session.view().error.as_deref(), Some(DELETE_FAILED));
        assert_eq!(session.library().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_scenes_keeps_pending_save_target() {
        let store = scenes();
        let session = session_over(&store);
        session.start().await.unwrap();

        session.edit_content("<p>In the very beginning</p>");
        session.select(DocumentId::from("b")).await;
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(store.stored("a").unwrap().content, "<p>In the very beginning</p>");
        assert_eq!(store.stored("b").unwrap().content, "<p>one</p>");
        assert_eq!(session.view().title, "Chapter One");
        assert!(matches!(session.view().save_status, SaveStatus::Saved(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselecting_open_scene_keeps_local_edit() {
        let store = scenes();
        let session = session_over(&store);
        session.start().await.unwrap();

        session.edit_content("<p>typed but not yet saved</p>");
        session.select(DocumentId::from("a")).await;
        assert_eq!(session.view().content, "<p>typed but not yet saved</p>");
        assert_eq!(store.count(Op::Get), 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(store.stored("a").unwrap().content, "<p>typed but not yet saved</p>");
        assert_eq!(session.view().content, "<p>typed but not yet saved</p>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_create_makes_one_scene() {
        let store = scenes();
        store.delay_create(Duration::from_millis(200));
        store.next_id("x");
        let session = session_over(&store);
        session.start().await.unwrap();

        let (first, second) = tokio::join!(session.create_scene(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(session.is_creating());
            session.create_scene().await
        });

        assert_eq!(first.unwrap(), DocumentId::from("x"));
        assert!(matches!(second, Err(SceneError::CreateInProgress)));
        assert_eq!(store.count(Op::Create), 1);
        assert_eq!(session.library().len(), 3);
        assert_eq!(session.view().document_id, Some(DocumentId::from("x")));
        assert_eq!(session.view().error, None);
    }
}
