//! Scenewright Editor
//!
//! Client-side state for the scene editor:
//! - Scene list with selection and search
//! - Editor state with optimistic edits
//! - Debounced autosave through the injected document store

pub mod confirm;
pub mod debounce;
pub mod editor;
pub mod library;
pub mod session;
pub mod word_count;

#[cfg(test)]
pub(crate) mod testing;

pub use confirm::{AlwaysConfirm, ConfirmGate, NeverConfirm};
pub use debounce::Debouncer;
pub use editor::{Editor, EditorPhase, EditorView, SaveRequest};
pub use library::{filter_summaries, Library, RemoveOutcome};
pub use session::Session;
pub use word_count::{count_words, word_label};
