//! Scenewright - scene editor with debounced autosave
//!
//! A sidebar of scenes backed by a hosted content store, an editor pane
//! with optimistic edits, and a debounced write-back.
//!
//! ## Architecture
//!
//! - `scenewright-core`: document model, store trait, config, errors, events
//! - `scenewright-editor`: scene library, editor state, autosave, session
//! - `scenewright-store-http`: adapter for the hosted content API
//!
//! This crate is the application root: it picks the store adapter from the
//! configuration and drives a [`Session`](scenewright_editor::Session) from
//! the terminal.

#![warn(clippy::all)]

pub mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use scenewright_core::config::StoreConfig;
use scenewright_core::{Document, DocumentStore, MemoryStore, StoreBackend};
use scenewright_store_http::HttpDocumentStore;

// Re-export main components for library usage
pub use scenewright_core as core;
pub use scenewright_editor as editor;
pub use scenewright_store_http as store_http;

/// Prelude module for convenient imports
pub mod prelude {
    pub use scenewright_core::{AppConfig, Document, DocumentId, DocumentStore, EventBus, SaveStatus};
    pub use scenewright_editor::{ConfirmGate, Editor, Library, Session};
}

/// Construct the document store selected by `config`
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    config.validate()?;
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory scene store");
            Ok(Arc::new(MemoryStore::with_documents([Document::new(
                "welcome",
                "Welcome",
                "<p>Start writing your first scene here.</p>",
            )])))
        }
        StoreBackend::Http => {
            let store = HttpDocumentStore::from_config(config)
                .context("Failed to set up the content store client")?;
            info!("Using content store at {}", store.base_url());
            Ok(Arc::new(store))
        }
    }
}
