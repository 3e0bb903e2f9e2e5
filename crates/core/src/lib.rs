//! Scenewright Core - shared types and the store boundary
//!
//! This crate provides the document model, the [`DocumentStore`] adapter
//! trait with an in-memory implementation, configuration, error types and
//! the event bus used by the editor and the front ends.

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod status;
pub mod store;

pub use config::{AppConfig, StoreBackend};
pub use document::{display_title, Document, DocumentFields, DocumentId, DocumentSummary, UNTITLED};
pub use error::{Result, SceneError, StoreError};
pub use events::{Event, EventBus, EventSubscription};
pub use status::SaveStatus;
pub use store::{DocumentStore, MemoryStore, StoreResult};

/// Scenewright version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Scenewright";
