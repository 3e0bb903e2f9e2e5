//! Scenewright HTTP store
//!
//! [`DocumentStore`](scenewright_core::DocumentStore) adapter for a hosted
//! content API speaking the query / doc / mutate endpoints.

pub mod client;
pub mod wire;

pub use client::{HttpDocumentStore, HttpStoreError};
