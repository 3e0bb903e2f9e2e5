//! Event System
//!
//! Provides a pub/sub event bus so view layers can follow the library and
//! the editor without polling them.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

use crate::document::DocumentId;
use crate::status::SaveStatus;

/// Events emitted by the scene library and the editor
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Initial scene list arrived
    ListLoaded { count: usize },
    /// Active selection changed
    SelectionChanged(Option<DocumentId>),
    /// Editor finished loading a document
    DocumentLoaded(DocumentId),
    /// Editor went back to the empty state
    EditorCleared,
    /// Autosave status changed
    SaveStatusChanged(SaveStatus),
    /// New scene created
    DocumentCreated(DocumentId),
    /// Scene deleted
    DocumentDeleted(DocumentId),
    /// User-visible failure
    Error { message: String, details: Option<String> },
}

/// Subscriber handle for receiving events
#[derive(Clone)]
pub struct EventSubscription {
    receiver: Receiver<Event>,
}

impl EventSubscription {
    /// Receive the next event (blocking)
    pub fn recv(&self) -> Result<Event, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Everything queued right now, without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.receiver.try_iter().collect()
    }
}

/// Event bus for publish/subscribe pattern
pub struct EventBus {
    subscribers: RwLock<Vec<Sender<Event>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> EventSubscription {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        EventSubscription { receiver }
    }

    /// Emit an event to all subscribers, returning how many received it.
    /// Subscribers whose receiving end is gone are dropped.
    pub fn emit(&self, event: Event) -> usize {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        let delivered = subscribers.len();

        debug!("Event {:?} delivered to {} subscribers", event, delivered);
        delivered
    }

    /// Get the number of live subscribers as of the last emit
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
