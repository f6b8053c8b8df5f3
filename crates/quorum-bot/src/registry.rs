//! Handler registry: event-type keys to ordered handler lists.

use crate::handlers::EventHandler;
use std::sync::Arc;

/// Registry of event handlers, keyed by event-type string.
///
/// Populated during the load phase, then moved into the dispatcher; the
/// move is what makes it read-only while events are being processed, so
/// registration cannot race the event loop.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Vec<(String, Arc<dyn EventHandler>)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event-type key. Multiple handlers may
    /// share a key; they are invoked in registration order.
    pub fn register(&mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.entries.push((event_type.into(), handler));
    }

    /// All handlers registered for `event_type`, in registration order.
    pub fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.entries
            .iter()
            .filter(|(key, _)| key == event_type)
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
