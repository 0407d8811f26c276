//! Handler registry for inbound events

use crate::protocol::{EventKind, InboundEvent};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Boxed event handler returning a reaction of type `R`
pub type EventHandler<R> = Box<dyn FnMut(&InboundEvent) -> R + Send>;

/// Routes inbound events to at most one handler per [`EventKind`]
pub struct EventDispatcher<R = ()> {
    handlers: HashMap<EventKind, EventHandler<R>>,
}

impl<R> std::fmt::Debug for EventDispatcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<R> Default for EventDispatcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> EventDispatcher<R> {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `kind`, returning the handler it replaces
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> Option<EventHandler<R>>
    where
        F: FnMut(&InboundEvent) -> R + Send + 'static,
    {
        let previous = self.handlers.insert(kind, Box::new(handler));
        if previous.is_some() {
            debug!("Replaced handler for {}", kind.as_str());
        }
        previous
    }

    /// Remove the handler for `kind`
    pub fn off(&mut self, kind: EventKind) -> Option<EventHandler<R>> {
        self.handlers.remove(&kind)
    }

    /// Whether a handler is registered for `kind`
    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Run the handler registered for the event's kind, if any
    pub fn dispatch(&mut self, event: &InboundEvent) -> Option<R> {
        match self.handlers.get_mut(&event.kind()) {
            Some(handler) => Some(handler(event)),
            None => {
                trace!("No handler for {}", event.kind().as_str());
                None
            }
        }
    }
}
