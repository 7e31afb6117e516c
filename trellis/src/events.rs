use std::collections::HashMap;
use tracing::trace;
use trellis_common::{Atom, Value};

/// Callback invoked when a declared event fires.
pub type EventHandler = Box<dyn FnMut(&Value)>;

/// Named event outputs of an adapter.
///
/// Events must be declared up front; subscribing to or emitting an undeclared
/// event is a silent no-op. This keeps the surface of an adapter fixed by its
/// manifest rather than by whoever subscribes first.
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<Atom, Option<EventHandler>>,
}

impl EventRegistry {
    pub fn new() -> EventRegistry {
        EventRegistry::default()
    }

    pub fn declare(&mut self, name: impl Into<Atom>) {
        self.handlers.entry(name.into()).or_insert(None);
    }

    pub fn declare_all<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<Atom>,
    {
        for name in names {
            self.declare(name);
        }
    }

    pub fn is_declared(&self, name: &Atom) -> bool {
        self.handlers.contains_key(name)
    }

    /// Attaches a handler. Returns `false` if the event was never declared.
    pub fn subscribe(&mut self, name: &Atom, handler: EventHandler) -> bool {
        match self.handlers.get_mut(name) {
            Some(slot) => {
                *slot = Some(handler);
                true
            }
            None => {
                trace!("ignored subscription to undeclared event {name}");
                false
            }
        }
    }

    /// Fires `name` with `payload`. Returns whether a handler ran.
    pub fn emit(&mut self, name: &Atom, payload: &Value) -> bool {
        match self.handlers.get_mut(name) {
            Some(Some(handler)) => {
                handler(payload);
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("EventRegistry").field("declared", &self.handlers.keys()).finish()
    }
}
