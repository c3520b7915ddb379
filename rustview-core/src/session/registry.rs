//! Backend registry for looking up session backends by display type

use std::collections::HashMap;

use super::{EventSender, SessionBackend};
use crate::error::{SessionError, SessionResult};

/// Factory producing a backend wired to the given event sender
type BackendFactory = Box<dyn Fn(EventSender) -> Box<dyn SessionBackend>>;

/// Registry of session backend factories keyed by display type id
///
/// The embedder registers one factory per supported display protocol
/// (e.g. "vnc", "spice"); the controller creates the session for whatever
/// type the guest announces.
#[derive(Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a backend factory for a display type id
    ///
    /// Registering the same id twice replaces the earlier factory.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(EventSender) -> Box<dyn SessionBackend> + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// Creates a backend for the given display type
    ///
    /// # Errors
    /// Returns `SessionError::UnknownType` if no factory is registered.
    pub fn create(&self, id: &str, events: EventSender) -> SessionResult<Box<dyn SessionBackend>> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| SessionError::UnknownType(id.to_string()))?;
        Ok(factory(events))
    }

    /// Returns whether a factory is registered for the given id
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Returns all registered display type ids
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
