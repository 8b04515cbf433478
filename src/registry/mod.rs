//! Listener registry for mapping keys and event classes to listeners.
//!
//! The registry owns the key -> registration map, which is the source of
//! truth, plus two indexes derived from it: registrations by declared event
//! class, and the catch-all list for listeners that declared nothing.

use crate::event::EventClass;
use crate::listener::EventListener;
use crate::Result;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;
use uuid::Uuid;

mod locked;
pub use locked::LockedRegistry;

/// One listener registered under one key.
///
/// Every `register` call creates a fresh registration with its own id, so a
/// listener re-registered under the same key is a different registration.
#[derive(Clone)]
pub struct Registration {
    id: Uuid,
    key: String,
    listener: Arc<dyn EventListener>,
    classes: Vec<EventClass>,
}

impl Registration {
    /// Create a registration, capturing the listener's declared classes
    pub fn new(key: impl Into<String>, listener: Arc<dyn EventListener>) -> Self {
        let mut classes: Vec<EventClass> = Vec::new();
        for class in listener.handled_event_classes() {
            if !classes.contains(&class) {
                classes.push(class);
            }
        }

        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            listener,
            classes,
        }
    }

    /// Unique ID for this registration
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Key the listener is registered under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The registered listener
    pub fn listener(&self) -> &Arc<dyn EventListener> {
        &self.listener
    }

    /// Declared classes as captured at registration, without duplicates
    pub fn classes(&self) -> &[EventClass] {
        &self.classes
    }

    /// Whether this registration receives every event
    pub fn is_catch_all(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("listener", &self.listener.name())
            .field("classes", &self.classes)
            .finish()
    }
}

/// Trait for registries that map keys and event classes to listeners.
///
/// Implementations must be thread-safe and keep the derived indexes
/// consistent with the key map at every observable instant.
pub trait EventRegistry: Send + Sync + Debug {
    /// Register `listener` under `key`, replacing any previous registration
    /// for that key. Fails if the key is empty.
    fn register(&self, key: &str, listener: Arc<dyn EventListener>) -> Result<()>;

    /// Remove the registration for `key`.
    ///
    /// Returns whether anything was removed; unknown keys are a no-op.
    fn unregister(&self, key: &str) -> bool;

    /// Registrations matching an event whose class and ancestors are
    /// `ancestors` (the event's own class first).
    ///
    /// Class matches come first in ancestor order, then catch-all
    /// registrations; each registration appears at most once.
    fn matching(&self, ancestors: &[EventClass]) -> Vec<Arc<Registration>>;

    /// Copy of the current key -> listener mapping
    fn listeners(&self) -> HashMap<String, Arc<dyn EventListener>>;

    /// Get the registration for a key
    fn get(&self, key: &str) -> Option<Arc<Registration>>;

    /// Get number of registered listeners
    fn len(&self) -> usize;

    /// Whether no listener is registered
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a listener is registered under `key`
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Get current registry statistics
    fn stats(&self) -> RegistryStats;

    /// Remove every registration
    fn clear(&self);
}

/// Registry statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered listeners
    pub listeners: usize,

    /// Number of catch-all listeners
    pub catch_all_listeners: usize,

    /// Number of distinct event classes with at least one listener
    pub indexed_classes: usize,
}
