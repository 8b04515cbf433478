//! Lock-guarded implementation of EventRegistry.

use super::{EventRegistry, Registration, RegistryStats};
use crate::event::EventClass;
use crate::listener::EventListener;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct RegistryState {
    /// Source of truth: key -> registration
    entries: HashMap<String, Arc<Registration>>,

    /// Declared class -> registrations, in registration order
    by_class: HashMap<TypeId, Vec<Arc<Registration>>>,

    /// Registrations with an empty declaration, in registration order
    catch_all: Vec<Arc<Registration>>,
}

impl RegistryState {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            by_class: HashMap::with_capacity(capacity),
            catch_all: Vec::new(),
        }
    }

    fn insert(&mut self, registration: Arc<Registration>) {
        if registration.is_catch_all() {
            self.catch_all.push(registration.clone());
        } else {
            for class in registration.classes() {
                self.by_class
                    .entry(class.id())
                    .or_default()
                    .push(registration.clone());
            }
        }

        self.entries
            .insert(registration.key().to_string(), registration);
    }

    fn remove(&mut self, key: &str) -> Option<Arc<Registration>> {
        let registration = self.entries.remove(key)?;
        let id = registration.id();

        if registration.is_catch_all() {
            self.catch_all.retain(|r| r.id() != id);
        } else {
            for class in registration.classes() {
                if let Some(bucket) = self.by_class.get_mut(&class.id()) {
                    bucket.retain(|r| r.id() != id);

                    // Drop the bucket once nobody listens for this class
                    if bucket.is_empty() {
                        self.by_class.remove(&class.id());
                    }
                }
            }
        }

        Some(registration)
    }
}

/// A thread-safe registry guarded by a single read-write lock.
///
/// The key map and both indexes live behind the same lock, so writers
/// (`register`, `unregister`) always leave them consistent and readers
/// (`matching`) never observe a half-applied change. Matching clones `Arc`
/// handles and releases the lock before any listener runs.
#[derive(Debug, Clone)]
pub struct LockedRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl LockedRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
        }
    }

    /// Create a registry with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::with_capacity(capacity))),
        }
    }
}

impl Default for LockedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry for LockedRegistry {
    fn register(&self, key: &str, listener: Arc<dyn EventListener>) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_argument(
                "Key for the listener must not be empty",
            ));
        }

        let registration = Arc::new(Registration::new(key, listener));

        trace!(
            listener_key = %key,
            registration_id = %registration.id(),
            classes = ?registration.classes(),
            "Registering listener"
        );

        // The replaced registration is dropped only after the guard, since the
        // listener's own Drop may call back into the registry.
        let previous = {
            let mut state = self.state.write();
            let previous = state.remove(key);
            state.insert(registration.clone());
            previous
        };

        if let Some(previous) = previous {
            debug!(
                listener_key = %key,
                previous_id = %previous.id(),
                "Replacing existing listener"
            );
        }

        debug!(
            listener_key = %key,
            listener = registration.listener().name(),
            catch_all = registration.is_catch_all(),
            "Listener registered"
        );

        Ok(())
    }

    fn unregister(&self, key: &str) -> bool {
        let removed = self.state.write().remove(key);

        match removed {
            Some(registration) => {
                debug!(
                    listener_key = %key,
                    registration_id = %registration.id(),
                    "Listener unregistered"
                );
                true
            }
            None => {
                trace!(listener_key = %key, "Unregister of unknown key ignored");
                false
            }
        }
    }

    fn matching(&self, ancestors: &[EventClass]) -> Vec<Arc<Registration>> {
        let state = self.state.read();
        let mut seen = HashSet::new();
        let mut matched = Vec::new();

        let by_class = ancestors
            .iter()
            .filter_map(|class| state.by_class.get(&class.id()))
            .flatten();

        for registration in by_class.chain(state.catch_all.iter()) {
            if seen.insert(registration.id()) {
                matched.push(registration.clone());
            }
        }

        matched
    }

    fn listeners(&self) -> HashMap<String, Arc<dyn EventListener>> {
        self.state
            .read()
            .entries
            .iter()
            .map(|(key, registration)| (key.clone(), registration.listener().clone()))
            .collect()
    }

    fn get(&self, key: &str) -> Option<Arc<Registration>> {
        self.state.read().entries.get(key).cloned()
    }

    fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    fn stats(&self) -> RegistryStats {
        let state = self.state.read();
        RegistryStats {
            listeners: state.entries.len(),
            catch_all_listeners: state.catch_all.len(),
            indexed_classes: state.by_class.len(),
        }
    }

    fn clear(&self) {
        let cleared = std::mem::take(&mut *self.state.write());
        debug!(listeners = cleared.entries.len(), "Registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AnyEvent, Event};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct BaseEvent;

    impl Event for BaseEvent {
        fn event_type() -> &'static str {
            "BaseEvent"
        }
    }

    #[derive(Debug)]
    struct TestEvent;

    impl Event for TestEvent {
        fn event_type() -> &'static str {
            "TestEvent"
        }

        fn supertypes() -> Vec<EventClass> {
            vec![EventClass::of::<BaseEvent>()]
        }
    }

    #[derive(Debug)]
    struct AnotherEvent;

    impl Event for AnotherEvent {
        fn event_type() -> &'static str {
            "AnotherEvent"
        }
    }

    struct Declared(Vec<EventClass>);

    impl EventListener for Declared {
        fn handle_event(&self, _event: &dyn AnyEvent) {}

        fn handled_event_classes(&self) -> Vec<EventClass> {
            self.0.clone()
        }
    }

    fn listener(classes: Vec<EventClass>) -> Arc<dyn EventListener> {
        Arc::new(Declared(classes))
    }

    fn keys(matched: &[Arc<Registration>]) -> Vec<&str> {
        matched.iter().map(|r| r.key()).collect()
    }

    #[test]
    fn test_register_and_match() {
        let registry = LockedRegistry::new();
        registry
            .register("test", listener(vec![EventClass::of::<TestEvent>()]))
            .unwrap();

        let matched = registry.matching(&EventClass::of::<TestEvent>().ancestors());
        assert_eq!(keys(&matched), vec!["test"]);

        let matched = registry.matching(&EventClass::of::<AnotherEvent>().ancestors());
        assert!(matched.is_empty());
    }

    #[test]
    fn test_register_rejects_empty_key() {
        let registry = LockedRegistry::new();
        let err = registry.register("", listener(Vec::new())).unwrap_err();

        assert!(err.is_invalid_argument());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_match_order_and_dedup() {
        let registry = LockedRegistry::new();
        registry.register("all", listener(Vec::new())).unwrap();
        registry
            .register("base", listener(vec![EventClass::of::<BaseEvent>()]))
            .unwrap();
        registry
            .register(
                "both",
                listener(vec![
                    EventClass::of::<BaseEvent>(),
                    EventClass::of::<TestEvent>(),
                ]),
            )
            .unwrap();

        let matched = registry.matching(&EventClass::of::<TestEvent>().ancestors());

        // Own class first, then ancestors, then catch-all; "both" only once.
        assert_eq!(keys(&matched), vec!["both", "base", "all"]);
    }

    #[test]
    fn test_unregister_cleans_every_index() {
        let registry = LockedRegistry::new();
        registry
            .register(
                "multi",
                listener(vec![
                    EventClass::of::<TestEvent>(),
                    EventClass::of::<AnotherEvent>(),
                ]),
            )
            .unwrap();
        registry.register("all", listener(Vec::new())).unwrap();

        assert_eq!(
            registry.stats(),
            RegistryStats {
                listeners: 2,
                catch_all_listeners: 1,
                indexed_classes: 2,
            }
        );

        assert!(registry.unregister("multi"));
        assert!(registry.unregister("all"));

        assert_eq!(registry.stats(), RegistryStats::default());
        assert!(registry
            .matching(&EventClass::of::<TestEvent>().ancestors())
            .is_empty());
    }

    #[test]
    fn test_unregister_unknown_key() {
        let registry = LockedRegistry::new();
        registry.register("kept", listener(Vec::new())).unwrap();

        assert!(!registry.unregister("missing"));
        assert!(!registry.unregister(""));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregister_replaces() {
        let registry = LockedRegistry::new();
        registry
            .register("key", listener(vec![EventClass::of::<TestEvent>()]))
            .unwrap();
        let first_id = registry.get("key").unwrap().id();

        registry
            .register("key", listener(vec![EventClass::of::<AnotherEvent>()]))
            .unwrap();
        let second = registry.get("key").unwrap();

        assert_ne!(second.id(), first_id);
        assert_eq!(registry.len(), 1);
        assert!(registry
            .matching(&EventClass::of::<TestEvent>().ancestors())
            .is_empty());
        assert_eq!(
            keys(&registry.matching(&EventClass::of::<AnotherEvent>().ancestors())),
            vec!["key"]
        );
        assert_eq!(registry.stats().indexed_classes, 1);
    }

    #[test]
    fn test_listeners_is_a_copy() {
        let registry = LockedRegistry::new();
        registry.register("a", listener(Vec::new())).unwrap();

        let mut copy = registry.listeners();
        copy.clear();
        copy.insert("b".to_string(), listener(Vec::new()));

        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
        assert_eq!(registry.listeners().len(), 1);
    }

    #[test]
    fn test_clear() {
        let registry = LockedRegistry::with_capacity(4);
        registry
            .register("a", listener(vec![EventClass::of::<TestEvent>()]))
            .unwrap();
        registry.register("b", listener(Vec::new())).unwrap();

        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.stats(), RegistryStats::default());
    }

    /// Calls back into the registry when dropped.
    struct ReentrantOnDrop {
        registry: LockedRegistry,
        dropped: Arc<AtomicBool>,
    }

    impl EventListener for ReentrantOnDrop {
        fn handle_event(&self, _event: &dyn AnyEvent) {}

        fn handled_event_classes(&self) -> Vec<EventClass> {
            vec![EventClass::of::<TestEvent>()]
        }
    }

    impl Drop for ReentrantOnDrop {
        fn drop(&mut self) {
            self.registry.unregister("companion");
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_replaced_listener_dropped_outside_lock() {
        let registry = LockedRegistry::new();
        let dropped = Arc::new(AtomicBool::new(false));

        registry.register("companion", listener(Vec::new())).unwrap();
        registry
            .register(
                "key",
                Arc::new(ReentrantOnDrop {
                    registry: registry.clone(),
                    dropped: dropped.clone(),
                }),
            )
            .unwrap();

        registry.register("key", listener(Vec::new())).unwrap();

        assert!(dropped.load(Ordering::SeqCst));
        assert!(!registry.contains("companion"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_cleared_listeners_dropped_outside_lock() {
        let registry = LockedRegistry::new();
        let dropped = Arc::new(AtomicBool::new(false));

        registry
            .register(
                "key",
                Arc::new(ReentrantOnDrop {
                    registry: registry.clone(),
                    dropped: dropped.clone(),
                }),
            )
            .unwrap();

        registry.clear();

        assert!(dropped.load(Ordering::SeqCst));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = LockedRegistry::new();
        let other = registry.clone();

        other.register("shared", listener(Vec::new())).unwrap();
        assert!(registry.contains("shared"));
    }
}
