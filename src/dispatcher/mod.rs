//! Event dispatcher for routing events to listeners.
//!
//! The dispatcher resolves the ancestor chain of a published event's class,
//! asks the registry for the matching registrations and invokes each one
//! synchronously on the calling thread. The registry lock is released before
//! the first listener runs, so listeners may register, unregister or publish
//! re-entrantly; such changes take effect from the next publish.

use crate::event::AnyEvent;
use crate::registry::{EventRegistry, Registration};
use crate::Error;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, trace, warn};

mod ancestry;

use ancestry::AncestorCache;

/// Callback receiving listener failures the dispatcher isolated
pub type FailureHook = Arc<dyn Fn(&Error) + Send + Sync>;

/// What happens when a listener panics during dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Catch the panic, report it, keep delivering to the remaining listeners
    #[default]
    Isolate,

    /// Let the panic unwind out of `publish`; later listeners are skipped
    Propagate,
}

/// Configuration for the dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Listener failure handling
    pub failure_policy: FailurePolicy,

    /// Log a warning when an absent event is published
    pub warn_on_null_event: bool,

    /// Remember resolved ancestor chains per event type
    pub cache_ancestors: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            warn_on_null_event: true,
            cache_ancestors: true,
        }
    }
}

impl DispatcherConfig {
    /// Create a new dispatcher configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listener failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enable or disable the null event warning
    pub fn warn_on_null_event(mut self, warn: bool) -> Self {
        self.warn_on_null_event = warn;
        self
    }

    /// Enable or disable the ancestor cache
    pub fn cache_ancestors(mut self, enable: bool) -> Self {
        self.cache_ancestors = enable;
        self
    }
}

/// Statistics for the dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events published, excluding absent ones
    pub events_published: u64,

    /// Absent events that were skipped
    pub null_events: u64,

    /// Published events that matched no listener
    pub unmatched_events: u64,

    /// Deliveries to matching listeners.
    ///
    /// Counts routing, not handling: a listener that ignores an event it was
    /// routed (such as a `TypedListener` skipping a subtype it cannot
    /// downcast) still counts.
    pub listener_invocations: u64,

    /// Listener invocations that panicked and were isolated
    pub listener_failures: u64,

    /// Event types whose ancestor chain is cached
    pub cached_classes: usize,
}

#[derive(Debug, Default)]
struct Counters {
    events_published: AtomicU64,
    null_events: AtomicU64,
    unmatched_events: AtomicU64,
    listener_invocations: AtomicU64,
    listener_failures: AtomicU64,
}

/// Routes events to the listeners of a registry.
pub struct Dispatcher {
    config: DispatcherConfig,
    registry: Arc<dyn EventRegistry>,
    ancestors: AncestorCache,
    failure_hook: Option<FailureHook>,
    counters: Counters,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`
    pub fn new(config: DispatcherConfig, registry: Arc<dyn EventRegistry>) -> Self {
        Self {
            ancestors: AncestorCache::new(config.cache_ancestors),
            config,
            registry,
            failure_hook: None,
            counters: Counters::default(),
        }
    }

    /// Set the callback for isolated listener failures
    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.failure_hook = Some(hook);
        self
    }

    /// Get the dispatcher configuration
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Registrations that would receive `event` right now, in call order
    pub fn matching(&self, event: &dyn AnyEvent) -> Vec<Arc<Registration>> {
        let chain = self.ancestors.resolve(event.class());
        self.registry.matching(&chain)
    }

    /// Dispatch an event that may be absent.
    ///
    /// An absent event is recorded and skipped; it never panics or errors.
    pub fn dispatch_optional(&self, event: Option<&dyn AnyEvent>) {
        match event {
            Some(event) => self.dispatch(event),
            None => {
                self.counters.null_events.fetch_add(1, Ordering::Relaxed);
                if self.config.warn_on_null_event {
                    warn!("Null event published, nothing dispatched");
                }
            }
        }
    }

    /// Dispatch an event to every matching listener
    pub fn dispatch(&self, event: &dyn AnyEvent) {
        self.counters.events_published.fetch_add(1, Ordering::Relaxed);

        let matched = self.matching(event);

        if matched.is_empty() {
            self.counters.unmatched_events.fetch_add(1, Ordering::Relaxed);
            trace!(event_type = event.event_type(), "No listeners for event");
            return;
        }

        trace!(
            event_type = event.event_type(),
            listener_count = matched.len(),
            "Dispatching event"
        );

        for registration in &matched {
            self.invoke(registration, event);
        }
    }

    fn invoke(&self, registration: &Registration, event: &dyn AnyEvent) {
        self.counters
            .listener_invocations
            .fetch_add(1, Ordering::Relaxed);

        trace!(
            listener_key = %registration.key(),
            event_type = event.event_type(),
            "Invoking listener"
        );

        let listener = registration.listener();
        match self.config.failure_policy {
            FailurePolicy::Propagate => listener.handle_event(event),
            FailurePolicy::Isolate => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| listener.handle_event(event)));
                if let Err(payload) = result {
                    self.record_failure(registration, event, payload.as_ref());
                }
            }
        }
    }

    fn record_failure(
        &self,
        registration: &Registration,
        event: &dyn AnyEvent,
        payload: &(dyn Any + Send),
    ) {
        self.counters.listener_failures.fetch_add(1, Ordering::Relaxed);

        let err = Error::ListenerPanicked {
            key: registration.key().to_string(),
            listener: registration.listener().name().to_string(),
            event_type: event.event_type(),
            message: panic_message(payload),
        };

        error!(
            listener_key = %registration.key(),
            event_type = event.event_type(),
            error = %err,
            "Listener panicked, continuing dispatch"
        );

        if let Some(hook) = &self.failure_hook {
            hook(&err);
        }
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            events_published: self.counters.events_published.load(Ordering::Relaxed),
            null_events: self.counters.null_events.load(Ordering::Relaxed),
            unmatched_events: self.counters.unmatched_events.load(Ordering::Relaxed),
            listener_invocations: self.counters.listener_invocations.load(Ordering::Relaxed),
            listener_failures: self.counters.listener_failures.load(Ordering::Relaxed),
            cached_classes: self.ancestors.len(),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("has_failure_hook", &self.failure_hook.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventClass};
    use crate::listener::{EventListener, FunctionListener};
    use crate::registry::LockedRegistry;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct TestEvent;

    impl Event for TestEvent {
        fn event_type() -> &'static str {
            "TestEvent"
        }
    }

    fn recorder(
        log: &Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
        classes: Vec<EventClass>,
    ) -> Arc<dyn EventListener> {
        let log = log.clone();
        Arc::new(FunctionListener::new(classes, move |_| log.lock().push(label)))
    }

    fn panicking(classes: Vec<EventClass>) -> Arc<dyn EventListener> {
        Arc::new(FunctionListener::new(classes, |_| panic!("listener exploded")))
    }

    #[test]
    fn test_dispatcher_config() {
        let config = DispatcherConfig::new()
            .failure_policy(FailurePolicy::Propagate)
            .warn_on_null_event(false)
            .cache_ancestors(false);

        assert_eq!(config.failure_policy, FailurePolicy::Propagate);
        assert!(!config.warn_on_null_event);
        assert!(!config.cache_ancestors);
        assert_eq!(DispatcherConfig::default().failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn test_dispatch_counts() {
        let registry = Arc::new(LockedRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry
            .register("a", recorder(&log, "a", vec![EventClass::of::<TestEvent>()]))
            .unwrap();

        let dispatcher = Dispatcher::new(DispatcherConfig::default(), registry.clone());
        dispatcher.dispatch(&TestEvent);
        dispatcher.dispatch_optional(None);
        registry.unregister("a");
        dispatcher.dispatch(&TestEvent);

        assert_eq!(*log.lock(), vec!["a"]);
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                events_published: 2,
                null_events: 1,
                unmatched_events: 1,
                listener_invocations: 1,
                listener_failures: 0,
                cached_classes: 1,
            }
        );
    }

    #[test]
    fn test_isolate_keeps_delivering() {
        let registry = Arc::new(LockedRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry
            .register("boom", panicking(vec![EventClass::of::<TestEvent>()]))
            .unwrap();
        registry
            .register("after", recorder(&log, "after", Vec::new()))
            .unwrap();

        let failures = Arc::new(Mutex::new(Vec::new()));
        let failures_clone = failures.clone();
        let dispatcher = Dispatcher::new(DispatcherConfig::default(), registry).with_failure_hook(
            Arc::new(move |err: &Error| failures_clone.lock().push(err.clone())),
        );

        dispatcher.dispatch(&TestEvent);

        assert_eq!(*log.lock(), vec!["after"]);
        assert_eq!(dispatcher.stats().listener_failures, 1);

        let failures = failures.lock();
        assert_eq!(failures.len(), 1);
        match &failures[0] {
            Error::ListenerPanicked {
                key,
                event_type,
                message,
                ..
            } => {
                assert_eq!(key, "boom");
                assert_eq!(*event_type, "TestEvent");
                assert_eq!(message, "listener exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_propagate_unwinds_to_caller() {
        let registry = Arc::new(LockedRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry
            .register("boom", panicking(vec![EventClass::of::<TestEvent>()]))
            .unwrap();
        registry
            .register("after", recorder(&log, "after", Vec::new()))
            .unwrap();

        let dispatcher = Dispatcher::new(
            DispatcherConfig::new().failure_policy(FailurePolicy::Propagate),
            registry,
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(&TestEvent)));

        assert!(result.is_err());
        assert!(log.lock().is_empty());
        assert_eq!(dispatcher.stats().listener_failures, 0);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(7_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
