//! The main EventManager implementation.
//!
//! The EventManager is the primary interface for registering listeners and
//! publishing events. It owns one registry and one dispatcher over it; there
//! is no global instance, callers construct and share it explicitly.

use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::event::{AnyEvent, Event, EventClass};
use crate::listener::{EventListener, FunctionListener, TypedListener};
use crate::registry::{EventRegistry, Registration, RegistryStats};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub mod builder;
pub mod config;

pub use builder::EventManagerBuilder;
pub use config::EventManagerConfig;

/// Registers listeners and publishes events to them.
///
/// All operations take `&self`; share the manager through an `Arc` to use it
/// from several threads.
///
/// # Example
///
/// ```rust
/// use event_manager::{Event, EventClass, EventManager};
///
/// #[derive(Debug)]
/// struct PaymentEvent {
///     amount: u64,
/// }
///
/// impl Event for PaymentEvent {
///     fn event_type() -> &'static str {
///         "PaymentEvent"
///     }
/// }
///
/// let manager = EventManager::new();
///
/// manager
///     .register_typed("payments", |event: &PaymentEvent| {
///         println!("paid {}", event.amount);
///     })
///     .unwrap();
///
/// manager.publish(&PaymentEvent { amount: 42 });
/// manager.unregister("payments");
/// ```
pub struct EventManager {
    pub(crate) config: EventManagerConfig,
    pub(crate) registry: Arc<dyn EventRegistry>,
    pub(crate) dispatcher: Dispatcher,
}

impl EventManager {
    /// Create an EventManager with the default configuration
    pub fn new() -> Self {
        EventManagerBuilder::new().build()
    }

    /// Create a new EventManager builder
    pub fn builder() -> EventManagerBuilder {
        EventManagerBuilder::new()
    }

    /// Register a listener under `key`.
    ///
    /// A listener already registered under `key` is replaced. Fails with
    /// [`Error::InvalidArgument`] if `key` is empty.
    pub fn register<L: EventListener>(&self, key: &str, listener: L) -> Result<()> {
        self.registry.register(key, Arc::new(listener))
    }

    /// Register a shared listener under `key`
    pub fn register_arc(&self, key: &str, listener: Arc<dyn EventListener>) -> Result<()> {
        self.registry.register(key, listener)
    }

    /// Register a listener that may be absent.
    ///
    /// Fails with [`Error::InvalidArgument`] for a `None` listener or an
    /// empty key.
    pub fn register_optional(
        &self,
        key: &str,
        listener: Option<Arc<dyn EventListener>>,
    ) -> Result<()> {
        let listener = listener.ok_or_else(|| {
            Error::invalid_argument(format!("The listener for '{key}' must not be absent"))
        })?;
        self.registry.register(key, listener)
    }

    /// Register a closure for the given classes; empty means every event
    pub fn register_fn<F>(&self, key: &str, classes: Vec<EventClass>, f: F) -> Result<()>
    where
        F: Fn(&dyn AnyEvent) + Send + Sync + 'static,
    {
        self.register(key, FunctionListener::new(classes, f).with_name(key))
    }

    /// Register a closure for events of concrete type `T`
    pub fn register_typed<T, F>(&self, key: &str, f: F) -> Result<()>
    where
        T: Event,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(key, TypedListener::with_name(f, key))
    }

    /// Unregister the listener under `key`.
    ///
    /// Returns whether a listener was removed; unknown keys are ignored.
    pub fn unregister(&self, key: &str) -> bool {
        self.registry.unregister(key)
    }

    /// Publish an event to every interested listener.
    ///
    /// Listeners run synchronously on this thread before `publish` returns.
    pub fn publish<E: Event>(&self, event: &E) {
        self.dispatcher.dispatch(event)
    }

    /// Publish a type-erased event
    pub fn publish_dyn(&self, event: &dyn AnyEvent) {
        self.dispatcher.dispatch(event)
    }

    /// Publish an event that may be absent.
    ///
    /// `None` is logged and counted, never dispatched and never an error.
    pub fn publish_optional(&self, event: Option<&dyn AnyEvent>) {
        self.dispatcher.dispatch_optional(event)
    }

    /// Copy of the current key -> listener mapping
    pub fn listeners(&self) -> HashMap<String, Arc<dyn EventListener>> {
        self.registry.listeners()
    }

    /// Whether a listener is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Registrations that would receive `event`, in invocation order
    pub fn matching(&self, event: &dyn AnyEvent) -> Vec<Arc<Registration>> {
        self.dispatcher.matching(event)
    }

    /// Get the configuration this manager was built with
    pub fn config(&self) -> &EventManagerConfig {
        &self.config
    }

    /// Get statistics about the event manager
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            registry: self.registry.stats(),
            dispatch: self.dispatcher.stats(),
        }
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Statistics about the event manager
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Registry statistics
    pub registry: RegistryStats,

    /// Dispatcher statistics
    pub dispatch: DispatchStats,
}

impl fmt::Display for ManagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EventManager Stats: {} listeners ({} catch-all), {} events published, {} listener failures",
            self.registry.listeners,
            self.registry.catch_all_listeners,
            self.dispatch.events_published,
            self.dispatch.listener_failures
        )
    }
}
