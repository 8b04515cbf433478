//! Builder pattern for constructing EventManager instances.

use crate::dispatcher::{Dispatcher, FailureHook};
use crate::manager::config::EventManagerConfig;
use crate::registry::{EventRegistry, LockedRegistry};
use crate::{Error, EventManager};
use std::sync::Arc;
use tracing::info;

/// Builder for creating EventManager instances
#[allow(missing_debug_implementations)]
pub struct EventManagerBuilder {
    config: EventManagerConfig,
    registry: Option<Arc<dyn EventRegistry>>,
    failure_hook: Option<FailureHook>,
}

impl EventManagerBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EventManagerConfig::default(),
            registry: None,
            failure_hook: None,
        }
    }

    /// Use a custom configuration
    pub fn config(mut self, config: EventManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the event manager
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(EventManagerConfig) -> EventManagerConfig,
    {
        self.config = f(self.config);
        self
    }

    /// Use a custom registry implementation
    pub fn registry(mut self, registry: Arc<dyn EventRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Receive every listener panic the dispatcher isolates
    pub fn failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.failure_hook = Some(Arc::new(hook));
        self
    }

    /// Build with the strict (propagating) configuration
    pub fn strict(self) -> Self {
        self.config(EventManagerConfig::strict())
    }

    /// Build the EventManager
    pub fn build(self) -> EventManager {
        let registry = self.registry.unwrap_or_else(|| {
            Arc::new(LockedRegistry::with_capacity(self.config.registry_capacity))
        });

        let mut dispatcher = Dispatcher::new(self.config.dispatcher.clone(), registry.clone());
        if let Some(hook) = self.failure_hook {
            dispatcher = dispatcher.with_failure_hook(hook);
        }

        info!(
            failure_policy = ?self.config.dispatcher.failure_policy,
            "EventManager built"
        );

        EventManager {
            config: self.config,
            registry,
            dispatcher,
        }
    }
}

impl Default for EventManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
