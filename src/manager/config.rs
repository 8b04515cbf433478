//! Configuration for the event manager.

use crate::dispatcher::{DispatcherConfig, FailurePolicy};

/// Configuration for the event manager
#[derive(Debug, Clone)]
pub struct EventManagerConfig {
    /// Dispatcher configuration
    pub dispatcher: DispatcherConfig,

    /// Expected number of listeners, used to pre-size the registry
    pub registry_capacity: usize,
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherConfig::default(),
            registry_capacity: 16,
        }
    }
}

impl EventManagerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry capacity hint
    pub fn registry_capacity(mut self, capacity: usize) -> Self {
        self.registry_capacity = capacity;
        self
    }

    /// Configure dispatcher
    pub fn dispatcher_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatcherConfig) -> DispatcherConfig,
    {
        self.dispatcher = f(self.dispatcher);
        self
    }
}

/// Preset configurations for common use cases
impl EventManagerConfig {
    /// Listener panics unwind out of `publish` and stop the remaining
    /// deliveries for that event
    pub fn strict() -> Self {
        Self::default().dispatcher_config(|d| d.failure_policy(FailurePolicy::Propagate))
    }

    /// Configuration for testing
    pub fn test() -> Self {
        Self::default()
            .dispatcher_config(|d| d.warn_on_null_event(false))
            .registry_capacity(4)
    }
}
