//! Closure-backed listener implementations.

use super::EventListener;
use crate::event::{AnyEvent, Event, EventClass};
use std::fmt;
use std::marker::PhantomData;
use tracing::trace;

/// A listener built from a closure over type-erased events.
///
/// ```rust
/// use event_manager::{AnyEvent, FunctionListener};
///
/// let audit = FunctionListener::catch_all(|event: &dyn AnyEvent| {
///     println!("saw {}", event.event_type());
/// });
/// ```
pub struct FunctionListener<F>
where
    F: Fn(&dyn AnyEvent) + Send + Sync + 'static,
{
    function: F,
    classes: Vec<EventClass>,
    name: String,
}

impl<F> FunctionListener<F>
where
    F: Fn(&dyn AnyEvent) + Send + Sync + 'static,
{
    /// Create a listener for the given classes
    pub fn new(classes: Vec<EventClass>, function: F) -> Self {
        let name = format!(
            "FunctionListener<{}>",
            classes
                .iter()
                .map(EventClass::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self {
            function,
            classes,
            name,
        }
    }

    /// Create a listener that receives every event
    pub fn catch_all(function: F) -> Self {
        Self {
            function,
            classes: Vec::new(),
            name: "FunctionListener<*>".to_string(),
        }
    }

    /// Set a custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> EventListener for FunctionListener<F>
where
    F: Fn(&dyn AnyEvent) + Send + Sync + 'static,
{
    fn handle_event(&self, event: &dyn AnyEvent) {
        (self.function)(event)
    }

    fn handled_event_classes(&self) -> Vec<EventClass> {
        self.classes.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FunctionListener<F>
where
    F: Fn(&dyn AnyEvent) + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionListener")
            .field("name", &self.name)
            .field("classes", &self.classes)
            .finish()
    }
}

/// A listener for a single concrete event type.
///
/// Registered for `EventClass::of::<T>()`. Events whose concrete type is a
/// subtype of `T` are routed here too, but cannot be downcast to `T`; those
/// are skipped.
pub struct TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync + 'static,
{
    function: F,
    name: String,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F> TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync + 'static,
{
    /// Create a new typed listener
    pub fn new(function: F) -> Self {
        Self {
            function,
            name: format!("TypedListener<{}>", T::event_type()),
            _phantom: PhantomData,
        }
    }

    /// Create a new typed listener with a custom name
    pub fn with_name(function: F, name: impl Into<String>) -> Self {
        Self {
            function,
            name: name.into(),
            _phantom: PhantomData,
        }
    }
}

impl<T, F> EventListener for TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync + 'static,
{
    fn handle_event(&self, event: &dyn AnyEvent) {
        match event.downcast_ref::<T>() {
            Some(event) => (self.function)(event),
            None => trace!(
                listener = %self.name,
                event_type = event.event_type(),
                "Skipping subtype event a typed listener cannot downcast"
            ),
        }
    }

    fn handled_event_classes(&self) -> Vec<EventClass> {
        vec![EventClass::of::<T>()]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T, F> fmt::Debug for TypedListener<T, F>
where
    T: Event,
    F: Fn(&T) + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedListener")
            .field("name", &self.name)
            .field("event_type", &T::event_type())
            .finish()
    }
}
