//! Core event traits and types.
//!
//! Rust has no class inheritance, so an event type states its place in the
//! hierarchy explicitly: [`Event::supertypes`] lists the classes it "is-a".
//! Listeners that declare a supertype receive every event whose ancestor
//! chain reaches it.

use std::any::Any;
use std::fmt::Debug;

pub mod class;

pub use class::EventClass;

/// Core trait that all events must implement.
///
/// # Example
///
/// ```rust
/// use event_manager::{Event, EventClass};
///
/// /// Base class for everything the order service emits.
/// #[derive(Debug)]
/// struct OrderEvent;
///
/// impl Event for OrderEvent {
///     fn event_type() -> &'static str {
///         "OrderEvent"
///     }
/// }
///
/// #[derive(Debug, Clone)]
/// struct OrderPlaced {
///     order_id: u64,
/// }
///
/// impl Event for OrderPlaced {
///     fn event_type() -> &'static str {
///         "OrderPlaced"
///     }
///
///     fn supertypes() -> Vec<EventClass> {
///         vec![EventClass::of::<OrderEvent>()]
///     }
/// }
///
/// let class = EventClass::of::<OrderPlaced>();
/// assert!(EventClass::of::<OrderEvent>().is_assignable_from(&class));
/// ```
pub trait Event: Any + Send + Sync + Debug {
    /// Returns the type name of this event.
    ///
    /// Used for logging and diagnostics. It should be stable and unique.
    fn event_type() -> &'static str
    where
        Self: Sized;

    /// Direct supertypes of this event type.
    ///
    /// Listeners registered for any of these classes, or for their own
    /// supertypes, receive events of this type.
    fn supertypes() -> Vec<EventClass>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// Object-safe view of an event, implemented for every [`Event`].
///
/// This is what listeners receive and what the dispatcher routes on.
pub trait AnyEvent: Any + Send + Sync + Debug {
    /// The class describing this event's concrete runtime type
    fn class(&self) -> EventClass;

    /// Convert this event into a type-erased `Any` reference
    fn as_any(&self) -> &dyn Any;
}

impl<T: Event> AnyEvent for T {
    fn class(&self) -> EventClass {
        EventClass::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyEvent {
    /// Type name of the concrete event
    pub fn event_type(&self) -> &'static str {
        self.class().name()
    }

    /// Check if the concrete event type is `T`
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Try to downcast to a specific event type
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
