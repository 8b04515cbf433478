//! Listener capability and ready-made adapters.

use crate::event::{AnyEvent, EventClass};

pub mod function;

pub use function::{FunctionListener, TypedListener};

/// Trait for anything that wants to receive published events.
///
/// A listener declares the classes it handles; an empty declaration makes it
/// a catch-all listener that receives every event. Declaring a class also
/// covers every event type that lists it as an ancestor.
///
/// Handling is synchronous and runs on the publisher's thread.
pub trait EventListener: Send + Sync + 'static {
    /// Process one event
    fn handle_event(&self, event: &dyn AnyEvent);

    /// Event classes this listener handles. Empty means all of them.
    ///
    /// Read once at registration; later changes are not picked up until the
    /// listener is registered again.
    fn handled_event_classes(&self) -> Vec<EventClass>;

    /// Get the listener name for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
