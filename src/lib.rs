//! # event-manager
//!
//! A type-safe, hierarchy-aware, in-process event dispatcher.
//!
//! ## Features
//!
//! - **Keyed** listener registration with silent replacement
//! - **Polymorphic** routing: a listener for a base class receives every
//!   event whose declared ancestry reaches it
//! - **Catch-all** listeners that receive every event
//! - **Synchronous** delivery on the publishing thread
//! - **Thread-safe** registry; listeners may re-enter the manager
//!
//! ## Quick Example
//!
//! ```rust
//! use event_manager::{Event, EventClass, EventManager};
//! use event_manager::testing::RecordingListener;
//!
//! #[derive(Debug)]
//! struct OrderEvent;
//!
//! impl Event for OrderEvent {
//!     fn event_type() -> &'static str {
//!         "OrderEvent"
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct OrderPlaced {
//!     order_id: u64,
//! }
//!
//! impl Event for OrderPlaced {
//!     fn event_type() -> &'static str {
//!         "OrderPlaced"
//!     }
//!
//!     fn supertypes() -> Vec<EventClass> {
//!         vec![EventClass::of::<OrderEvent>()]
//!     }
//! }
//!
//! let manager = EventManager::new();
//!
//! // Listens for the base class, so it also sees OrderPlaced.
//! let orders = RecordingListener::new(vec![EventClass::of::<OrderEvent>()]);
//! manager.register("orders", orders.clone()).unwrap();
//!
//! manager.publish(&OrderPlaced { order_id: 7 });
//! assert_eq!(orders.count(), 1);
//!
//! manager.unregister("orders");
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    unreachable_pub
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Core event traits and the event class hierarchy
pub mod event;

/// Error types and result aliases
pub mod error;

/// Listener capability and adapters
pub mod listener;

/// Listener registry keyed by name and indexed by event class
pub mod registry;

/// Event dispatcher for routing events
pub mod dispatcher;

/// The main event manager implementation
pub mod manager;

/// Recording listeners for tests
pub mod testing;

// Re-export commonly used types
pub use dispatcher::{DispatchStats, DispatcherConfig, FailurePolicy};
pub use error::{Error, Result};
pub use event::{AnyEvent, Event, EventClass};
pub use listener::{EventListener, FunctionListener, TypedListener};
pub use manager::{EventManager, EventManagerBuilder, EventManagerConfig, ManagerStats};
pub use registry::{EventRegistry, LockedRegistry, Registration, RegistryStats};

/// Prelude module for convenient imports
///
/// # Example
/// ```rust
/// use event_manager::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::event::{AnyEvent, Event, EventClass};
    pub use crate::listener::EventListener;
    pub use crate::manager::{EventManager, EventManagerBuilder};
}
