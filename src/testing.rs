//! Test helpers for code that publishes or listens to events.

use crate::event::{AnyEvent, EventClass};
use crate::listener::EventListener;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A listener that records what it was given.
///
/// Clones share the same record, so keep one clone for assertions and
/// register the other.
///
/// ```rust
/// use event_manager::testing::RecordingListener;
/// use event_manager::{Event, EventManager};
///
/// #[derive(Debug)]
/// struct Ping;
///
/// impl Event for Ping {
///     fn event_type() -> &'static str {
///         "Ping"
///     }
/// }
///
/// let manager = EventManager::new();
/// let spy = RecordingListener::catch_all();
/// manager.register("spy", spy.clone()).unwrap();
///
/// manager.publish(&Ping);
/// assert_eq!(spy.count(), 1);
/// assert_eq!(spy.seen(), vec!["Ping"]);
/// ```
#[derive(Clone)]
pub struct RecordingListener {
    inner: Arc<Record>,
}

struct Record {
    classes: Vec<EventClass>,
    called: AtomicBool,
    count: AtomicUsize,
    seen: Mutex<Vec<&'static str>>,
}

impl RecordingListener {
    /// A recorder for the given classes
    pub fn new(classes: Vec<EventClass>) -> Self {
        Self {
            inner: Arc::new(Record {
                classes,
                called: AtomicBool::new(false),
                count: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A recorder that receives every event
    pub fn catch_all() -> Self {
        Self::new(Vec::new())
    }

    /// Whether an event arrived since creation or the last reset
    pub fn is_called(&self) -> bool {
        self.inner.called.load(Ordering::SeqCst)
    }

    /// Clear the called flag; the count is kept
    pub fn reset_called(&self) {
        self.inner.called.store(false, Ordering::SeqCst);
    }

    /// Number of events handled
    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Type names of the handled events, in arrival order
    pub fn seen(&self) -> Vec<&'static str> {
        self.inner.seen.lock().clone()
    }
}

impl EventListener for RecordingListener {
    fn handle_event(&self, event: &dyn AnyEvent) {
        self.inner.seen.lock().push(event.event_type());
        self.inner.count.fetch_add(1, Ordering::SeqCst);
        self.inner.called.store(true, Ordering::SeqCst);
    }

    fn handled_event_classes(&self) -> Vec<EventClass> {
        self.inner.classes.clone()
    }

    fn name(&self) -> &str {
        "RecordingListener"
    }
}

impl fmt::Debug for RecordingListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingListener")
            .field("classes", &self.inner.classes)
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}
