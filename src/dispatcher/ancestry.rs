//! Per-type cache of resolved ancestor chains.

use crate::event::EventClass;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Remembers `EventClass::ancestors` per concrete type.
///
/// Declared hierarchies are static, so a chain resolved once stays valid
/// for the life of the process.
#[derive(Debug)]
pub(crate) struct AncestorCache {
    enabled: bool,
    resolved: Mutex<HashMap<TypeId, Arc<[EventClass]>>>,
}

impl AncestorCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// The class itself followed by its ancestors
    pub(crate) fn resolve(&self, class: EventClass) -> Arc<[EventClass]> {
        if !self.enabled {
            return class.ancestors().into();
        }

        if let Some(chain) = self.resolved.lock().get(&class.id()) {
            return chain.clone();
        }

        // Walk outside the lock; supertype declarations are user code.
        let chain: Arc<[EventClass]> = class.ancestors().into();
        self.resolved
            .lock()
            .entry(class.id())
            .or_insert(chain)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.resolved.lock().len()
    }
}
