//! Runtime descriptor for event types and their declared hierarchy.

use super::Event;
use std::any::TypeId;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Describes one event type: its identity, name and direct supertypes.
///
/// Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct EventClass {
    id: TypeId,
    name: &'static str,
    supertypes: fn() -> Vec<EventClass>,
}

impl EventClass {
    /// The class of event type `E`
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::event_type(),
            supertypes: E::supertypes,
        }
    }

    /// Type identity used as the registry index key
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct supertypes as declared by the event type
    pub fn supertypes(&self) -> Vec<EventClass> {
        (self.supertypes)()
    }

    /// This class followed by every ancestor, breadth-first.
    ///
    /// Each class appears once even when the hierarchy is a diamond or
    /// (mistakenly) cyclic.
    pub fn ancestors(&self) -> Vec<EventClass> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([*self]);

        while let Some(class) = queue.pop_front() {
            if !seen.insert(class.id) {
                continue;
            }
            queue.extend(class.supertypes());
            order.push(class);
        }

        order
    }

    /// Whether every instance of `other` is also an instance of `self`.
    ///
    /// True for `self == other` and for any ancestor of `other`; siblings
    /// sharing a common ancestor are not assignable to each other.
    pub fn is_assignable_from(&self, other: &EventClass) -> bool {
        other.ancestors().iter().any(|ancestor| ancestor.id == self.id)
    }
}

impl PartialEq for EventClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventClass {}

impl Hash for EventClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventClass").field(&self.name).finish()
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
