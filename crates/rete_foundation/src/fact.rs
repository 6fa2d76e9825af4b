//! Working-memory elements.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::{Attribute, EntityId};
use crate::value::Value;

/// The `(id, attribute)` identity of a fact.
///
/// Working memory holds at most one fact per slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotKey {
    /// The entity.
    pub id: EntityId,
    /// The attribute of the entity.
    pub attribute: Attribute,
}

impl SlotKey {
    /// Creates a slot key.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, attribute: impl Into<Attribute>) -> Self {
        Self {
            id: id.into(),
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.id, self.attribute)
    }
}

/// A working-memory element: `(id, attribute, value)`.
///
/// Facts are immutable; changing a value means adding a new fact for the
/// same slot, which replaces the old one.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fact {
    /// The entity this fact describes.
    pub id: EntityId,
    /// The attribute being described.
    pub attribute: Attribute,
    /// The attribute's value.
    pub value: Value,
}

impl Fact {
    /// Creates a fact.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        attribute: impl Into<Attribute>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Returns the slot this fact occupies.
    #[must_use]
    pub fn slot(&self) -> SlotKey {
        SlotKey {
            id: self.id.clone(),
            attribute: self.attribute.clone(),
        }
    }

    /// Returns true if this fact occupies `slot`.
    #[must_use]
    pub fn occupies(&self, slot: &SlotKey) -> bool {
        self.id == slot.id && self.attribute == slot.attribute
    }

    /// Returns a copy of this fact with its value bound to `var`.
    #[must_use]
    pub fn bound_to(&self, var: &Arc<str>) -> Self {
        Self {
            id: self.id.clone(),
            attribute: self.attribute.clone(),
            value: self.value.clone().bind(var),
        }
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fact({}, {}, {:?})", self.id, self.attribute, self.value)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.id, self.attribute, self.value)
    }
}
