//! Keyed storage shared by alpha memories, beta memories, and productions.
//!
//! [`KeyedMemory`] is the only way entries enter or leave a memory, and each
//! of its mutating methods takes the [`RetractionIndex`], so registering and
//! unregistering derivatives cannot be skipped.

use std::collections::BTreeMap;

use rete_foundation::{EntityId, Fact, SlotKey, Token};

use crate::retraction::{DerivativeRef, MemoryHandle, RetractionIndex};

/// An entry built from one or more facts.
pub trait Derived {
    /// Every fact the entry contains.
    fn source_facts(&self) -> Vec<&Fact>;

    /// Slots of every fact the entry contains.
    fn source_slots(&self) -> Vec<SlotKey> {
        self.source_facts().into_iter().map(Fact::slot).collect()
    }

    /// Returns true if the entry contains the fact in `slot`.
    fn derives_from(&self, slot: &SlotKey) -> bool {
        self.source_facts().iter().any(|fact| fact.occupies(slot))
    }
}

impl Derived for Fact {
    fn source_facts(&self) -> Vec<&Fact> {
        vec![self]
    }
}

impl Derived for Token {
    fn source_facts(&self) -> Vec<&Fact> {
        self.iter().collect()
    }
}

/// One entry per entity id, registered in the retraction index.
#[derive(Clone, Debug)]
pub struct KeyedMemory<T> {
    handle: MemoryHandle,
    entries: BTreeMap<EntityId, T>,
}

impl<T: Derived> KeyedMemory<T> {
    /// Creates an empty memory.
    #[must_use]
    pub fn new(handle: MemoryHandle) -> Self {
        Self {
            handle,
            entries: BTreeMap::new(),
        }
    }

    /// Returns the handle entries are registered under.
    #[must_use]
    pub fn handle(&self) -> MemoryHandle {
        self.handle
    }

    fn derivative(&self, key: &EntityId) -> DerivativeRef {
        DerivativeRef {
            memory: self.handle,
            key: key.clone(),
        }
    }

    /// Stores `entry` under `key`, replacing (and unregistering) any
    /// previous entry. Returns the replaced entry.
    pub fn insert(&mut self, key: EntityId, entry: T, index: &mut RetractionIndex) -> Option<T> {
        let derivative = self.derivative(&key);
        let previous = self.entries.remove(&key);
        if let Some(old) = &previous {
            for slot in old.source_slots() {
                index.unregister_derivative(&slot, &derivative);
            }
        }
        for slot in entry.source_slots() {
            index.register_derivative(slot, derivative.clone());
        }
        self.entries.insert(key, entry);
        previous
    }

    /// Removes the entry under `key` if it was built from the fact in
    /// `slot`, unregistering it from all of its other slots.
    pub fn retract(
        &mut self,
        key: &EntityId,
        slot: &SlotKey,
        index: &mut RetractionIndex,
    ) -> Option<T> {
        if !self.entries.get(key)?.derives_from(slot) {
            return None;
        }
        let entry = self.entries.remove(key)?;
        let derivative = self.derivative(key);
        for other in entry.source_slots() {
            index.unregister_derivative(&other, &derivative);
        }
        Some(entry)
    }

    /// Removes every entry, unregistering each. Entries come out in key order.
    pub fn drain(&mut self, index: &mut RetractionIndex) -> Vec<(EntityId, T)> {
        let entries = std::mem::take(&mut self.entries);
        for (key, entry) in &entries {
            let derivative = self.derivative(key);
            for slot in entry.source_slots() {
                index.unregister_derivative(&slot, &derivative);
            }
        }
        entries.into_iter().collect()
    }
}

impl<T> KeyedMemory<T> {
    /// Gets the entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Returns true if an entry is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &T)> {
        self.entries.iter()
    }

    /// Iterates stored values in key order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the memory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
