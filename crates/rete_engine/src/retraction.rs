//! Reverse index from fact slots to the memory entries derived from them.
//!
//! Every entry stored in an alpha memory, beta memory, or production is
//! registered here under the slot of each fact it contains. Retracting a
//! slot then touches only the entries listed for it instead of walking the
//! whole network.

use std::collections::{BTreeSet, HashMap};

use rete_foundation::{EntityId, SlotKey};

use crate::ids::{AlphaMemoryId, BetaMemoryId, ProductionId};

/// Which memory holds a derived entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryHandle {
    /// An alpha memory (stores facts).
    Alpha(AlphaMemoryId),
    /// A beta memory (stores tokens).
    Beta(BetaMemoryId),
    /// A production's pending-match table.
    Production(ProductionId),
}

/// Address of one derived entry: a memory and the key it is stored under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DerivativeRef {
    /// The owning memory.
    pub memory: MemoryHandle,
    /// The entity id the entry is keyed by.
    pub key: EntityId,
}

/// Slot → derived entries.
#[derive(Clone, Debug, Default)]
pub struct RetractionIndex {
    entries: HashMap<SlotKey, BTreeSet<DerivativeRef>>,
}

impl RetractionIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `derivative` was built from the fact in `slot`.
    pub fn register_derivative(&mut self, slot: SlotKey, derivative: DerivativeRef) {
        self.entries.entry(slot).or_default().insert(derivative);
    }

    /// Forgets one registration. Unknown registrations are ignored.
    pub fn unregister_derivative(&mut self, slot: &SlotKey, derivative: &DerivativeRef) {
        if let Some(set) = self.entries.get_mut(slot) {
            set.remove(derivative);
            if set.is_empty() {
                self.entries.remove(slot);
            }
        }
    }

    /// Removes and returns every registration for `slot`, in a stable order.
    pub fn take(&mut self, slot: &SlotKey) -> BTreeSet<DerivativeRef> {
        self.entries.remove(slot).unwrap_or_default()
    }

    /// Returns the registrations for `slot`.
    pub fn derivatives(&self, slot: &SlotKey) -> impl Iterator<Item = &DerivativeRef> {
        self.entries.get(slot).into_iter().flatten()
    }

    /// Returns true if `derivative` is registered under `slot`.
    #[must_use]
    pub fn contains(&self, slot: &SlotKey, derivative: &DerivativeRef) -> bool {
        self.entries
            .get(slot)
            .is_some_and(|set| set.contains(derivative))
    }

    /// Iterates every `(slot, derivative)` registration.
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &DerivativeRef)> {
        self.entries
            .iter()
            .flat_map(|(slot, set)| set.iter().map(move |d| (slot, d)))
    }

    /// Returns the number of slots with at least one registration.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the total number of registrations.
    #[must_use]
    pub fn derivative_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }
}
