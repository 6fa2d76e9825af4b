//! Production (terminal) nodes and the reports of the fire cycle.
//!
//! A production sits at the end of a join chain and queues complete
//! matches. Matching and acting are separate phases: tokens wait in the
//! pending table until [`Rete::fire`](crate::Rete::fire) drains it, and
//! actions run only then.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rete_foundation::{EntityId, Fact, Token};

use crate::condition::Condition;
use crate::ids::{JoinId, ProductionId};
use crate::memory::{Derived, KeyedMemory};
use crate::network::Rete;
use crate::retraction::MemoryHandle;

/// A production's right-hand side.
///
/// Actions receive the network itself and may add or retract facts and
/// register further productions. Calling `fire` from inside an action
/// fails with `ReentrantFire`.
pub type Action = Box<dyn FnMut(&mut Rete, &Token)>;

// =============================================================================
// Pending Matches
// =============================================================================

/// A complete match waiting for the next fire cycle.
#[derive(Clone, Debug)]
pub struct PendingMatch {
    /// Global queue position; lower was queued earlier.
    pub seq: u64,
    /// The matched facts, one per condition.
    pub token: Token,
}

impl Derived for PendingMatch {
    fn source_facts(&self) -> Vec<&Fact> {
        self.token.iter().collect()
    }
}

/// Where one rule instance (a production and a last-fact id) stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState {
    /// No pending match, and it did not fire in the latest cycle.
    Unmatched,
    /// Queued for the next fire cycle.
    Pending,
    /// Fired in the latest cycle and not matched again since.
    Fired,
}

// =============================================================================
// Production Node
// =============================================================================

/// A registered rule.
pub struct ProductionNode {
    name: Arc<str>,
    conditions: Vec<Condition>,
    join: JoinId,
    pending: KeyedMemory<PendingMatch>,
    action: Option<Action>,
    fired: BTreeSet<EntityId>,
    fire_count: u64,
}

impl ProductionNode {
    pub(crate) fn new(
        id: ProductionId,
        name: Arc<str>,
        conditions: Vec<Condition>,
        join: JoinId,
        action: Action,
    ) -> Self {
        Self {
            name,
            conditions,
            join,
            pending: KeyedMemory::new(MemoryHandle::Production(id)),
            action: Some(action),
            fired: BTreeSet::new(),
            fire_count: 0,
        }
    }

    /// The production's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The conditions, in declaration order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The last join of the production's chain.
    #[must_use]
    pub fn join(&self) -> JoinId {
        self.join
    }

    /// The pending table, keyed by last-fact id.
    #[must_use]
    pub fn pending(&self) -> &KeyedMemory<PendingMatch> {
        &self.pending
    }

    pub(crate) fn pending_mut(&mut self) -> &mut KeyedMemory<PendingMatch> {
        &mut self.pending
    }

    /// Pending tokens in queue order.
    #[must_use]
    pub fn pending_tokens(&self) -> Vec<&Token> {
        let mut queued: Vec<_> = self.pending.values().collect();
        queued.sort_by_key(|pending| pending.seq);
        queued.into_iter().map(|pending| &pending.token).collect()
    }

    /// Number of pending matches.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total number of times the action has run.
    #[must_use]
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// State of the instance whose last fact has id `id`.
    #[must_use]
    pub fn state(&self, id: &str) -> MatchState {
        if self.pending.contains_key(id) {
            MatchState::Pending
        } else if self.fired.contains(id) {
            MatchState::Fired
        } else {
            MatchState::Unmatched
        }
    }

    pub(crate) fn begin_cycle(&mut self, fired: impl IntoIterator<Item = EntityId>) {
        self.fired = fired.into_iter().collect();
    }

    pub(crate) fn take_action(&mut self) -> Option<Action> {
        self.action.take()
    }

    pub(crate) fn restore_action(&mut self, action: Action, ran: u64) {
        self.action = Some(action);
        self.fire_count += ran;
    }
}

impl fmt::Debug for ProductionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductionNode")
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("join", &self.join)
            .field("pending", &self.pending_tokens())
            .field("fire_count", &self.fire_count)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one fire cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FireReport {
    /// 1-based number of this cycle over the network's lifetime.
    pub cycle: usize,
    /// Actions run in this cycle.
    pub fired: usize,
    /// Matches queued by those actions, waiting for the next cycle.
    pub remaining: usize,
}

/// Outcome of [`Rete::run`](crate::Rete::run).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Fire cycles performed.
    pub cycles: usize,
    /// Actions run across all cycles.
    pub fired: usize,
}
