//! The [`Rete`] network: fact store, propagation, retraction, and the fire
//! cycle.
//!
//! # Propagation
//!
//! `add` stores a fact and routes it through the alpha network. Every alpha
//! memory it reaches right-activates its join nodes; tokens a join produces
//! go to the join's beta memory (which left-activates the next joins) and to
//! the productions ending there. Everything runs to completion before `add`
//! returns.
//!
//! # Retraction
//!
//! Memory entries are registered in the [`RetractionIndex`] under the slot
//! of every fact they contain, so `retract` removes exactly the entries
//! that index lists for the slot.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use rete_engine::{Condition, Rete, Variable};
//! use rete_foundation::Fact;
//!
//! let mut rete = Rete::new();
//! let fired = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&fired);
//! rete.production(
//!     vec![
//!         Condition::new("x", "on-top-of", Variable::new("y")),
//!         Condition::on("y").attr("weight").gt(10),
//!     ],
//!     move |_, _| counter.set(counter.get() + 1),
//! )
//! .unwrap();
//!
//! rete.add(Fact::new("a", "on-top-of", "b"))
//!     .add(Fact::new("b", "weight", 11));
//! rete.fire().unwrap();
//! assert_eq!(fired.get(), 1);
//! ```

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rete_foundation::{
    Error, ErrorContext, Fact, Result, SemanticLimit, SlotKey, Token,
};

use crate::alpha::AlphaNetwork;
use crate::beta::{BetaNetwork, join_test};
use crate::condition::Condition;
use crate::config::ReteConfig;
use crate::ids::{AlphaMemoryId, BetaMemoryId, JoinId, ProductionId};
use crate::memory::Derived;
use crate::production::{
    Action, FireReport, MatchState, PendingMatch, ProductionNode, RunReport,
};
use crate::retraction::{DerivativeRef, MemoryHandle, RetractionIndex};

/// An incremental production-rule matcher.
#[derive(Debug)]
pub struct Rete {
    config: ReteConfig,
    facts: BTreeMap<SlotKey, Fact>,
    alpha: AlphaNetwork,
    beta: BetaNetwork,
    productions: Vec<ProductionNode>,
    index: RetractionIndex,
    next_seq: u64,
    firing: bool,
    cycles: usize,
}

impl Default for Rete {
    fn default() -> Self {
        Self::new()
    }
}

impl Rete {
    /// Creates an empty network with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ReteConfig::default())
    }

    /// Creates an empty network.
    #[must_use]
    pub fn with_config(config: ReteConfig) -> Self {
        Self {
            config,
            facts: BTreeMap::new(),
            alpha: AlphaNetwork::new(),
            beta: BetaNetwork::new(),
            productions: Vec::new(),
            index: RetractionIndex::new(),
            next_seq: 0,
            firing: false,
            cycles: 0,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ReteConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Fact Store
    // -------------------------------------------------------------------------

    /// Adds a fact, replacing any fact already in its slot.
    pub fn add(&mut self, fact: Fact) -> &mut Self {
        let slot = fact.slot();
        if self.facts.contains_key(&slot) {
            self.retract_slot(&slot);
        }
        tracing::debug!(fact = %fact, "adding fact");
        self.facts.insert(slot, fact.clone());
        self.propagate(&fact);
        self
    }

    /// Retracts the fact occupying `fact`'s slot, along with everything
    /// derived from it. The value of `fact` is not compared. Unknown facts
    /// are ignored.
    pub fn retract(&mut self, fact: &Fact) -> &mut Self {
        self.retract_slot(&fact.slot());
        self
    }

    /// Retracts the fact in `slot`, returning it if there was one.
    pub fn retract_slot(&mut self, slot: &SlotKey) -> Option<Fact> {
        let derivatives = self.index.take(slot);
        let removed = self.facts.remove(slot);
        if removed.is_some() {
            tracing::debug!(
                slot = %slot,
                derivatives = derivatives.len(),
                "retracting fact"
            );
        }
        for derivative in &derivatives {
            self.remove_derivative(derivative, slot);
        }
        removed
    }

    fn remove_derivative(&mut self, derivative: &DerivativeRef, slot: &SlotKey) {
        let key = &derivative.key;
        let removed = match derivative.memory {
            MemoryHandle::Alpha(id) => self
                .alpha
                .memory_mut(id)
                .facts_mut()
                .retract(key, slot, &mut self.index)
                .is_some(),
            MemoryHandle::Beta(id) => self
                .beta
                .memory_mut(id)
                .tokens_mut()
                .retract(key, slot, &mut self.index)
                .is_some(),
            MemoryHandle::Production(id) => self.productions[id.index()]
                .pending_mut()
                .retract(key, slot, &mut self.index)
                .is_some(),
        };
        if removed {
            tracing::trace!(memory = ?derivative.memory, key = %key, "dropped derivative");
        }
    }

    /// Gets the active fact for `(id, attribute)`.
    #[must_use]
    pub fn get(&self, id: &str, attribute: &str) -> Option<&Fact> {
        self.facts.get(&SlotKey::new(id, attribute))
    }

    /// Returns true if exactly this fact (same slot and value) is active.
    #[must_use]
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.get(&fact.slot()) == Some(fact)
    }

    /// Iterates active facts in slot order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Number of active facts.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    // -------------------------------------------------------------------------
    // Propagation
    // -------------------------------------------------------------------------

    fn propagate(&mut self, fact: &Fact) {
        for (memory, passed) in self.alpha.activate(fact) {
            self.alpha_memory_insert(memory, passed);
        }
    }

    fn alpha_memory_insert(&mut self, memory: AlphaMemoryId, fact: Fact) {
        tracing::trace!(%memory, fact = ?fact, "alpha memory insert");
        self.alpha
            .memory_mut(memory)
            .facts_mut()
            .insert(fact.id.clone(), fact.clone(), &mut self.index);
        let successors = self.alpha.memory(memory).successors().to_vec();
        for join in successors {
            self.right_activate(join, &fact);
        }
    }

    fn right_activate(&mut self, join: JoinId, fact: &Fact) {
        let policy = self.config.join_policy;
        for token in self.beta.left_tokens(join) {
            if join_test(policy, &token, fact) {
                self.emit(join, token.extended(fact.clone()));
            }
        }
    }

    fn left_activate(&mut self, join: JoinId, token: &Token) {
        let policy = self.config.join_policy;
        let alpha_memory = self.beta.join(join).alpha_memory();
        let facts: Vec<Fact> = self.alpha.memory(alpha_memory).facts().values().cloned().collect();
        for fact in facts {
            if join_test(policy, token, &fact) {
                self.emit(join, token.extended(fact));
            }
        }
    }

    /// Complete tokens `join` would produce from its current inputs.
    fn join_outputs(&self, join: JoinId) -> Vec<Token> {
        let policy = self.config.join_policy;
        let facts = self.alpha.memory(self.beta.join(join).alpha_memory()).facts();
        let mut outputs = Vec::new();
        for token in self.beta.left_tokens(join) {
            for fact in facts.values() {
                if join_test(policy, &token, fact) {
                    outputs.push(token.extended(fact.clone()));
                }
            }
        }
        outputs
    }

    fn emit(&mut self, join: JoinId, token: Token) {
        tracing::trace!(%join, token = %token, "join matched");
        let node = self.beta.join(join);
        let memory = node.memory();
        let productions = node.productions().to_vec();
        for production in productions {
            self.production_insert(production, token.clone());
        }
        if let Some(memory) = memory {
            self.beta_memory_insert(memory, token);
        }
    }

    fn beta_memory_insert(&mut self, memory: BetaMemoryId, token: Token) {
        let Some(key) = token.last().map(|fact| fact.id.clone()) else {
            return;
        };
        self.beta
            .memory_mut(memory)
            .tokens_mut()
            .insert(key, token.clone(), &mut self.index);
        let children = self.beta.memory(memory).children().to_vec();
        for child in children {
            self.left_activate(child, &token);
        }
    }

    fn production_insert(&mut self, production: ProductionId, token: Token) {
        let Some(key) = token.last().map(|fact| fact.id.clone()) else {
            return;
        };
        // An overwritten match keeps its place in the queue.
        let queued = self.productions[production.index()]
            .pending()
            .get(key.as_str())
            .map(|pending| pending.seq);
        let seq = queued.unwrap_or_else(|| {
            let seq = self.next_seq;
            self.next_seq += 1;
            seq
        });
        tracing::trace!(%production, token = %token, "match queued");
        self.productions[production.index()].pending_mut().insert(
            key,
            PendingMatch { seq, token },
            &mut self.index,
        );
    }

    // -------------------------------------------------------------------------
    // Productions
    // -------------------------------------------------------------------------

    /// Registers a production named after its id.
    ///
    /// # Errors
    /// Returns `EmptyProduction` for an empty condition list and
    /// `MalformedCondition` for a condition that cannot be compiled.
    pub fn production<F>(
        &mut self,
        conditions: impl IntoIterator<Item = Condition>,
        action: F,
    ) -> Result<&mut Self>
    where
        F: FnMut(&mut Rete, &Token) + 'static,
    {
        self.register(None, conditions.into_iter().collect(), Box::new(action))?;
        Ok(self)
    }

    /// Registers a named production and returns its id.
    ///
    /// # Errors
    /// Returns `EmptyProduction` for an empty condition list and
    /// `MalformedCondition` for a condition that cannot be compiled.
    pub fn add_production<F>(
        &mut self,
        name: impl Into<Arc<str>>,
        conditions: impl IntoIterator<Item = Condition>,
        action: F,
    ) -> Result<ProductionId>
    where
        F: FnMut(&mut Rete, &Token) + 'static,
    {
        self.register(
            Some(name.into()),
            conditions.into_iter().collect(),
            Box::new(action),
        )
    }

    fn register(
        &mut self,
        name: Option<Arc<str>>,
        conditions: Vec<Condition>,
        action: Action,
    ) -> Result<ProductionId> {
        let id = ProductionId::from_index(self.productions.len());
        let name = name.unwrap_or_else(|| Arc::from(id.to_string()));
        let context = ErrorContext::new().with_production(&*name);
        for (i, condition) in conditions.iter().enumerate() {
            condition
                .validate()
                .map_err(|err| err.with_context(context.clone().with_condition(i)))?;
        }

        let prime = self.config.prime_new_productions;
        let last = conditions.len().saturating_sub(1);
        let mut parent = None;
        let mut tail = None;
        let mut first_new_join = None;
        for (i, condition) in conditions.iter().enumerate() {
            let node = self.alpha.add_test(self.alpha.root(), condition.test());
            let (alpha_memory, created) = self.alpha.add_memory(node);
            if created && prime {
                self.seed_alpha_memory(alpha_memory);
            }

            let (join, created) = self.beta.add_join(parent, alpha_memory);
            if created {
                self.alpha.memory_mut(alpha_memory).add_successor(join);
                first_new_join.get_or_insert(join);
            }
            if i < last {
                let (memory, created) = self.beta.add_memory(join);
                if created && prime && first_new_join.is_none() {
                    self.seed_beta_memory(memory, join);
                }
                parent = Some(memory);
            }
            tail = Some(join);
        }
        let Some(tail) = tail else {
            return Err(Error::empty_production().with_context(context));
        };

        tracing::debug!(
            production = %name,
            conditions = conditions.len(),
            join = %tail,
            "registered production"
        );
        self.productions
            .push(ProductionNode::new(id, name, conditions, tail, action));
        self.beta.add_production(tail, id);

        if prime {
            match first_new_join {
                Some(join) => self.prime_join(join),
                None => {
                    for token in self.join_outputs(tail) {
                        self.production_insert(id, token);
                    }
                }
            }
        }
        Ok(id)
    }

    fn seed_alpha_memory(&mut self, memory: AlphaMemoryId) {
        let reached: Vec<Fact> = self
            .facts
            .values()
            .flat_map(|fact| self.alpha.activate(fact))
            .filter_map(|(reached, fact)| (reached == memory).then_some(fact))
            .collect();
        let facts = self.alpha.memory_mut(memory).facts_mut();
        for fact in reached {
            facts.insert(fact.id.clone(), fact, &mut self.index);
        }
    }

    fn seed_beta_memory(&mut self, memory: BetaMemoryId, join: JoinId) {
        for token in self.join_outputs(join) {
            if let Some(key) = token.last().map(|fact| fact.id.clone()) {
                self.beta
                    .memory_mut(memory)
                    .tokens_mut()
                    .insert(key, token, &mut self.index);
            }
        }
    }

    fn prime_join(&mut self, join: JoinId) {
        let alpha_memory = self.beta.join(join).alpha_memory();
        let facts: Vec<Fact> = self.alpha.memory(alpha_memory).facts().values().cloned().collect();
        for fact in facts {
            self.right_activate(join, &fact);
        }
    }

    /// Gets a production.
    #[must_use]
    pub fn production_node(&self, id: ProductionId) -> &ProductionNode {
        &self.productions[id.index()]
    }

    /// Iterates productions in registration order.
    pub fn productions(&self) -> impl Iterator<Item = (ProductionId, &ProductionNode)> {
        self.productions
            .iter()
            .enumerate()
            .map(|(i, node)| (ProductionId::from_index(i), node))
    }

    /// Finds a production by name.
    #[must_use]
    pub fn find_production(&self, name: &str) -> Option<ProductionId> {
        self.productions()
            .find(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
    }

    /// Number of registered productions.
    #[must_use]
    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    /// State of `production`'s instance whose last fact has id `id`.
    #[must_use]
    pub fn match_state(&self, production: ProductionId, id: &str) -> MatchState {
        self.productions[production.index()].state(id)
    }

    /// Total number of pending matches across all productions.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.productions.iter().map(ProductionNode::pending_count).sum()
    }

    // -------------------------------------------------------------------------
    // Fire Cycle
    // -------------------------------------------------------------------------

    /// Returns true while actions are running.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// Runs every pending match once.
    ///
    /// All pending tables are drained before the first action runs, so
    /// matches created by actions wait for the next call, and a drained
    /// match still runs if an earlier action retracts one of its facts.
    /// Productions fire in registration order; matches within one
    /// production fire in the order they were queued. A match overwritten
    /// under the same key keeps its place, and a retracted then re-created
    /// one goes to the back.
    ///
    /// # Panics
    /// A panicking action is propagated after the network is left ready
    /// for the next `fire`. Matches drained for this cycle that had not run
    /// yet are dropped.
    ///
    /// # Errors
    /// Returns `ReentrantFire` when called from inside an action.
    pub fn fire(&mut self) -> Result<FireReport> {
        if self.firing {
            return Err(Error::reentrant_fire());
        }
        self.firing = true;
        self.cycles += 1;
        let cycle = self.cycles;

        let mut batch = Vec::with_capacity(self.productions.len());
        for production in &mut self.productions {
            let mut drained = production.pending_mut().drain(&mut self.index);
            drained.sort_by_key(|(_, pending)| pending.seq);
            production.begin_cycle(drained.iter().map(|(key, _)| key.clone()));
            batch.push(
                drained
                    .into_iter()
                    .map(|(_, pending)| pending.token)
                    .collect::<Vec<_>>(),
            );
        }

        let mut fired = 0;
        for (i, tokens) in batch.into_iter().enumerate() {
            if tokens.is_empty() {
                continue;
            }
            let Some(mut action) = self.productions[i].take_action() else {
                continue;
            };
            for (ran, token) in tokens.iter().enumerate() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(self, token)));
                if let Err(payload) = outcome {
                    tracing::warn!(
                        production = %self.productions[i].name(),
                        cycle,
                        "action panicked; abandoning the rest of the cycle"
                    );
                    self.productions[i].restore_action(action, ran as u64);
                    self.firing = false;
                    panic::resume_unwind(payload);
                }
            }
            fired += tokens.len();
            self.productions[i].restore_action(action, tokens.len() as u64);
        }
        self.firing = false;

        let remaining = self.pending_count();
        tracing::debug!(cycle, fired, remaining, "fire cycle complete");
        Ok(FireReport {
            cycle,
            fired,
            remaining,
        })
    }

    /// Fires until no matches are pending.
    ///
    /// # Errors
    /// Returns `LimitExceeded` if matches are still pending after
    /// `max_fire_cycles` cycles, and `ReentrantFire` when called from
    /// inside an action.
    pub fn run(&mut self) -> Result<RunReport> {
        let limit = self.config.max_fire_cycles;
        let mut report = RunReport::default();
        while self.pending_count() > 0 {
            if report.cycles >= limit {
                tracing::warn!(
                    limit,
                    pending = self.pending_count(),
                    "fire cycle limit reached before quiescence"
                );
                return Err(Error::limit_exceeded(SemanticLimit::MaxFireCycles {
                    limit,
                }));
            }
            let cycle = self.fire()?;
            report.cycles += 1;
            report.fired += cycle.fired;
        }
        Ok(report)
    }

    /// Number of fire cycles performed so far.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.cycles
    }

    // -------------------------------------------------------------------------
    // Network Access
    // -------------------------------------------------------------------------

    /// The alpha network.
    #[must_use]
    pub fn alpha_network(&self) -> &AlphaNetwork {
        &self.alpha
    }

    /// The beta network.
    #[must_use]
    pub fn beta_network(&self) -> &BetaNetwork {
        &self.beta
    }

    /// The retraction index.
    #[must_use]
    pub fn retraction_index(&self) -> &RetractionIndex {
        &self.index
    }

    /// Facts of the entry `derivative` points at, if it exists.
    pub(crate) fn derivative_facts(&self, derivative: &DerivativeRef) -> Option<Vec<&Fact>> {
        let key = derivative.key.as_str();
        match derivative.memory {
            MemoryHandle::Alpha(id) => self
                .alpha
                .memory(id)
                .facts()
                .get(key)
                .map(Derived::source_facts),
            MemoryHandle::Beta(id) => self
                .beta
                .memory(id)
                .tokens()
                .get(key)
                .map(Derived::source_facts),
            MemoryHandle::Production(id) => self.productions[id.index()]
                .pending()
                .get(key)
                .map(Derived::source_facts),
        }
    }
}
