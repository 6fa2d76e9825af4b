//! Beta network: join nodes and the token memories between them.
//!
//! Each production compiles to a chain of join nodes, one per condition.
//! A join combines tokens from its parent beta memory (left input) with
//! facts from an alpha memory (right input) under the identity join test.
//! The first join of a chain has no parent and sees a single empty token.
//!
//! ```text
//!  alpha-memory_0 ──► join_0 ──► beta-memory_0
//!                                     │
//!  alpha-memory_1 ──────────────► join_1 ──► production_0
//! ```

use rete_foundation::{Fact, Token};

use crate::config::JoinPolicy;
use crate::ids::{AlphaMemoryId, BetaMemoryId, JoinId, ProductionId};
use crate::memory::KeyedMemory;
use crate::retraction::MemoryHandle;

// =============================================================================
// Join Test
// =============================================================================

/// Returns true if `token_fact` and `fact` refer to the same entity, either
/// directly or through a bound value.
#[must_use]
pub fn correlated(token_fact: &Fact, fact: &Fact) -> bool {
    token_fact.id == fact.id
        || token_fact.value.refers_to(&fact.id)
        || fact.value.refers_to(&token_fact.id)
}

/// Decides whether `fact` may extend `token`.
#[must_use]
pub fn join_test(policy: JoinPolicy, token: &Token, fact: &Fact) -> bool {
    if token.is_empty() {
        return true;
    }
    match policy {
        JoinPolicy::Every => token.iter().all(|t| correlated(t, fact)),
        JoinPolicy::Any => token.iter().any(|t| correlated(t, fact)),
    }
}

// =============================================================================
// Join Node
// =============================================================================

/// A two-input node.
#[derive(Clone, Debug)]
pub struct JoinNode {
    parent: Option<BetaMemoryId>,
    alpha_memory: AlphaMemoryId,
    memory: Option<BetaMemoryId>,
    productions: Vec<ProductionId>,
}

impl JoinNode {
    /// Left input; `None` for the first join of a chain.
    #[must_use]
    pub fn parent(&self) -> Option<BetaMemoryId> {
        self.parent
    }

    /// Right input.
    #[must_use]
    pub fn alpha_memory(&self) -> AlphaMemoryId {
        self.alpha_memory
    }

    /// Output memory feeding longer chains, if any chain continues here.
    #[must_use]
    pub fn memory(&self) -> Option<BetaMemoryId> {
        self.memory
    }

    /// Productions that terminate at this join.
    #[must_use]
    pub fn productions(&self) -> &[ProductionId] {
        &self.productions
    }
}

// =============================================================================
// Beta Memory
// =============================================================================

/// Partial matches produced by one join, one per last-fact id.
#[derive(Clone, Debug)]
pub struct BetaMemory {
    tokens: KeyedMemory<Token>,
    join: JoinId,
    children: Vec<JoinId>,
}

impl BetaMemory {
    /// The stored tokens.
    #[must_use]
    pub fn tokens(&self) -> &KeyedMemory<Token> {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut KeyedMemory<Token> {
        &mut self.tokens
    }

    /// The join that fills this memory.
    #[must_use]
    pub fn join(&self) -> JoinId {
        self.join
    }

    /// Joins left-activated by insertions into this memory.
    #[must_use]
    pub fn children(&self) -> &[JoinId] {
        &self.children
    }
}

// =============================================================================
// Beta Network
// =============================================================================

/// Arena of join nodes and beta memories.
#[derive(Clone, Debug, Default)]
pub struct BetaNetwork {
    joins: Vec<JoinNode>,
    memories: Vec<BetaMemory>,
    roots: Vec<JoinId>,
}

impl BetaNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds or creates the join of `parent` and `alpha_memory`.
    ///
    /// The flag is true when the join was created by this call.
    pub fn add_join(
        &mut self,
        parent: Option<BetaMemoryId>,
        alpha_memory: AlphaMemoryId,
    ) -> (JoinId, bool) {
        let siblings = match parent {
            Some(memory) => &self.memories[memory.index()].children,
            None => &self.roots,
        };
        if let Some(&existing) = siblings
            .iter()
            .find(|join| self.joins[join.index()].alpha_memory == alpha_memory)
        {
            return (existing, false);
        }

        let id = JoinId::from_index(self.joins.len());
        self.joins.push(JoinNode {
            parent,
            alpha_memory,
            memory: None,
            productions: Vec::new(),
        });
        match parent {
            Some(memory) => self.memories[memory.index()].children.push(id),
            None => self.roots.push(id),
        }
        (id, true)
    }

    /// Finds or creates the output memory of `join`.
    ///
    /// The flag is true when the memory was created by this call.
    pub fn add_memory(&mut self, join: JoinId) -> (BetaMemoryId, bool) {
        if let Some(memory) = self.joins[join.index()].memory {
            return (memory, false);
        }
        let id = BetaMemoryId::from_index(self.memories.len());
        self.memories.push(BetaMemory {
            tokens: KeyedMemory::new(MemoryHandle::Beta(id)),
            join,
            children: Vec::new(),
        });
        self.joins[join.index()].memory = Some(id);
        (id, true)
    }

    /// Attaches a production to the end of `join`'s chain.
    pub fn add_production(&mut self, join: JoinId, production: ProductionId) {
        self.joins[join.index()].productions.push(production);
    }

    /// Gets a join node.
    #[must_use]
    pub fn join(&self, id: JoinId) -> &JoinNode {
        &self.joins[id.index()]
    }

    /// Gets a beta memory.
    #[must_use]
    pub fn memory(&self, id: BetaMemoryId) -> &BetaMemory {
        &self.memories[id.index()]
    }

    pub(crate) fn memory_mut(&mut self, id: BetaMemoryId) -> &mut BetaMemory {
        &mut self.memories[id.index()]
    }

    /// Iterates join nodes with their ids.
    pub fn joins(&self) -> impl Iterator<Item = (JoinId, &JoinNode)> {
        self.joins
            .iter()
            .enumerate()
            .map(|(i, join)| (JoinId::from_index(i), join))
    }

    /// Iterates beta memories with their ids.
    pub fn memories(&self) -> impl Iterator<Item = (BetaMemoryId, &BetaMemory)> {
        self.memories
            .iter()
            .enumerate()
            .map(|(i, memory)| (BetaMemoryId::from_index(i), memory))
    }

    /// Number of join nodes.
    #[must_use]
    pub fn join_count(&self) -> usize {
        self.joins.len()
    }

    /// Number of beta memories.
    #[must_use]
    pub fn memory_count(&self) -> usize {
        self.memories.len()
    }

    /// Tokens on the left input of `join`: the parent memory's tokens, or a
    /// single empty token for the first join of a chain.
    #[must_use]
    pub fn left_tokens(&self, join: JoinId) -> Vec<Token> {
        match self.joins[join.index()].parent {
            Some(parent) => self.memories[parent.index()].tokens.values().cloned().collect(),
            None => vec![Token::new()],
        }
    }
}
