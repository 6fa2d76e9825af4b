//! Alpha network: single-fact constant tests and the memories behind them.
//!
//! The network is a tree of filter nodes rooted at a no-op root. Each
//! non-root node holds one [`AlphaTest`]; rules whose conditions carry an
//! equal test under the same parent share the node. A node has at most one
//! alpha memory, the cache of facts that passed every test on its path.

use rete_foundation::Fact;

use crate::condition::{AlphaTest, Target};
use crate::ids::{AlphaMemoryId, AlphaNodeId, JoinId};
use crate::memory::KeyedMemory;
use crate::retraction::MemoryHandle;

// =============================================================================
// Filter Nodes
// =============================================================================

/// A filter node.
#[derive(Clone, Debug)]
pub struct AlphaNode {
    test: Option<AlphaTest>,
    children: Vec<AlphaNodeId>,
    memory: Option<AlphaMemoryId>,
}

impl AlphaNode {
    fn new(test: Option<AlphaTest>) -> Self {
        Self {
            test,
            children: Vec::new(),
            memory: None,
        }
    }

    /// The node's test; `None` for the root.
    #[must_use]
    pub fn test(&self) -> Option<&AlphaTest> {
        self.test.as_ref()
    }

    /// Child filter nodes, in creation order.
    #[must_use]
    pub fn children(&self) -> &[AlphaNodeId] {
        &self.children
    }

    /// The node's alpha memory, if one was requested.
    #[must_use]
    pub fn memory(&self) -> Option<AlphaMemoryId> {
        self.memory
    }

    /// Runs the node's test against `fact`.
    ///
    /// Returns the fact to forward, tagged with the variable when the test
    /// targets one, or `None` if the fact is discarded.
    #[must_use]
    pub fn filter(&self, fact: &Fact) -> Option<Fact> {
        let Some(test) = &self.test else {
            return Some(fact.clone());
        };
        if fact.attribute != test.attribute {
            return None;
        }
        match &test.target {
            Target::Var(var) => Some(fact.bound_to(var.name())),
            Target::Literal(target) => test
                .operator
                .evaluate(fact.value.literal(), target)
                .then(|| fact.clone()),
        }
    }
}

// =============================================================================
// Alpha Memory
// =============================================================================

/// Facts currently satisfying one filter chain, one per entity id.
#[derive(Clone, Debug)]
pub struct AlphaMemory {
    facts: KeyedMemory<Fact>,
    successors: Vec<JoinId>,
}

impl AlphaMemory {
    fn new(id: AlphaMemoryId) -> Self {
        Self {
            facts: KeyedMemory::new(MemoryHandle::Alpha(id)),
            successors: Vec::new(),
        }
    }

    /// The stored facts.
    #[must_use]
    pub fn facts(&self) -> &KeyedMemory<Fact> {
        &self.facts
    }

    pub(crate) fn facts_mut(&mut self) -> &mut KeyedMemory<Fact> {
        &mut self.facts
    }

    /// Join nodes right-activated by insertions into this memory.
    #[must_use]
    pub fn successors(&self) -> &[JoinId] {
        &self.successors
    }

    pub(crate) fn add_successor(&mut self, join: JoinId) {
        if !self.successors.contains(&join) {
            self.successors.push(join);
        }
    }
}

// =============================================================================
// Alpha Network
// =============================================================================

/// Arena of filter nodes and alpha memories.
#[derive(Clone, Debug)]
pub struct AlphaNetwork {
    nodes: Vec<AlphaNode>,
    memories: Vec<AlphaMemory>,
}

impl Default for AlphaNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphaNetwork {
    /// Creates a network holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![AlphaNode::new(None)],
            memories: Vec::new(),
        }
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> AlphaNodeId {
        AlphaNodeId(0)
    }

    /// Finds or creates the child of `parent` carrying `test`.
    pub fn add_test(&mut self, parent: AlphaNodeId, test: AlphaTest) -> AlphaNodeId {
        let existing = self.nodes[parent.index()]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.index()].test.as_ref() == Some(&test));
        if let Some(child) = existing {
            return child;
        }

        let id = AlphaNodeId::from_index(self.nodes.len());
        self.nodes.push(AlphaNode::new(Some(test)));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Finds or creates the alpha memory of `node`.
    ///
    /// The flag is true when the memory was created by this call.
    pub fn add_memory(&mut self, node: AlphaNodeId) -> (AlphaMemoryId, bool) {
        if let Some(memory) = self.nodes[node.index()].memory {
            return (memory, false);
        }
        let id = AlphaMemoryId::from_index(self.memories.len());
        self.memories.push(AlphaMemory::new(id));
        self.nodes[node.index()].memory = Some(id);
        (id, true)
    }

    /// Gets a filter node.
    #[must_use]
    pub fn node(&self, id: AlphaNodeId) -> &AlphaNode {
        &self.nodes[id.index()]
    }

    /// Gets an alpha memory.
    #[must_use]
    pub fn memory(&self, id: AlphaMemoryId) -> &AlphaMemory {
        &self.memories[id.index()]
    }

    pub(crate) fn memory_mut(&mut self, id: AlphaMemoryId) -> &mut AlphaMemory {
        &mut self.memories[id.index()]
    }

    /// Iterates filter nodes with their ids.
    pub fn nodes(&self) -> impl Iterator<Item = (AlphaNodeId, &AlphaNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (AlphaNodeId::from_index(i), node))
    }

    /// Iterates alpha memories with their ids.
    pub fn memories(&self) -> impl Iterator<Item = (AlphaMemoryId, &AlphaMemory)> {
        self.memories
            .iter()
            .enumerate()
            .map(|(i, memory)| (AlphaMemoryId::from_index(i), memory))
    }

    /// Number of filter nodes, excluding the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Number of alpha memories.
    #[must_use]
    pub fn memory_count(&self) -> usize {
        self.memories.len()
    }

    /// Routes `fact` from the root, returning every memory it reaches along
    /// with the fact as tagged on the way there.
    ///
    /// Routing has no side effects; the caller performs the insertions.
    #[must_use]
    pub fn activate(&self, fact: &Fact) -> Vec<(AlphaMemoryId, Fact)> {
        let mut reached = Vec::new();
        self.route(self.root(), fact, &mut reached);
        reached
    }

    fn route(&self, node: AlphaNodeId, fact: &Fact, reached: &mut Vec<(AlphaMemoryId, Fact)>) {
        let node = &self.nodes[node.index()];
        let Some(passed) = node.filter(fact) else {
            return;
        };
        if let Some(memory) = node.memory {
            reached.push((memory, passed.clone()));
        }
        for &child in &node.children {
            self.route(child, &passed, reached);
        }
    }
}
