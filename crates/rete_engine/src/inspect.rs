//! Network introspection: counts, a printable dump, and an invariant check.

use std::collections::BTreeSet;
use std::fmt;

use rete_foundation::{Error, Result};

use crate::network::Rete;
use crate::retraction::{DerivativeRef, MemoryHandle};

/// Node and entry counts for a network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// Active facts.
    pub facts: usize,
    /// Alpha filter nodes, excluding the root.
    pub alpha_nodes: usize,
    /// Alpha memories.
    pub alpha_memories: usize,
    /// Facts held across all alpha memories.
    pub alpha_entries: usize,
    /// Join nodes.
    pub joins: usize,
    /// Beta memories.
    pub beta_memories: usize,
    /// Tokens held across all beta memories.
    pub beta_entries: usize,
    /// Registered productions.
    pub productions: usize,
    /// Pending matches across all productions.
    pub pending: usize,
    /// Registrations in the retraction index.
    pub derivatives: usize,
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} facts, {} alpha nodes, {} alpha memories ({} entries), \
             {} joins, {} beta memories ({} entries), {} productions ({} pending), \
             {} derivatives",
            self.facts,
            self.alpha_nodes,
            self.alpha_memories,
            self.alpha_entries,
            self.joins,
            self.beta_memories,
            self.beta_entries,
            self.productions,
            self.pending,
            self.derivatives,
        )
    }
}

/// A printable snapshot of a network, produced by [`Rete::dump`].
pub struct NetworkDump<'a> {
    rete: &'a Rete,
}

impl fmt::Display for NetworkDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rete = self.rete;
        writeln!(f, "facts:")?;
        for fact in rete.facts() {
            writeln!(f, "  {fact}")?;
        }

        writeln!(f, "alpha:")?;
        let alpha = rete.alpha_network();
        for (id, node) in alpha.nodes() {
            let Some(test) = node.test() else {
                continue;
            };
            write!(f, "  {id} [{test}]")?;
            if let Some(memory) = node.memory() {
                let memory_node = alpha.memory(memory);
                write!(f, " -> {memory} ({} facts)", memory_node.facts().len())?;
                for join in memory_node.successors() {
                    write!(f, " -> {join}")?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "beta:")?;
        let beta = rete.beta_network();
        for (id, join) in beta.joins() {
            match join.parent() {
                Some(parent) => write!(f, "  {id} ({parent} x {})", join.alpha_memory())?,
                None => write!(f, "  {id} (root x {})", join.alpha_memory())?,
            }
            if let Some(memory) = join.memory() {
                let tokens = beta.memory(memory).tokens();
                write!(f, " -> {memory} ({} tokens)", tokens.len())?;
            }
            for production in join.productions() {
                write!(f, " -> {production}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "productions:")?;
        for (id, production) in rete.productions() {
            writeln!(
                f,
                "  {id} {:?}: {} pending, fired {} times",
                production.name(),
                production.pending_count(),
                production.fire_count()
            )?;
            for condition in production.conditions() {
                writeln!(f, "    {condition}")?;
            }
            for token in production.pending_tokens() {
                writeln!(f, "    pending: {token}")?;
            }
        }
        Ok(())
    }
}

impl Rete {
    /// Counts nodes and memory entries.
    #[must_use]
    pub fn stats(&self) -> NetworkStats {
        let alpha = self.alpha_network();
        let beta = self.beta_network();
        NetworkStats {
            facts: self.fact_count(),
            alpha_nodes: alpha.node_count(),
            alpha_memories: alpha.memory_count(),
            alpha_entries: alpha.memories().map(|(_, m)| m.facts().len()).sum(),
            joins: beta.join_count(),
            beta_memories: beta.memory_count(),
            beta_entries: beta.memories().map(|(_, m)| m.tokens().len()).sum(),
            productions: self.production_count(),
            pending: self.pending_count(),
            derivatives: self.retraction_index().derivative_count(),
        }
    }

    /// Returns a displayable description of facts, nodes, memories, and
    /// pending matches.
    #[must_use]
    pub fn dump(&self) -> NetworkDump<'_> {
        NetworkDump { rete: self }
    }

    /// Checks that every memory entry is built from active facts and that
    /// the retraction index lists exactly the entries the memories hold.
    ///
    /// # Errors
    /// Returns `InvariantViolation` describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        let mut registered = 0;
        for derivative in self.stored_entries() {
            let Some(facts) = self.derivative_facts(&derivative) else {
                continue;
            };
            let mut seen = BTreeSet::new();
            for fact in facts {
                let slot = fact.slot();
                if !seen.insert(slot.clone()) {
                    continue;
                }
                match self.get(slot.id.as_str(), slot.attribute.as_str()) {
                    Some(active) if active.value.literal() == fact.value.literal() => {}
                    _ => {
                        return Err(Error::invariant_violation(format!(
                            "{:?} at {} holds {fact:?}, which is not active",
                            derivative.memory, derivative.key
                        )));
                    }
                }
                if !self.retraction_index().contains(&slot, &derivative) {
                    return Err(Error::invariant_violation(format!(
                        "{:?} at {} is not registered under {slot}",
                        derivative.memory, derivative.key
                    )));
                }
                registered += 1;
            }
        }

        for (slot, derivative) in self.retraction_index().iter() {
            let holds = self
                .derivative_facts(derivative)
                .is_some_and(|facts| facts.iter().any(|fact| fact.occupies(slot)));
            if !holds {
                return Err(Error::invariant_violation(format!(
                    "{slot} lists {:?} at {}, which does not contain it",
                    derivative.memory, derivative.key
                )));
            }
        }
        if registered != self.retraction_index().derivative_count() {
            return Err(Error::invariant_violation(format!(
                "index has {} registrations, memories account for {registered}",
                self.retraction_index().derivative_count()
            )));
        }

        for (id, production) in self.productions() {
            let expected = production.conditions().len();
            for pending in production.pending().values() {
                if pending.token.len() != expected {
                    return Err(Error::invariant_violation(format!(
                        "{id} holds a token of length {}, expected {expected}",
                        pending.token.len()
                    )));
                }
            }
        }
        Ok(())
    }

    fn stored_entries(&self) -> Vec<DerivativeRef> {
        let mut entries = Vec::new();
        for (id, memory) in self.alpha_network().memories() {
            entries.extend(memory.facts().iter().map(|(key, _)| DerivativeRef {
                memory: MemoryHandle::Alpha(id),
                key: key.clone(),
            }));
        }
        for (id, memory) in self.beta_network().memories() {
            entries.extend(memory.tokens().iter().map(|(key, _)| DerivativeRef {
                memory: MemoryHandle::Beta(id),
                key: key.clone(),
            }));
        }
        for (id, production) in self.productions() {
            entries.extend(production.pending().iter().map(|(key, _)| DerivativeRef {
                memory: MemoryHandle::Production(id),
                key: key.clone(),
            }));
        }
        entries
    }
}
