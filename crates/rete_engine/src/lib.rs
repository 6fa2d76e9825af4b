//! Alpha/beta network, retraction index, and fire cycle for the rete engine.
//!
//! This crate provides:
//! - [`Condition`] - Rule conditions, with a fluent builder
//! - [`AlphaNetwork`] - Shared single-fact filters and alpha memories
//! - [`BetaNetwork`] - Join nodes and token memories
//! - [`RetractionIndex`] - Slot to derived-entry reverse index
//! - [`Rete`] - The network façade: add, retract, production, fire, run
//! - [`ReteConfig`] - Join policy, fire-cycle limit, and priming

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod alpha;
pub mod beta;
pub mod condition;
pub mod config;
pub mod ids;
pub mod inspect;
pub mod memory;
pub mod network;
pub mod production;
pub mod retraction;

pub use alpha::{AlphaMemory, AlphaNetwork, AlphaNode};
pub use beta::{BetaMemory, BetaNetwork, JoinNode, correlated, join_test};
pub use condition::{AlphaTest, Condition, ConditionBuilder, EntityPattern, Operator, Target, Variable};
pub use config::{JoinPolicy, ReteConfig};
pub use ids::{AlphaMemoryId, AlphaNodeId, BetaMemoryId, JoinId, ProductionId};
pub use inspect::{NetworkDump, NetworkStats};
pub use memory::{Derived, KeyedMemory};
pub use network::Rete;
pub use production::{Action, FireReport, MatchState, PendingMatch, ProductionNode, RunReport};
pub use retraction::{DerivativeRef, MemoryHandle, RetractionIndex};
