//! Arena indices for network nodes.
//!
//! Nodes live in `Vec`s owned by their network and refer to each other by
//! these ids, so the node graph has no ownership cycles.

use std::fmt;

macro_rules! node_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Returns the arena index of this node.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }

            pub(crate) const fn from_index(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

node_id!(
    /// A filter node in the alpha network. Index 0 is the root.
    AlphaNodeId,
    "alpha-node"
);
node_id!(
    /// An alpha memory.
    AlphaMemoryId,
    "alpha-memory"
);
node_id!(
    /// A join node in the beta network.
    JoinId,
    "join"
);
node_id!(
    /// A beta memory.
    BetaMemoryId,
    "beta-memory"
);
node_id!(
    /// A production (terminal) node.
    ProductionId,
    "production"
);
