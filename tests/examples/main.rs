//! Example rule sets exercised end to end
//!
//! Small domains whose actions feed facts back into the network.
