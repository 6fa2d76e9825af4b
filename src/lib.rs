//! Rete - incremental production-rule matching
//!
//! This crate re-exports both layers of the engine for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: rete_engine     - Alpha/beta network, retraction, fire cycle
//! Layer 0: rete_foundation - Core types (Fact, Value, Token, Error)
//! ```

pub use rete_engine as engine;
pub use rete_foundation as foundation;
