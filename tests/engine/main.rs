//! Integration tests for the engine
//!
//! Tests for alpha sharing, joins, retraction, productions, and the fire
//! cycle.

mod alpha;
mod joins;
mod productions;
