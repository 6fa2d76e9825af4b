//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Literal, Value, Fact, Token, and Error.

mod facts;
