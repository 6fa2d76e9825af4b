//! Facts, values, tokens, and error types for the rete engine.
//!
//! This crate provides:
//! - [`Fact`] - A working-memory element `(id, attribute, value)`
//! - [`SlotKey`] - The `(id, attribute)` identity of a fact
//! - [`Literal`] and [`Value`] - Fact values, including variable [`Binding`]s
//! - [`EntityId`] and [`Attribute`] - Cheaply cloneable names
//! - [`Token`] - An ordered partial or complete match
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod fact;
pub mod token;
pub mod value;

pub use entity::{Attribute, EntityId};
pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use fact::{Fact, SlotKey};
pub use token::Token;
pub use value::{Binding, Literal, Value};

/// Result type alias using the rete error type.
pub type Result<T> = std::result::Result<T, Error>;
