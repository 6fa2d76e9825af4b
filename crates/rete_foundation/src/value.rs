//! Fact values: plain literals and variable bindings.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// A literal fact value.
///
/// Literals are immutable and cheaply cloneable. Tuples exist mainly as
/// targets of `in` membership tests.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// The nil value (represents absence).
    Nil,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value. Also used to name other entities.
    String(Arc<str>),
    /// Fixed-size tuple of literals.
    Tuple(Arc<[Literal]>),
}

impl Literal {
    /// Creates a tuple literal from anything convertible to literals.
    pub fn tuple<T: Into<Literal>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a number as f64 (converts int to float).
    ///
    /// Note: Converting large i64 values to f64 may lose precision.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract tuple elements.
    #[must_use]
    pub fn as_tuple(&self) -> Option<&[Literal]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Value equality as rule conditions see it.
    ///
    /// Unlike `==` on `Literal`, integers and floats compare numerically,
    /// so `2` is equivalent to `2.0`.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(_), Self::Float(_)) | (Self::Float(_), Self::Int(_)) => {
                self.partial_cmp(other) == Some(Ordering::Equal)
            }
            // IEEE equality: `-0.0` equals `0.0` and `NaN` equals nothing.
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equivalent(y))
            }
            _ => self == other,
        }
    }

    /// Returns true if this literal names the given entity.
    #[must_use]
    pub fn names(&self, id: &EntityId) -> bool {
        matches!(self, Self::String(s) if s.as_ref() == id.as_str())
    }
}

// Implement PartialEq manually to handle float comparison
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(n) => n.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Tuple(items) => items.hash(state),
        }
    }
}

impl PartialOrd for Literal {
    #[allow(clippy::cast_precision_loss)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Nil, Self::Nil) => Some(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            // Cross-type numeric comparison intentionally loses precision for large i64
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            (Self::Tuple(a), Self::Tuple(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.partial_cmp(y)? {
                        Ordering::Equal => {}
                        ord => return Some(ord),
                    }
                }
                a.len().partial_cmp(&b.len())
            }
            _ => None, // Different types or non-comparable
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Tuple(items) => f.debug_list().entries(items.iter()).finish(),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A literal tagged with the rule variable it satisfied.
///
/// Bindings are created by alpha nodes whose target is a variable. The
/// bound literal is what later joins compare against entity ids.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binding {
    /// Name of the variable this value was bound to.
    pub var: Arc<str>,
    /// The original literal.
    pub bound: Literal,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}={:?}", self.var, self.bound)
    }
}

/// The value slot of a fact.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A plain literal, as supplied by the host.
    Literal(Literal),
    /// A literal that satisfied a variable target.
    Binding(Binding),
}

impl Value {
    /// Returns the underlying literal, looking through bindings.
    #[must_use]
    pub const fn literal(&self) -> &Literal {
        match self {
            Self::Literal(lit) => lit,
            Self::Binding(binding) => &binding.bound,
        }
    }

    /// Returns the binding, if this value was bound to a variable.
    #[must_use]
    pub const fn as_binding(&self) -> Option<&Binding> {
        match self {
            Self::Binding(binding) => Some(binding),
            Self::Literal(_) => None,
        }
    }

    /// Returns true if this value was bound to a variable.
    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }

    /// Tags this value with a variable name.
    ///
    /// Values that are already bound keep their original binding.
    #[must_use]
    pub fn bind(self, var: &Arc<str>) -> Self {
        match self {
            Self::Literal(bound) => Self::Binding(Binding {
                var: Arc::clone(var),
                bound,
            }),
            bound @ Self::Binding(_) => bound,
        }
    }

    /// Returns true if this value is a binding whose literal names `id`.
    #[must_use]
    pub fn refers_to(&self, id: &EntityId) -> bool {
        match self {
            Self::Binding(binding) => binding.bound.names(id),
            Self::Literal(_) => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => fmt::Debug::fmt(lit, f),
            Self::Binding(binding) => fmt::Debug::fmt(binding, f),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.literal(), f)
    }
}

// Convenience From implementations

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Literal {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<&EntityId> for Literal {
    fn from(id: &EntityId) -> Self {
        Self::from(id.as_str())
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(items: Vec<T>) -> Self {
        Self::tuple(items)
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl From<Binding> for Value {
    fn from(binding: Binding) -> Self {
        Self::Binding(binding)
    }
}

macro_rules! value_from_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Literal(Literal::from(v))
                }
            }
        )*
    };
}

value_from_literal!(bool, i64, i32, f64, &str, String, Arc<str>, &EntityId);

impl<T: Into<Literal>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Self::Literal(Literal::from(value))
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Literal(Literal::tuple(items))
    }
}
