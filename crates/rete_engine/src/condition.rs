//! Rule conditions and the alpha tests they compile to.
//!
//! A condition reads `(label, attribute, operator, target)`. The label names
//! the entity slot for the rule author's benefit only; matching looks at the
//! attribute, operator, and target, which together form an [`AlphaTest`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rete_foundation::{Attribute, EntityId, Error, Literal, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Operator
// =============================================================================

/// Comparison applied by an alpha test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    /// `==` (aliases `=`)
    Eq,
    /// `!=` (aliases `<>`, `~=`)
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `in`: membership in a tuple, or substring of a string
    In,
    /// `is`: strict identity (same kind and same value)
    Is,
    /// `is-not` (aliases `is not`, `nis`)
    IsNot,
}

impl Operator {
    /// Every supported operator.
    pub const ALL: [Operator; 9] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::In,
        Self::Is,
        Self::IsNot,
    ];

    /// Returns the canonical spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::Is => "is",
            Self::IsNot => "is-not",
        }
    }

    /// Applies the operator as `value <op> target`.
    ///
    /// Ordering comparisons between values that have no ordering (a string
    /// and a number, say) are false rather than errors.
    #[must_use]
    pub fn evaluate(self, value: &Literal, target: &Literal) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match self {
            Self::Eq => value.equivalent(target),
            Self::Ne => !value.equivalent(target),
            Self::Lt => matches!(value.partial_cmp(target), Some(Less)),
            Self::Le => matches!(value.partial_cmp(target), Some(Less | Equal)),
            Self::Gt => matches!(value.partial_cmp(target), Some(Greater)),
            Self::Ge => matches!(value.partial_cmp(target), Some(Greater | Equal)),
            Self::In => match target {
                Literal::Tuple(items) => items.iter().any(|item| value.equivalent(item)),
                Literal::String(haystack) => value
                    .as_str()
                    .is_some_and(|needle| haystack.contains(needle)),
                _ => false,
            },
            Self::Is => value == target,
            Self::IsNot => value != target,
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" | "=" => Ok(Self::Eq),
            "!=" | "<>" | "~=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "in" => Ok(Self::In),
            "is" => Ok(Self::Is),
            "is-not" | "is not" | "nis" => Ok(Self::IsNot),
            other => Err(Error::unsupported_operator(other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// =============================================================================
// Variables and Targets
// =============================================================================

/// A rule-local placeholder correlating entity identity across conditions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable(Arc<str>);

impl Variable {
    /// Creates a variable.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// What an alpha test compares a fact's value against.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Target {
    /// A constant.
    Literal(Literal),
    /// A variable; any value passes and is tagged with the variable.
    Var(Variable),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(Literal::String(s)) => write!(f, "{s:?}"),
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Var(var) => write!(f, "{var}"),
        }
    }
}

impl From<Variable> for Target {
    fn from(var: Variable) -> Self {
        Self::Var(var)
    }
}

impl From<Literal> for Target {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

macro_rules! target_from_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Target {
                fn from(v: $ty) -> Self {
                    Self::Literal(Literal::from(v))
                }
            }
        )*
    };
}

target_from_literal!(bool, i64, i32, f64, &str, String, Arc<str>, &EntityId);

impl<T: Into<Literal>> From<Option<T>> for Target {
    fn from(value: Option<T>) -> Self {
        Self::Literal(Literal::from(value))
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Target {
    fn from(items: Vec<T>) -> Self {
        Self::Literal(Literal::tuple(items))
    }
}

// =============================================================================
// Alpha Test
// =============================================================================

/// The part of a condition that alpha nodes evaluate.
///
/// Two conditions share an alpha node exactly when their tests are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlphaTest {
    /// Attribute a fact must have.
    pub attribute: Attribute,
    /// Comparison to apply.
    pub operator: Operator,
    /// Value to compare against.
    pub target: Target,
}

impl fmt::Display for AlphaTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.operator, self.target)
    }
}

// =============================================================================
// Condition
// =============================================================================

/// One clause of a production's left-hand side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Condition {
    /// Author-facing entity label; ignored by matching.
    pub label: Arc<str>,
    /// Attribute a fact must have.
    pub attribute: Attribute,
    /// Comparison to apply.
    pub operator: Operator,
    /// Value or variable to compare against.
    pub target: Target,
}

impl Condition {
    /// Creates an equality condition.
    #[must_use]
    pub fn new(
        label: impl Into<Arc<str>>,
        attribute: impl Into<Attribute>,
        target: impl Into<Target>,
    ) -> Self {
        Self::with_operator(label, attribute, Operator::Eq, target)
    }

    /// Creates a condition with an explicit operator.
    #[must_use]
    pub fn with_operator(
        label: impl Into<Arc<str>>,
        attribute: impl Into<Attribute>,
        operator: Operator,
        target: impl Into<Target>,
    ) -> Self {
        Self {
            label: label.into(),
            attribute: attribute.into(),
            operator,
            target: target.into(),
        }
    }

    /// Creates a condition from operator text such as `">="` or `"in"`.
    ///
    /// # Errors
    /// Returns `UnsupportedOperator` if the text names no known operator.
    pub fn parse(
        label: impl Into<Arc<str>>,
        attribute: impl Into<Attribute>,
        operator: &str,
        target: impl Into<Target>,
    ) -> Result<Self> {
        Ok(Self::with_operator(
            label,
            attribute,
            operator.parse()?,
            target,
        ))
    }

    /// Starts a fluent condition on the entity labelled `label`.
    ///
    /// ```
    /// use rete_engine::Condition;
    ///
    /// let heavy = Condition::on("y").attr("weight").gt(10);
    /// assert_eq!(heavy.to_string(), "Cond(y, weight, >, 10)");
    /// ```
    #[must_use]
    pub fn on(label: impl Into<Arc<str>>) -> EntityPattern {
        EntityPattern {
            label: label.into(),
        }
    }

    /// Returns the alpha test this condition compiles to.
    #[must_use]
    pub fn test(&self) -> AlphaTest {
        AlphaTest {
            attribute: self.attribute.clone(),
            operator: self.operator,
            target: self.target.clone(),
        }
    }

    /// Checks that the condition can be compiled into the network.
    ///
    /// # Errors
    /// Returns `MalformedCondition` for an empty attribute, or for a
    /// variable target combined with an operator other than `==`.
    pub fn validate(&self) -> Result<()> {
        if self.attribute.is_empty() {
            return Err(Error::malformed_condition(
                self.to_string(),
                "attribute name is empty",
            ));
        }
        if matches!(self.target, Target::Var(_)) && self.operator != Operator::Eq {
            return Err(Error::malformed_condition(
                self.to_string(),
                format!("variable targets bind with ==, not {}", self.operator),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cond({}, {}, {}, {})",
            self.label, self.attribute, self.operator, self.target
        )
    }
}

// =============================================================================
// Fluent Builder
// =============================================================================

/// First step of the fluent form: an entity label without an attribute.
#[derive(Clone, Debug)]
pub struct EntityPattern {
    label: Arc<str>,
}

impl EntityPattern {
    /// Chooses the attribute to test.
    #[must_use]
    pub fn attr(self, attribute: impl Into<Attribute>) -> ConditionBuilder {
        ConditionBuilder {
            label: self.label,
            attribute: attribute.into(),
        }
    }
}

/// Second step of the fluent form: pick an operator and a target.
#[derive(Clone, Debug)]
pub struct ConditionBuilder {
    label: Arc<str>,
    attribute: Attribute,
}

impl ConditionBuilder {
    fn build(self, operator: Operator, target: impl Into<Target>) -> Condition {
        Condition::with_operator(self.label, self.attribute, operator, target)
    }

    /// `attribute == target`; with a [`Variable`] target this binds.
    #[must_use]
    pub fn eq(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Eq, target)
    }

    /// `attribute != target`
    #[must_use]
    pub fn ne(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Ne, target)
    }

    /// `attribute < target`
    #[must_use]
    pub fn lt(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Lt, target)
    }

    /// `attribute <= target`
    #[must_use]
    pub fn le(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Le, target)
    }

    /// `attribute > target`
    #[must_use]
    pub fn gt(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Gt, target)
    }

    /// `attribute >= target`
    #[must_use]
    pub fn ge(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Ge, target)
    }

    /// `attribute in target`
    #[must_use]
    pub fn is_in(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::In, target)
    }

    /// `attribute is target`
    #[must_use]
    pub fn is(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::Is, target)
    }

    /// `attribute is-not target`
    #[must_use]
    pub fn is_not(self, target: impl Into<Target>) -> Condition {
        self.build(Operator::IsNot, target)
    }

    /// Builds the condition from operator text.
    ///
    /// # Errors
    /// Returns `UnsupportedOperator` if the text names no known operator.
    pub fn op(self, operator: &str, target: impl Into<Target>) -> Result<Condition> {
        Ok(self.build(operator.parse()?, target))
    }
}
