//! Error types for the rete engine.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Only programmer errors are reported; data-level outcomes such as a
//! missing fact or a failed match are silent.

use std::fmt;

use thiserror::Error;

/// The main error type for rete operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unsupported operator error.
    #[must_use]
    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedOperator(operator.into()))
    }

    /// Creates a malformed condition error.
    #[must_use]
    pub fn malformed_condition(condition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedCondition {
            condition: condition.into(),
            reason: reason.into(),
        })
    }

    /// Creates an empty production error.
    #[must_use]
    pub fn empty_production() -> Self {
        Self::new(ErrorKind::EmptyProduction)
    }

    /// Creates a reentrant fire error.
    #[must_use]
    pub fn reentrant_fire() -> Self {
        Self::new(ErrorKind::ReentrantFire)
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an invariant violation error.
    #[must_use]
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvariantViolation(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Operator text outside the supported set.
    #[error("unsupported operator: {0:?}")]
    UnsupportedOperator(String),

    /// A condition that cannot be compiled into the network.
    #[error("malformed condition {condition}: {reason}")]
    MalformedCondition {
        /// The offending condition, rendered for display.
        condition: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A production declared without any conditions.
    #[error("production has no conditions")]
    EmptyProduction,

    /// `fire` was called from inside a production action.
    #[error("fire called while a fire cycle is already running")]
    ReentrantFire,

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// A memory holds a derivative the retraction index does not know
    /// about, or vice versa.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Fire cycles ran out before the network went quiet.
    MaxFireCycles {
        /// The configured limit.
        limit: usize,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxFireCycles { limit } => {
                write!(f, "max fire cycles ({limit}) exceeded")
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Production the error belongs to.
    pub production: Option<String>,
    /// Position of the offending condition within its production.
    pub condition: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the production name.
    #[must_use]
    pub fn with_production(mut self, production: impl Into<String>) -> Self {
        self.production = Some(production.into());
        self
    }

    /// Sets the condition position.
    #[must_use]
    pub fn with_condition(mut self, index: usize) -> Self {
        self.condition = Some(index);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(production) = &self.production {
            write!(f, "in {production}")?;
        }
        if let Some(index) = self.condition {
            if self.production.is_some() {
                write!(f, ", ")?;
            }
            write!(f, "condition #{index}")?;
        }
        Ok(())
    }
}
