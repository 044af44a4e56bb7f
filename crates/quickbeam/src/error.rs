//! Error types for quickbeam evaluation

use thiserror::Error;

use crate::lock::LockViolation;

/// Main error type for quickbeam operations.
///
/// `UnboundLexical` is the one variant that is a control-flow redirect
/// rather than a true failure: the generic dispatcher catches it and
/// retries the form as an ordinary function call. Every other variant
/// propagates unchanged.
#[derive(Error, Debug)]
pub enum EvalError {
    /// A form does not match its operator's declared shape.
    #[error("malformed `{operator}` form: {expected}")]
    MalformedForm {
        /// Operator whose pattern failed to match
        operator: String,
        /// The unmatched schema position
        expected: String,
    },

    /// A variable reference found no binding, lexical or dynamic.
    #[error("unbound variable `{name}`")]
    UnboundVariable {
        /// The unresolved name
        name: String,
    },

    /// A variable an operator handler expected in the lexical frame is
    /// absent. The dispatcher recovers by retrying the form as a
    /// function call; handler bodies raise this to request that retry.
    #[error("variable `{name}` absent from lexical frame")]
    UnboundLexical {
        /// The absent name
        name: String,
    },

    /// A declared-type constraint was violated at scope entry.
    #[error("type check failed for `{target}`: declared {declared}, got {got}")]
    TypeCheck {
        /// The constrained variable
        target: String,
        /// The declared type
        declared: String,
        /// The offending value's type
        got: String,
    },

    /// A mutation of a protected identifier was rejected. Retains the
    /// low-level violation as its cause.
    #[error("operation forbidden on protected identifier `{name}`")]
    OperationForbidden {
        /// The protected identifier
        name: String,
        /// The underlying rejection
        #[source]
        cause: LockViolation,
    },

    /// Assignment to a lexical binding (lexical slots are write-once).
    #[error("cannot assign immutable lexical binding `{name}`")]
    ImmutableBinding {
        /// The lexical binding's name
        name: String,
    },

    /// A value in call position is not callable.
    #[error("expected function, found {kind}")]
    NotCallable {
        /// Type name of the offending value
        kind: String,
    },

    /// Argument count does not match a callable's parameter count.
    #[error("`{name}` expects {expected} arguments, got {got}")]
    ArityMismatch {
        /// Callable name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// A builtin function reported a failure.
    #[error("builtin `{name}`: {message}")]
    Builtin {
        /// Builtin name
        name: String,
        /// Failure description
        message: String,
    },

    /// Call depth exceeded the configured maximum.
    #[error("stack overflow: call depth {depth} exceeds maximum {max}")]
    StackOverflow {
        /// Depth at the point of failure
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Result type alias for quickbeam operations
pub type Result<T> = std::result::Result<T, EvalError>;
