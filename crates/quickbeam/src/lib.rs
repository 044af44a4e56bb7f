//! # Quickbeam
//!
//! The special-form dispatch and variable-binding engine of a
//! tree-walking interpreter for a Lisp-like language.
//!
//! Quickbeam is the core an evaluator plugs into: it resolves operator
//! names to evaluation logic, generates that logic in two
//! interchangeable strategies (immediate recursive evaluation and a
//! pre-analyzed deferred executable), and builds the environment frames
//! for parallel and sequential binding forms, including mixed
//! lexical/dynamic targets, declared-type enforcement at scope entry,
//! and protected-identifier mutation guarding.
//!
//! ## Architecture
//!
//! - **Operator Registry**: operator name → handler pair, atomic
//!   replacement, read-mostly
//! - **Handler Generator**: declared form shape + mode bodies →
//!   immediate/deferred artifacts
//! - **Frame Binder**: `let`-style and `let*`-style frame construction
//!   with exception-safe dynamic rebinding extents
//! - **Declarations**: flattened declaration groups, cached type
//!   constraints enforced at scope entry
//! - **Lock Bridge**: protected-identifier violations translated into
//!   the interpreter's error vocabulary
//!
//! The reader, macro expander, code generators, and standard library
//! are external collaborators.

pub mod binder;
pub mod context;
pub mod declaration;
pub mod environment;
pub mod error;
pub mod eval;
pub mod lock;
pub mod operator;
pub mod ops;
pub mod value;

// Re-export main types
pub use binder::{bind_parallel, bind_sequential, BindTarget};
pub use context::EvalContext;
pub use declaration::{
    iterate_declarations, split_declarations, DeclGroup, DeclSpec, ScopeDecls, TypeConstraint,
    TypeSpec,
};
pub use environment::{
    DynamicEnv, DynamicExtent, Environment, Frame, FrameBuilder, VarKind, VarRef,
};
pub use error::{EvalError, Result};
pub use eval::{analyze, apply, dispatch};
pub use lock::{with_mutation_guard, LockTable, LockViolation};
pub use operator::{
    compile_handler, destructure, global_registry, Bindings, Compiler, DeferredFn, Evaluator,
    Executable, FormPattern, HandlerPair, HandlerSpec, ImmediateBody, ImmediateFn,
    OperatorRegistry,
};
pub use ops::{install_default_operators, install_operators};
pub use value::{type_name, BuiltinFn, BuiltinFnPtr, ClosureValue, Value};

/// Quickbeam version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
