//! Callable value types: builtins and closures

use std::sync::Arc;

use super::Value;
use crate::environment::Environment;

/// Type alias for builtin function pointers to reduce complexity
pub type BuiltinFnPtr = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// A built-in native function.
///
/// These are Rust functions exposed to the interpreter. Builtins report
/// failures as plain strings; the caller lifts them into `EvalError`.
#[derive(Clone)]
pub struct BuiltinFn {
    /// Function name (for display/debugging)
    pub name: String,

    /// Arity (-1 for variadic)
    pub arity: i32,

    /// The actual function pointer
    pub func: BuiltinFnPtr,
}

impl std::fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

/// A closure with captured environment chain.
///
/// The environment is the immutable frame chain in force at the point
/// the `lambda` form was evaluated; holding the closure keeps those
/// frames alive past their binding form's activation.
#[derive(Debug, Clone)]
pub struct ClosureValue {
    /// Parameter names
    pub params: Vec<Arc<str>>,

    /// Body forms, evaluated in sequence
    pub body: Arc<Vec<Value>>,

    /// The captured frame chain
    pub env: Environment,
}
