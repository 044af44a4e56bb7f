//! Handler generation: composing destructuring with mode bodies
//!
//! Every operator's evaluation logic exists in two interchangeable
//! strategies: an immediate evaluator (direct recursive evaluation of
//! the form) and a deferred compiler (the form is analyzed once into a
//! reusable executable). [`compile_handler`] composes the operator's
//! declared shape with caller-supplied bodies into both artifacts at
//! registration time.

use std::sync::Arc;

use super::destructure::{destructure, Bindings, FormPattern};
use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::Result;
use crate::value::Value;

/// An immediate-mode evaluator: form in, value out.
pub type Evaluator =
    Arc<dyn Fn(&Value, &Environment, &EvalContext) -> Result<Value> + Send + Sync>;

/// A pre-analyzed executable, produced once and run many times.
pub type Executable = Arc<dyn Fn(&Environment, &EvalContext) -> Result<Value> + Send + Sync>;

/// A deferred-mode compiler: form in, executable out.
pub type Compiler = Arc<dyn Fn(&Value) -> Result<Executable> + Send + Sync>;

/// An immediate-mode handler body, given the destructured bindings.
pub type ImmediateFn =
    Arc<dyn Fn(&Bindings, &Environment, &EvalContext) -> Result<Value> + Send + Sync>;

/// A deferred-mode handler body: analyze the destructured bindings into
/// an executable.
pub type DeferredFn = Arc<dyn Fn(&Bindings) -> Result<Executable> + Send + Sync>;

/// How an operator behaves in immediate-evaluation contexts.
pub enum ImmediateBody {
    /// Custom immediate logic.
    Custom(ImmediateFn),

    /// No custom logic: generate a thin wrapper that compiles a
    /// throwaway deferred artifact per call and executes it. Acceptable
    /// for rarely-invoked operators.
    Fallback,

    /// Immediate evaluation is unsupported: the pair carries no
    /// immediate artifact at all, and the generic dispatcher itself
    /// takes the compile-then-execute path. Custom logic never runs in
    /// immediate contexts.
    Unsupported,
}

/// The declarative specification [`compile_handler`] consumes: the
/// operator's declared shape (the code common to both modes), an
/// immediate-mode body, and the mandatory deferred-mode body.
pub struct HandlerSpec {
    /// Operator name (for diagnostics; registration picks the key)
    pub name: &'static str,

    /// Declared form shape, matched before either body runs
    pub pattern: FormPattern,

    /// Immediate-mode body
    pub immediate: ImmediateBody,

    /// Deferred-mode body
    pub deferred: DeferredFn,
}

/// An operator's current evaluation artifacts.
///
/// The deferred compiler is always present; the immediate evaluator is
/// optional (`ImmediateBody::Unsupported`).
pub struct HandlerPair {
    /// Immediate-mode evaluator, if the operator carries one
    pub immediate: Option<Evaluator>,

    /// Deferred-mode compiler
    pub deferred: Compiler,
}

impl std::fmt::Debug for HandlerPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerPair")
            .field("immediate", &self.immediate.is_some())
            .field("deferred", &true)
            .finish()
    }
}

/// Compose a handler pair from its specification.
///
/// Both artifacts share the destructuring prologue: the form is matched
/// against the declared pattern, then the mode body receives the
/// resulting bindings. The deferred compiler destructures once per
/// compilation; the immediate evaluator destructures per call, which is
/// inherent to immediate mode.
pub fn compile_handler(spec: HandlerSpec) -> HandlerPair {
    let pattern = Arc::new(spec.pattern);

    let deferred: Compiler = {
        let pattern = Arc::clone(&pattern);
        let body = Arc::clone(&spec.deferred);
        Arc::new(move |form| {
            let bindings = destructure(&pattern, form)?;
            body(&bindings)
        })
    };

    let immediate: Option<Evaluator> = match spec.immediate {
        ImmediateBody::Custom(body) => {
            let pattern = Arc::clone(&pattern);
            Some(Arc::new(move |form: &Value, env: &Environment, ctx: &EvalContext| {
                let bindings = destructure(&pattern, form)?;
                body(&bindings, env, ctx)
            }))
        }
        ImmediateBody::Fallback => {
            let name = spec.name;
            let deferred = Arc::clone(&deferred);
            Some(Arc::new(move |form: &Value, env: &Environment, ctx: &EvalContext| {
                tracing::trace!(operator = name, "immediate fallback via throwaway compile");
                let executable = deferred(form)?;
                executable(env, ctx)
            }))
        }
        ImmediateBody::Unsupported => None,
    };

    HandlerPair {
        immediate,
        deferred,
    }
}
