//! Form evaluation: the generic dispatcher and the deferred analyzer

mod call;

pub use call::apply;

use std::sync::Arc;

use crate::context::EvalContext;
use crate::environment::{Environment, VarKind};
use crate::error::{EvalError, Result};
use crate::operator::{global_registry, Executable};
use crate::value::Value;

/// Evaluate a form immediately against an environment.
///
/// Atoms self-evaluate, symbols resolve as variable references, and a
/// non-empty list dispatches on its head symbol: a registered special
/// operator's handler runs, anything else is an ordinary function call.
///
/// A handler signaling [`EvalError::UnboundLexical`] is not treated as
/// a failure: the form is retried as a function call. That is the one
/// recoverable condition; all other errors propagate unchanged.
pub fn dispatch(form: &Value, env: &Environment, ctx: &EvalContext) -> Result<Value> {
    match form {
        Value::Symbol(name) => eval_symbol(name, env, ctx),
        Value::List(items) if !items.is_empty() => eval_list(form, items, env, ctx),
        other => Ok(other.clone()),
    }
}

fn eval_list(
    form: &Value,
    items: &[Value],
    env: &Environment,
    ctx: &EvalContext,
) -> Result<Value> {
    if let Some(name) = items[0].as_symbol() {
        if let Some(pair) = global_registry().lookup(name) {
            tracing::trace!(operator = %name, "dispatching special operator");
            let attempt = match &pair.immediate {
                Some(immediate) => immediate(form, env, ctx),
                // No immediate artifact: compile a throwaway executable
                None => (pair.deferred)(form).and_then(|exec| exec(env, ctx)),
            };
            return match attempt {
                Err(EvalError::UnboundLexical { name }) => {
                    tracing::trace!(name = %name, "absent from lexical frame, retrying as call");
                    eval_call(items, env, ctx)
                }
                other => other,
            };
        }
    }
    eval_call(items, env, ctx)
}

/// Resolve a variable reference: the lexical chain first, then the
/// dynamic cells (which also hold global definitions).
fn eval_symbol(name: &str, env: &Environment, ctx: &EvalContext) -> Result<Value> {
    match env.lookup(name) {
        Some(var) if var.kind == VarKind::Lexical => {
            env.lexical_value(&var)
                .ok_or_else(|| EvalError::UnboundVariable {
                    name: name.to_string(),
                })
        }
        // A dynamic marker or no frame binding at all: the cell decides
        _ => ctx
            .dynamics
            .get(name)
            .ok_or_else(|| EvalError::UnboundVariable {
                name: name.to_string(),
            }),
    }
}

/// Evaluate `items` as an ordinary function call.
fn eval_call(items: &[Value], env: &Environment, ctx: &EvalContext) -> Result<Value> {
    let callee = dispatch(&items[0], env, ctx)?;
    let args: Vec<Value> = items[1..]
        .iter()
        .map(|arg| dispatch(arg, env, ctx))
        .collect::<Result<Vec<_>>>()?;
    apply(callee, args, ctx)
}

/// Compile a form into a reusable [`Executable`].
///
/// This is the deferred strategy: analysis runs once, and the returned
/// artifact may be executed any number of times against different
/// environments. Registered operators compile through their deferred
/// handlers; other lists compile into calls.
pub fn analyze(form: &Value) -> Result<Executable> {
    match form {
        Value::Symbol(name) => {
            let name = name.clone();
            Ok(Arc::new(move |env, ctx| eval_symbol(&name, env, ctx)))
        }
        Value::List(items) if !items.is_empty() => {
            if let Some(name) = items[0].as_symbol() {
                if let Some(pair) = global_registry().lookup(name) {
                    tracing::trace!(operator = %name, "compiling special operator");
                    return (pair.deferred)(form);
                }
            }
            let callee = analyze(&items[0])?;
            let args: Vec<Executable> =
                items[1..].iter().map(analyze).collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(move |env, ctx| {
                let callee = callee(env, ctx)?;
                let argv: Vec<Value> = args
                    .iter()
                    .map(|arg| arg(env, ctx))
                    .collect::<Result<Vec<_>>>()?;
                apply(callee, argv, ctx)
            }))
        }
        other => {
            let value = other.clone();
            Ok(Arc::new(move |_env, _ctx| Ok(value.clone())))
        }
    }
}

/// Compile each form of a body.
pub(crate) fn analyze_body(forms: &[Value]) -> Result<Vec<Executable>> {
    forms.iter().map(analyze).collect()
}

/// Run a compiled body in sequence.
pub(crate) fn run_body(body: &[Executable], env: &Environment, ctx: &EvalContext) -> Result<Value> {
    let mut result = Value::Nil;
    for step in body {
        result = step(env, ctx)?;
    }
    Ok(result)
}

/// Evaluate a body of forms in sequence, immediately.
pub(crate) fn eval_body(forms: &[Value], env: &Environment, ctx: &EvalContext) -> Result<Value> {
    let mut result = Value::Nil;
    for form in forms {
        result = dispatch(form, env, ctx)?;
    }
    Ok(result)
}
