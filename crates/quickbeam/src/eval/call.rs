//! Function application

use crate::context::EvalContext;
use crate::environment::Frame;
use crate::error::{EvalError, Result};
use crate::value::{type_name, BuiltinFn, ClosureValue, Value};

use super::dispatch;

/// Call a value with already-evaluated arguments.
///
/// # Errors
///
/// Returns `NotCallable` if the value is not callable and
/// `ArityMismatch` if the argument count doesn't match.
pub fn apply(callee: Value, args: Vec<Value>, ctx: &EvalContext) -> Result<Value> {
    match callee {
        Value::Builtin(f) => call_builtin(&f, &args),
        Value::Closure(c) => call_closure(&c, args, ctx),
        other => Err(EvalError::NotCallable {
            kind: type_name(&other).to_string(),
        }),
    }
}

fn call_builtin(builtin: &BuiltinFn, args: &[Value]) -> Result<Value> {
    if builtin.arity >= 0 && args.len() != builtin.arity as usize {
        return Err(EvalError::ArityMismatch {
            name: builtin.name.clone(),
            expected: builtin.arity as usize,
            got: args.len(),
        });
    }
    (builtin.func)(args).map_err(|message| EvalError::Builtin {
        name: builtin.name.clone(),
        message,
    })
}

fn call_closure(closure: &ClosureValue, args: Vec<Value>, ctx: &EvalContext) -> Result<Value> {
    if args.len() != closure.params.len() {
        return Err(EvalError::ArityMismatch {
            name: "lambda".to_string(),
            expected: closure.params.len(),
            got: args.len(),
        });
    }

    // Track call depth (stack overflow protection)
    ctx.enter_call()?;

    // Bind parameters over the captured chain
    let mut builder = Frame::builder(closure.params.len(), closure.env.head().cloned());
    for (param, arg) in closure.params.iter().zip(args.into_iter()) {
        builder.push_lexical(param.clone(), arg);
    }
    let env = closure.env.extend(builder.finish());

    let mut result = Ok(Value::Nil);
    for form in closure.body.iter() {
        result = dispatch(form, &env, ctx);
        if result.is_err() {
            break;
        }
    }

    ctx.exit_call();
    result
}
