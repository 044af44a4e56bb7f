//! `setq`: assignment to dynamic and global cells
//!
//! Lexical slots are write-once per activation, so `setq` on a lexical
//! binding is an error; dynamic and global cells are mutable, and every
//! write goes through the mutation guard so protected identifiers are
//! rejected uniformly in both evaluation modes.

use std::sync::Arc;

use crate::context::EvalContext;
use crate::environment::{Environment, VarKind};
use crate::error::{EvalError, Result};
use crate::eval::{analyze, dispatch};
use crate::lock::with_mutation_guard;
use crate::operator::{
    compile_handler, FormPattern, HandlerPair, HandlerSpec, ImmediateBody,
};
use crate::value::Value;

fn malformed(expected: &str) -> EvalError {
    EvalError::MalformedForm {
        operator: "setq".to_string(),
        expected: expected.to_string(),
    }
}

/// Write one variable, routing cell mutation through the lock bridge.
fn assign(name: &Arc<str>, value: Value, env: &Environment, ctx: &EvalContext) -> Result<()> {
    match env.lookup(name) {
        Some(var) if var.kind == VarKind::Lexical => Err(EvalError::ImmutableBinding {
            name: name.to_string(),
        }),
        // Dynamic marker or plain cell; an unbound name defines a global
        _ => with_mutation_guard(ctx, |locks| {
            locks.check(name)?;
            ctx.dynamics.define(name.clone(), value);
            Ok(())
        }),
    }
}

/// Split the flat `name value ...` tail into checked pairs.
fn parse_pairs(pairs: &[Value]) -> Result<Vec<(Arc<str>, Value)>> {
    if pairs.len() % 2 != 0 {
        return Err(malformed("name/value pairs"));
    }
    pairs
        .chunks(2)
        .map(|chunk| {
            let name = chunk[0]
                .as_symbol()
                .ok_or_else(|| malformed("variable name"))?;
            Ok((name.clone(), chunk[1].clone()))
        })
        .collect()
}

pub(super) fn setq_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "setq",
        pattern: FormPattern::new("setq").rest("pairs"),
        immediate: ImmediateBody::Custom(Arc::new(|bindings, env, ctx| {
            let pairs = parse_pairs(bindings.rest("pairs"))?;
            let mut result = Value::Nil;
            for (name, form) in &pairs {
                result = dispatch(form, env, ctx)?;
                assign(name, result.clone(), env, ctx)?;
            }
            Ok(result)
        })),
        deferred: Arc::new(|bindings| {
            let pairs = parse_pairs(bindings.rest("pairs"))?;
            let compiled: Vec<(Arc<str>, _)> = pairs
                .into_iter()
                .map(|(name, form)| Ok((name, analyze(&form)?)))
                .collect::<Result<_>>()?;
            Ok(Arc::new(move |env, ctx| {
                let mut result = Value::Nil;
                for (name, init) in &compiled {
                    result = init(env, ctx)?;
                    assign(name, result.clone(), env, ctx)?;
                }
                Ok(result)
            }))
        }),
    })
}
