//! Frame binder: parallel and sequential variable introduction
//!
//! Both binders build environment frames that may mix lexically-scoped
//! and dynamically-scoped targets. Dynamic rebindings are installed
//! through [`DynamicExtent`] guards, so they unwind on every exit path.

use std::sync::Arc;

use crate::context::EvalContext;
use crate::environment::{DynamicExtent, Environment, Frame};
use crate::error::Result;
use crate::value::Value;

/// One slot of a binding form: the variable's name and whether it is a
/// dynamic (special) target.
#[derive(Debug, Clone)]
pub struct BindTarget {
    /// Variable name
    pub name: Arc<str>,

    /// Dynamic targets get a marker slot; their values live in the
    /// dynamic environment for the form's extent.
    pub dynamic: bool,
}

impl BindTarget {
    /// Create a lexical target.
    pub fn lexical(name: impl Into<Arc<str>>) -> Self {
        BindTarget {
            name: name.into(),
            dynamic: false,
        }
    }

    /// Create a dynamic target.
    pub fn dynamic(name: impl Into<Arc<str>>) -> Self {
        BindTarget {
            name: name.into(),
            dynamic: true,
        }
    }
}

/// Parallel (`let`-style) binding.
///
/// Every initializer is evaluated against `env`, the outer pre-binding
/// environment: no initializer sees any of the new bindings. Lexical
/// values are written straight into the frame under construction;
/// dynamic values collect into a pending list, installed together as a
/// single dynamic extent only after every initializer has succeeded.
/// An initializer error therefore leaves zero dynamic installations and
/// no partially-bound frame behind.
///
/// `eval_init` is called once per slot, in order, with the slot index.
/// The continuation runs against the populated child environment.
pub fn bind_parallel<I, K>(
    targets: &[BindTarget],
    env: &Environment,
    ctx: &EvalContext,
    mut eval_init: I,
    continuation: K,
) -> Result<Value>
where
    I: FnMut(usize, &Environment, &EvalContext) -> Result<Value>,
    K: FnOnce(&Environment, &EvalContext) -> Result<Value>,
{
    let mut builder = Frame::builder(targets.len(), env.head().cloned());
    let mut pending: Vec<(Arc<str>, Value)> = Vec::new();

    for (i, target) in targets.iter().enumerate() {
        let value = eval_init(i, env, ctx)?;
        if target.dynamic {
            builder.push_dynamic(target.name.clone());
            pending.push((target.name.clone(), value));
        } else {
            builder.push_lexical(target.name.clone(), value);
        }
    }

    let inner = env.extend(builder.finish());
    if pending.is_empty() {
        continuation(&inner, ctx)
    } else {
        let _extent = DynamicExtent::install(&ctx.dynamics, pending);
        continuation(&inner, ctx)
    }
}

/// Sequential (`let*`-style) binding.
///
/// Slot `i`'s initializer is evaluated against the environment already
/// extended by slots `0..i`, so later initializers see earlier
/// bindings. A dynamic slot's rebinding is installed immediately before
/// recursing to the next slot and unwound when that recursive call
/// returns, normally or by error.
pub fn bind_sequential<I, K>(
    targets: &[BindTarget],
    env: &Environment,
    ctx: &EvalContext,
    mut eval_init: I,
    body: K,
) -> Result<Value>
where
    I: FnMut(usize, &Environment, &EvalContext) -> Result<Value>,
    K: FnOnce(&Environment, &EvalContext) -> Result<Value>,
{
    seq_step(targets, 0, env, ctx, &mut eval_init, body)
}

fn seq_step<I, K>(
    targets: &[BindTarget],
    index: usize,
    env: &Environment,
    ctx: &EvalContext,
    eval_init: &mut I,
    body: K,
) -> Result<Value>
where
    I: FnMut(usize, &Environment, &EvalContext) -> Result<Value>,
    K: FnOnce(&Environment, &EvalContext) -> Result<Value>,
{
    let Some(target) = targets.get(index) else {
        return body(env, ctx);
    };

    let value = eval_init(index, env, ctx)?;
    let mut builder = Frame::builder(1, env.head().cloned());

    if target.dynamic {
        builder.push_dynamic(target.name.clone());
        let inner = env.extend(builder.finish());
        let _extent =
            DynamicExtent::install(&ctx.dynamics, vec![(target.name.clone(), value)]);
        seq_step(targets, index + 1, &inner, ctx, eval_init, body)
    } else {
        builder.push_lexical(target.name.clone(), value);
        let inner = env.extend(builder.finish());
        seq_step(targets, index + 1, &inner, ctx, eval_init, body)
    }
}
