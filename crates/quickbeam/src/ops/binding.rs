//! `let` and `let*`: parallel and sequential binding forms
//!
//! Both forms share one analysis step: parse the binding list, peel the
//! leading declarations, and cache the scope's processed declaration
//! sets. Per-activation work is evaluating initializers through the
//! frame binder and enforcing declared types at scope entry.

use std::sync::Arc;

use crate::binder::{bind_parallel, bind_sequential, BindTarget};
use crate::context::EvalContext;
use crate::declaration::{split_declarations, ScopeDecls};
use crate::error::{EvalError, Result};
use crate::eval::{analyze, analyze_body, dispatch, eval_body, run_body};
use crate::operator::{
    compile_handler, Bindings, FormPattern, HandlerPair, HandlerSpec, ImmediateBody,
};
use crate::value::Value;

/// The analyzed shape of a `let`/`let*` form: one slot per binding-list
/// entry, plus the scope's cached declarations and remaining body.
struct LetForm {
    slots: Vec<(Arc<str>, Value)>,
    decls: ScopeDecls,
    body: Vec<Value>,
}

impl LetForm {
    /// Shared prologue for both modes of both operators.
    fn analyze(bindings: &Bindings, operator: &'static str) -> Result<LetForm> {
        let malformed = |expected: &str| EvalError::MalformedForm {
            operator: operator.to_string(),
            expected: expected.to_string(),
        };

        let entries = bindings
            .var("bindings")
            .as_list()
            .ok_or_else(|| malformed("binding list"))?;

        let mut slots = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                // Bare symbol: binds to nil
                Value::Symbol(name) => slots.push((name.clone(), Value::Nil)),
                Value::List(pair) => {
                    let name = pair
                        .first()
                        .and_then(|n| n.as_symbol())
                        .ok_or_else(|| malformed("variable name in binding entry"))?;
                    if pair.len() > 2 {
                        return Err(malformed("binding entry of (name init)"));
                    }
                    let init = pair.get(1).cloned().unwrap_or(Value::Nil);
                    slots.push((name.clone(), init));
                }
                _ => return Err(malformed("binding entry symbol or list")),
            }
        }

        let (groups, rest) = split_declarations(bindings.rest("body"))?;
        Ok(LetForm {
            slots,
            decls: ScopeDecls::from_groups(&groups),
            body: rest.to_vec(),
        })
    }

    /// Derive the binder targets for one activation. A slot is dynamic
    /// if this scope declares it special or the context proclaims it so.
    fn targets(&self, ctx: &EvalContext) -> Vec<BindTarget> {
        self.slots
            .iter()
            .map(|(name, _)| BindTarget {
                name: name.clone(),
                dynamic: self.decls.is_special(name) || ctx.is_special(name),
            })
            .collect()
    }
}

fn let_pattern(operator: &'static str) -> FormPattern {
    FormPattern::new(operator).required("bindings").rest("body")
}

pub(super) fn let_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "let",
        pattern: let_pattern("let"),
        immediate: ImmediateBody::Custom(Arc::new(|bindings, env, ctx| {
            let form = LetForm::analyze(bindings, "let")?;
            let targets = form.targets(ctx);
            bind_parallel(
                &targets,
                env,
                ctx,
                |i, outer, ctx| dispatch(&form.slots[i].1, outer, ctx),
                |inner, ctx| {
                    form.decls.enforce_types(inner, ctx)?;
                    eval_body(&form.body, inner, ctx)
                },
            )
        })),
        deferred: Arc::new(|bindings| {
            let form = LetForm::analyze(bindings, "let")?;
            let inits: Vec<_> = form
                .slots
                .iter()
                .map(|(_, init)| analyze(init))
                .collect::<Result<_>>()?;
            let body = analyze_body(&form.body)?;
            Ok(Arc::new(move |env, ctx| {
                let targets = form.targets(ctx);
                bind_parallel(
                    &targets,
                    env,
                    ctx,
                    |i, outer, ctx| inits[i](outer, ctx),
                    |inner, ctx| {
                        form.decls.enforce_types(inner, ctx)?;
                        run_body(&body, inner, ctx)
                    },
                )
            }))
        }),
    })
}

pub(super) fn let_star_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "let*",
        pattern: let_pattern("let*"),
        // Immediate contexts go through the generated
        // compile-then-execute wrapper.
        immediate: ImmediateBody::Fallback,
        deferred: Arc::new(|bindings| {
            let form = LetForm::analyze(bindings, "let*")?;
            let inits: Vec<_> = form
                .slots
                .iter()
                .map(|(_, init)| analyze(init))
                .collect::<Result<_>>()?;
            let body = analyze_body(&form.body)?;
            Ok(Arc::new(move |env, ctx| {
                let targets = form.targets(ctx);
                bind_sequential(
                    &targets,
                    env,
                    ctx,
                    |i, so_far, ctx| inits[i](so_far, ctx),
                    |inner, ctx| {
                        form.decls.enforce_types(inner, ctx)?;
                        run_body(&body, inner, ctx)
                    },
                )
            }))
        }),
    })
}
