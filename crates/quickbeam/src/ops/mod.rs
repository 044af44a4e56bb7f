//! Standard special operators
//!
//! A starter set registered through [`compile_handler`]; the surrounding
//! system's operator-definition facility registers the rest the same
//! way.

mod assign;
mod binding;
mod function;

use std::sync::Arc;

use crate::eval::{analyze, analyze_body, dispatch, eval_body, run_body};
use crate::operator::{
    compile_handler, global_registry, FormPattern, HandlerPair, HandlerSpec, ImmediateBody,
    OperatorRegistry,
};
use crate::value::Value;

/// Register the standard operators into `registry`.
pub fn install_operators(registry: &OperatorRegistry) {
    registry.register("quote", quote_handler());
    registry.register("if", if_handler());
    registry.register("progn", progn_handler());
    registry.register("let", binding::let_handler());
    registry.register("let*", binding::let_star_handler());
    registry.register("setq", assign::setq_handler());
    registry.register("lambda", function::lambda_handler());
}

/// Register the standard operators into the global registry.
///
/// Idempotent: re-registration fully replaces each pair.
pub fn install_default_operators() {
    install_operators(global_registry());
}

fn quote_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "quote",
        pattern: FormPattern::new("quote").required("object"),
        immediate: ImmediateBody::Custom(Arc::new(|bindings, _env, _ctx| {
            Ok(bindings.var("object").clone())
        })),
        deferred: Arc::new(|bindings| {
            let object = bindings.var("object").clone();
            Ok(Arc::new(move |_env, _ctx| Ok(object.clone())))
        }),
    })
}

fn if_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "if",
        pattern: FormPattern::new("if")
            .required("test")
            .required("then")
            .optional("else", Value::Nil),
        immediate: ImmediateBody::Custom(Arc::new(|bindings, env, ctx| {
            if dispatch(bindings.var("test"), env, ctx)?.is_truthy() {
                dispatch(bindings.var("then"), env, ctx)
            } else {
                dispatch(bindings.var("else"), env, ctx)
            }
        })),
        deferred: Arc::new(|bindings| {
            let test = analyze(bindings.var("test"))?;
            let then = analyze(bindings.var("then"))?;
            let alternative = analyze(bindings.var("else"))?;
            Ok(Arc::new(move |env, ctx| {
                if test(env, ctx)?.is_truthy() {
                    then(env, ctx)
                } else {
                    alternative(env, ctx)
                }
            }))
        }),
    })
}

fn progn_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "progn",
        pattern: FormPattern::new("progn").rest("body"),
        immediate: ImmediateBody::Custom(Arc::new(|bindings, env, ctx| {
            eval_body(bindings.rest("body"), env, ctx)
        })),
        deferred: Arc::new(|bindings| {
            let body = analyze_body(bindings.rest("body"))?;
            Ok(Arc::new(move |env, ctx| run_body(&body, env, ctx)))
        }),
    })
}
