//! `lambda`: closure construction

use std::sync::Arc;

use crate::error::{EvalError, Result};
use crate::operator::{
    compile_handler, FormPattern, HandlerPair, HandlerSpec, ImmediateBody,
};
use crate::value::{ClosureValue, Value};

fn parse_params(params: &Value) -> Result<Vec<Arc<str>>> {
    let items = params.as_list().ok_or_else(|| EvalError::MalformedForm {
        operator: "lambda".to_string(),
        expected: "parameter list".to_string(),
    })?;
    items
        .iter()
        .map(|p| {
            p.as_symbol()
                .cloned()
                .ok_or_else(|| EvalError::MalformedForm {
                    operator: "lambda".to_string(),
                    expected: "parameter symbol".to_string(),
                })
        })
        .collect()
}

pub(super) fn lambda_handler() -> HandlerPair {
    compile_handler(HandlerSpec {
        name: "lambda",
        pattern: FormPattern::new("lambda").required("params").rest("body"),
        immediate: ImmediateBody::Custom(Arc::new(|bindings, env, _ctx| {
            let params = parse_params(bindings.var("params"))?;
            let body = Arc::new(bindings.rest("body").to_vec());
            Ok(Value::Closure(Arc::new(ClosureValue {
                params,
                body,
                env: env.clone(),
            })))
        })),
        deferred: Arc::new(|bindings| {
            // Parameters and body parse once; the closure captures the
            // environment in force at each execution.
            let params = parse_params(bindings.var("params"))?;
            let body = Arc::new(bindings.rest("body").to_vec());
            Ok(Arc::new(move |env, _ctx| {
                Ok(Value::Closure(Arc::new(ClosureValue {
                    params: params.clone(),
                    body: Arc::clone(&body),
                    env: env.clone(),
                })))
            }))
        }),
    })
}
