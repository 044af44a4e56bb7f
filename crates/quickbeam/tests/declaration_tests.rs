//! Declared-type enforcement tests

use pretty_assertions::assert_eq;
use quickbeam::*;

fn setup() -> EvalContext {
    install_default_operators();
    EvalContext::with_prelude()
}

fn sym(name: &str) -> Value {
    Value::symbol(name)
}

fn declare_type(ty: &str, name: &str) -> Value {
    Value::list(vec![
        sym("declare"),
        Value::list(vec![sym(ty), sym(name)]),
    ])
}

#[test]
fn test_violation_fails_before_body_runs() {
    let ctx = setup();
    let env = Environment::new();
    ctx.dynamics.define("ran", Value::Bool(false));

    // (let ((v "text")) (declare (integer v)) (setq ran true))
    let form = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![sym("v"), Value::string("text")])]),
        declare_type("integer", "v"),
        Value::list(vec![sym("setq"), sym("ran"), Value::Bool(true)]),
    ]);

    match dispatch(&form, &env, &ctx) {
        Err(EvalError::TypeCheck { target, declared, got }) => {
            assert_eq!(target, "v");
            assert_eq!(declared, "integer");
            assert_eq!(got, "string");
        }
        other => panic!("expected TypeCheck, got {:?}", other),
    }

    // The body never executed
    assert_eq!(ctx.dynamics.get("ran"), Some(Value::Bool(false)));
}

#[test]
fn test_compliant_value_runs_body_unaffected() {
    let ctx = setup();
    let env = Environment::new();

    let form = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![sym("v"), Value::Int(21)])]),
        declare_type("integer", "v"),
        Value::list(vec![sym("*"), sym("v"), Value::Int(2)]),
    ]);

    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Int(42));
}

#[test]
fn test_enforcement_in_sequential_form() {
    let ctx = setup();
    let env = Environment::new();

    // (let* ((a 1) (b (+ a 0.5))) (declare (number a)) b)
    let form = Value::list(vec![
        sym("let*"),
        Value::list(vec![
            Value::list(vec![sym("a"), Value::Int(1)]),
            Value::list(vec![
                sym("b"),
                Value::list(vec![sym("+"), sym("a"), Value::Float(0.5)]),
            ]),
        ]),
        declare_type("number", "a"),
        sym("b"),
    ]);

    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Float(1.5));
}

#[test]
fn test_enforcement_on_dynamic_target() {
    let ctx = setup();
    let env = Environment::new();
    ctx.proclaim_special("*mode*");
    ctx.dynamics.define("*mode*", sym("fast"));

    // (let ((*mode* 3)) (declare (symbol *mode*)) ...) rejects the int
    let form = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![sym("*mode*"), Value::Int(3)])]),
        declare_type("symbol", "*mode*"),
        Value::Nil,
    ]);

    assert!(matches!(
        dispatch(&form, &env, &ctx),
        Err(EvalError::TypeCheck { .. })
    ));
    // The failed activation's rebinding did not leak
    assert_eq!(ctx.dynamics.get("*mode*"), Some(sym("fast")));
}

#[test]
fn test_deferred_artifact_enforces_per_activation() {
    let ctx = setup();

    // (let ((v n)) (declare (integer v)) v), compiled once
    let form = Value::list(vec![
        sym("let"),
        Value::list(vec![Value::list(vec![sym("v"), sym("n")])]),
        declare_type("integer", "v"),
        sym("v"),
    ]);
    let executable = analyze(&form).unwrap();

    let run = |n: Value| {
        let root = Environment::new();
        let mut builder = Frame::builder(1, None);
        builder.push_lexical("n", n);
        let env = root.extend(builder.finish());
        executable(&env, &ctx)
    };

    assert_eq!(run(Value::Int(5)).unwrap(), Value::Int(5));
    assert!(matches!(
        run(Value::string("no")),
        Err(EvalError::TypeCheck { .. })
    ));
    // And a compliant run afterwards still succeeds
    assert_eq!(run(Value::Int(6)).unwrap(), Value::Int(6));
}
