//! Binding-form tests: parallel/sequential semantics and dynamic unwind

use pretty_assertions::assert_eq;
use quickbeam::*;

fn setup() -> EvalContext {
    install_default_operators();
    EvalContext::with_prelude()
}

fn sym(name: &str) -> Value {
    Value::symbol(name)
}

/// `(let ((name init) ...) body...)`
fn let_form(operator: &str, bindings: Vec<Value>, body: Vec<Value>) -> Value {
    let mut items = vec![sym(operator), Value::list(bindings)];
    items.extend(body);
    Value::list(items)
}

fn pair(name: &str, init: Value) -> Value {
    Value::list(vec![sym(name), init])
}

// ═══════════════════════════════════════════════════════════════════════
// Parallel vs Sequential Binding
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_parallel_initializer_cannot_see_sibling() {
    let ctx = setup();
    let env = Environment::new();

    // (let ((x 1) (y x)) y): x is not visible to y's initializer
    let form = let_form(
        "let",
        vec![pair("x", Value::Int(1)), pair("y", sym("x"))],
        vec![sym("y")],
    );

    match dispatch(&form, &env, &ctx) {
        Err(EvalError::UnboundVariable { name }) => assert_eq!(name, "x"),
        other => panic!("expected unbound `x`, got {:?}", other),
    }
}

#[test]
fn test_sequential_initializer_sees_earlier_slot() {
    let ctx = setup();
    let env = Environment::new();

    // (let* ((x 1) (y x)) y) => 1
    let form = let_form(
        "let*",
        vec![pair("x", Value::Int(1)), pair("y", sym("x"))],
        vec![sym("y")],
    );

    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Int(1));
}

#[test]
fn test_parallel_binding_shadows_outer_scope() {
    let ctx = setup();
    let env = Environment::new();

    // (let ((x 1)) (let ((x 2) (y x)) (+ x y))) => 2 + 1
    let inner = let_form(
        "let",
        vec![pair("x", Value::Int(2)), pair("y", sym("x"))],
        vec![Value::list(vec![sym("+"), sym("x"), sym("y")])],
    );
    let form = let_form("let", vec![pair("x", Value::Int(1))], vec![inner]);

    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Int(3));
}

#[test]
fn test_bare_symbol_binds_nil() {
    let ctx = setup();
    let env = Environment::new();

    let form = let_form("let", vec![sym("x")], vec![sym("x")]);
    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Nil);
}

// ═══════════════════════════════════════════════════════════════════════
// Dynamic Targets
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_dynamic_rebinding_visible_to_independent_code() {
    let ctx = setup();
    let env = Environment::new();
    ctx.proclaim_special("*level*");
    ctx.dynamics.define("*level*", Value::Int(0));

    // A closure built outside the let reads *level* dynamically
    let probe = dispatch(
        &Value::list(vec![sym("lambda"), Value::list(vec![]), sym("*level*")]),
        &env,
        &ctx,
    )
    .unwrap();
    ctx.dynamics.define("probe", probe);

    // (let ((*level* 7)) (probe)) => 7
    let form = let_form(
        "let",
        vec![pair("*level*", Value::Int(7))],
        vec![Value::list(vec![sym("probe")])],
    );
    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Int(7));

    // The extent ended: the probe sees the global value again
    let call = Value::list(vec![sym("probe")]);
    assert_eq!(dispatch(&call, &env, &ctx).unwrap(), Value::Int(0));
}

#[test]
fn test_parallel_error_rolls_back_all_dynamic_installs() {
    let ctx = setup();
    let env = Environment::new();
    ctx.proclaim_special("*a*");
    ctx.proclaim_special("*b*");
    ctx.dynamics.define("*a*", Value::Int(1));
    ctx.dynamics.define("*b*", Value::Int(2));

    // (let ((*a* 10) (*b* 20) (c missing)) ...): the initializer error
    // arrives before any dynamic installation happens
    let form = let_form(
        "let",
        vec![
            pair("*a*", Value::Int(10)),
            pair("*b*", Value::Int(20)),
            pair("c", sym("missing")),
        ],
        vec![Value::Nil],
    );

    assert!(dispatch(&form, &env, &ctx).is_err());
    assert_eq!(ctx.dynamics.get("*a*"), Some(Value::Int(1)));
    assert_eq!(ctx.dynamics.get("*b*"), Some(Value::Int(2)));
}

#[test]
fn test_sequential_error_unwinds_installed_rebindings() {
    let ctx = setup();
    let env = Environment::new();
    ctx.proclaim_special("*a*");
    ctx.dynamics.define("*a*", Value::Int(1));

    // (let* ((*a* 10) (b missing)) ...): *a* is installed while b's
    // initializer runs, and restored before the error escapes
    let form = let_form(
        "let*",
        vec![pair("*a*", Value::Int(10)), pair("b", sym("missing"))],
        vec![Value::Nil],
    );

    assert!(dispatch(&form, &env, &ctx).is_err());
    assert_eq!(ctx.dynamics.get("*a*"), Some(Value::Int(1)));
}

#[test]
fn test_sequential_dynamic_rebinding_seen_by_later_initializer() {
    let ctx = setup();
    let env = Environment::new();
    ctx.proclaim_special("*a*");
    ctx.dynamics.define("*a*", Value::Int(1));

    // (let* ((*a* 10) (b *a*)) b) => 10
    let form = let_form(
        "let*",
        vec![pair("*a*", Value::Int(10)), pair("b", sym("*a*"))],
        vec![sym("b")],
    );

    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Int(10));
    assert_eq!(ctx.dynamics.get("*a*"), Some(Value::Int(1)));
}

#[test]
fn test_locally_declared_special_binds_dynamically() {
    let ctx = setup();
    let env = Environment::new();
    ctx.dynamics.define("d", Value::Int(0));

    // (let ((d 5)) (declare (special d)) (probe)) with a probe closure
    // reading d from the dynamic cells, not the lexical frame
    let probe = dispatch(
        &Value::list(vec![sym("lambda"), Value::list(vec![]), sym("d")]),
        &env,
        &ctx,
    )
    .unwrap();
    ctx.dynamics.define("probe", probe);

    let form = let_form(
        "let",
        vec![pair("d", Value::Int(5))],
        vec![
            Value::list(vec![
                sym("declare"),
                Value::list(vec![sym("special"), sym("d")]),
            ]),
            Value::list(vec![sym("probe")]),
        ],
    );

    assert_eq!(dispatch(&form, &env, &ctx).unwrap(), Value::Int(5));
    assert_eq!(ctx.dynamics.get("d"), Some(Value::Int(0)));
}

// ═══════════════════════════════════════════════════════════════════════
// Direct Binder API
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_bind_parallel_continuation_env_is_populated() {
    let ctx = EvalContext::new();
    let env = Environment::new();
    let targets = vec![BindTarget::lexical("x"), BindTarget::lexical("y")];

    let result = bind_parallel(
        &targets,
        &env,
        &ctx,
        |i, _, _| Ok(Value::Int(i as i64 + 1)),
        |inner, _| {
            let x = inner.lookup("x").unwrap();
            let y = inner.lookup("y").unwrap();
            match (inner.lexical_value(&x), inner.lexical_value(&y)) {
                (Some(Value::Int(a)), Some(Value::Int(b))) => Ok(Value::Int(a + b)),
                _ => panic!("slots not populated"),
            }
        },
    )
    .unwrap();

    assert_eq!(result, Value::Int(3));
}

#[test]
fn test_bind_sequential_zero_slots_runs_body() {
    let ctx = EvalContext::new();
    let env = Environment::new();

    let result = bind_sequential(
        &[],
        &env,
        &ctx,
        |_, _, _| unreachable!("no slots to initialize"),
        |_, _| Ok(Value::Int(99)),
    )
    .unwrap();

    assert_eq!(result, Value::Int(99));
}
