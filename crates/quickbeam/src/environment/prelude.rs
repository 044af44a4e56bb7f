//! Standard prelude with built-in functions

use std::sync::Arc;

use super::DynamicEnv;
use crate::value::{type_name, BuiltinFn, Value};

impl DynamicEnv {
    /// Load the standard prelude into the global cells.
    pub fn load_prelude(&self) {
        // Arithmetic
        self.define_builtin(BuiltinFn {
            name: "+".to_string(),
            arity: -1, // Variadic
            func: Arc::new(builtin_add),
        });

        self.define_builtin(BuiltinFn {
            name: "-".to_string(),
            arity: -1,
            func: Arc::new(builtin_sub),
        });

        self.define_builtin(BuiltinFn {
            name: "*".to_string(),
            arity: -1,
            func: Arc::new(builtin_mul),
        });

        // Comparison
        self.define_builtin(BuiltinFn {
            name: "=".to_string(),
            arity: 2,
            func: Arc::new(builtin_num_eq),
        });

        self.define_builtin(BuiltinFn {
            name: "<".to_string(),
            arity: 2,
            func: Arc::new(builtin_num_lt),
        });

        // Lists and logic
        self.define_builtin(BuiltinFn {
            name: "list".to_string(),
            arity: -1,
            func: Arc::new(builtin_list),
        });

        self.define_builtin(BuiltinFn {
            name: "not".to_string(),
            arity: 1,
            func: Arc::new(builtin_not),
        });
    }

    /// Register a built-in function under its own name.
    pub fn define_builtin(&self, builtin: BuiltinFn) {
        let name: Arc<str> = Arc::from(builtin.name.as_str());
        self.define(name, Value::Builtin(builtin));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn numeric(value: &Value) -> Result<f64, String> {
    match value {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(format!("expected number, got {}", type_name(other))),
    }
}

/// Fold two or more operands: integers when every operand is an
/// integer, floats otherwise.
fn fold_arith(
    args: &[Value],
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, String> {
    if args.iter().all(|a| matches!(a, Value::Int(_))) {
        let mut acc = match args[0] {
            Value::Int(n) => n,
            _ => unreachable!(),
        };
        for arg in &args[1..] {
            if let Value::Int(n) = arg {
                acc = int_op(acc, *n);
            }
        }
        Ok(Value::Int(acc))
    } else {
        let mut acc = numeric(&args[0])?;
        for arg in &args[1..] {
            acc = float_op(acc, numeric(arg)?);
        }
        Ok(Value::Float(acc))
    }
}

fn builtin_add(args: &[Value]) -> Result<Value, String> {
    match args {
        [] => Ok(Value::Int(0)),
        [only] => numeric(only).map(|_| only.clone()),
        rest => fold_arith(rest, |a, b| a.wrapping_add(b), |a, b| a + b),
    }
}

fn builtin_sub(args: &[Value]) -> Result<Value, String> {
    match args {
        [] => Err("expected at least 1 argument".to_string()),
        [Value::Int(n)] => Ok(Value::Int(n.wrapping_neg())),
        [only] => Ok(Value::Float(-numeric(only)?)),
        rest => fold_arith(rest, |a, b| a.wrapping_sub(b), |a, b| a - b),
    }
}

fn builtin_mul(args: &[Value]) -> Result<Value, String> {
    match args {
        [] => Ok(Value::Int(1)),
        [only] => numeric(only).map(|_| only.clone()),
        rest => fold_arith(rest, |a, b| a.wrapping_mul(b), |a, b| a * b),
    }
}

fn builtin_num_eq(args: &[Value]) -> Result<Value, String> {
    let (a, b) = (numeric(&args[0])?, numeric(&args[1])?);
    Ok(Value::Bool(a == b))
}

fn builtin_num_lt(args: &[Value]) -> Result<Value, String> {
    let (a, b) = (numeric(&args[0])?, numeric(&args[1])?);
    Ok(Value::Bool(a < b))
}

fn builtin_list(args: &[Value]) -> Result<Value, String> {
    Ok(Value::list(args.to_vec()))
}

fn builtin_not(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(!args[0].is_truthy()))
}
