//! Declaration processing and declared-type enforcement
//!
//! A scope may carry several `(declare ...)` clauses, each holding
//! several specifiers; [`iterate_declarations`] flattens the two-level
//! structure. [`ScopeDecls`] derives the scope's type-constraint set and
//! its locally-special names once, at analysis time, so per-activation
//! work is limited to [`ScopeDecls::enforce_types`].

use std::fmt;
use std::sync::Arc;

use crate::context::EvalContext;
use crate::environment::{Environment, VarKind};
use crate::error::{EvalError, Result};
use crate::value::{type_name, Value};

/// One declaration specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclSpec {
    /// `(type <spec> <name>...)` or shorthand `(<spec> <name>...)`
    Type {
        /// The constrained variable
        name: Arc<str>,
        /// The declared type
        declared: TypeSpec,
    },

    /// `(special <name>...)`
    Special {
        /// The variable made dynamic in this scope
        name: Arc<str>,
    },
}

/// One `(declare ...)` clause's specifiers, in source order.
pub type DeclGroup = Vec<DeclSpec>;

/// Flatten per-scope declaration groups into one ordered sequence.
pub fn iterate_declarations(groups: &[DeclGroup]) -> impl Iterator<Item = &DeclSpec> {
    groups.iter().flatten()
}

/// Peel leading `(declare ...)` forms off a binding-form body.
///
/// Returns the declaration groups (one per `declare` clause, two levels
/// deep) and the remaining body forms. Scanning stops at the first form
/// that is not a `declare` list.
pub fn split_declarations(body: &[Value]) -> Result<(Vec<DeclGroup>, &[Value])> {
    let mut groups = Vec::new();
    let mut rest = body;

    while let Some(form) = rest.first() {
        let Some(items) = form.as_list() else { break };
        let is_declare = items
            .first()
            .and_then(|head| head.as_symbol())
            .is_some_and(|name| name.as_ref() == "declare");
        if !is_declare {
            break;
        }
        groups.push(parse_declare_clause(&items[1..])?);
        rest = &rest[1..];
    }

    Ok((groups, rest))
}

fn parse_declare_clause(specifiers: &[Value]) -> Result<DeclGroup> {
    let mut group = Vec::new();
    for spec in specifiers {
        let items = spec.as_list().ok_or_else(|| malformed("list specifier"))?;
        let head = items
            .first()
            .and_then(|h| h.as_symbol())
            .ok_or_else(|| malformed("specifier head symbol"))?;

        match head.as_ref() {
            "special" => {
                for name in &items[1..] {
                    let name = name.as_symbol().ok_or_else(|| malformed("variable name"))?;
                    group.push(DeclSpec::Special { name: name.clone() });
                }
            }
            "type" => {
                let declared = items
                    .get(1)
                    .and_then(|t| t.as_symbol())
                    .and_then(|t| TypeSpec::from_name(t))
                    .ok_or_else(|| malformed("type specifier"))?;
                for name in &items[2..] {
                    let name = name.as_symbol().ok_or_else(|| malformed("variable name"))?;
                    group.push(DeclSpec::Type {
                        name: name.clone(),
                        declared,
                    });
                }
            }
            // Shorthand: (integer x y) means (type integer x y)
            shorthand => {
                let declared = TypeSpec::from_name(shorthand)
                    .ok_or_else(|| malformed("known declaration specifier"))?;
                for name in &items[1..] {
                    let name = name.as_symbol().ok_or_else(|| malformed("variable name"))?;
                    group.push(DeclSpec::Type {
                        name: name.clone(),
                        declared,
                    });
                }
            }
        }
    }
    Ok(group)
}

fn malformed(expected: &str) -> EvalError {
    EvalError::MalformedForm {
        operator: "declare".to_string(),
        expected: format!("expected {}", expected),
    }
}

/// A declarable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    /// 64-bit integers
    Integer,
    /// 64-bit floats
    Float,
    /// Integers or floats
    Number,
    /// `true` or `false`
    Boolean,
    /// Strings
    String,
    /// Symbols
    Symbol,
    /// Proper lists
    List,
    /// Builtins or closures
    Function,
}

impl TypeSpec {
    /// Look up a type by its declared name.
    pub fn from_name(name: &str) -> Option<TypeSpec> {
        match name {
            "integer" => Some(TypeSpec::Integer),
            "float" => Some(TypeSpec::Float),
            "number" => Some(TypeSpec::Number),
            "boolean" => Some(TypeSpec::Boolean),
            "string" => Some(TypeSpec::String),
            "symbol" => Some(TypeSpec::Symbol),
            "list" => Some(TypeSpec::List),
            "function" => Some(TypeSpec::Function),
            _ => None,
        }
    }

    /// Whether `value` satisfies this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeSpec::Integer => matches!(value, Value::Int(_)),
            TypeSpec::Float => matches!(value, Value::Float(_)),
            TypeSpec::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            TypeSpec::Boolean => matches!(value, Value::Bool(_)),
            TypeSpec::String => matches!(value, Value::Str(_)),
            TypeSpec::Symbol => matches!(value, Value::Symbol(_)),
            TypeSpec::List => matches!(value, Value::List(_)),
            TypeSpec::Function => matches!(value, Value::Builtin(_) | Value::Closure(_)),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeSpec::Integer => "integer",
            TypeSpec::Float => "float",
            TypeSpec::Number => "number",
            TypeSpec::Boolean => "boolean",
            TypeSpec::String => "string",
            TypeSpec::Symbol => "symbol",
            TypeSpec::List => "list",
            TypeSpec::Function => "function",
        };
        write!(f, "{}", name)
    }
}

/// A declared-type constraint on one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConstraint {
    /// The constrained variable
    pub target: Arc<str>,

    /// The declared type
    pub declared: TypeSpec,
}

/// A scope's processed declarations: type constraints and
/// locally-special names, derived once from the declaration groups and
/// cached for the scope's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ScopeDecls {
    constraints: Vec<TypeConstraint>,
    special: Vec<Arc<str>>,
}

impl ScopeDecls {
    /// Derive the cached sets from declaration groups.
    pub fn from_groups(groups: &[DeclGroup]) -> Self {
        let mut decls = ScopeDecls::default();
        for spec in iterate_declarations(groups) {
            match spec {
                DeclSpec::Type { name, declared } => decls.constraints.push(TypeConstraint {
                    target: name.clone(),
                    declared: *declared,
                }),
                DeclSpec::Special { name } => decls.special.push(name.clone()),
            }
        }
        decls
    }

    /// Whether this scope declares `name` special.
    pub fn is_special(&self, name: &str) -> bool {
        self.special.iter().any(|s| s.as_ref() == name)
    }

    /// The cached constraint set.
    pub fn constraints(&self) -> &[TypeConstraint] {
        &self.constraints
    }

    /// Enforce the cached constraints against the current environment.
    ///
    /// Runs at scope entry, before the body. Fails on the first
    /// violation; has no side effects otherwise.
    pub fn enforce_types(&self, env: &Environment, ctx: &EvalContext) -> Result<()> {
        for constraint in &self.constraints {
            let value = resolve(&constraint.target, env, ctx)?;
            if !constraint.declared.matches(&value) {
                return Err(EvalError::TypeCheck {
                    target: constraint.target.to_string(),
                    declared: constraint.declared.to_string(),
                    got: type_name(&value).to_string(),
                });
            }
        }
        Ok(())
    }
}

fn resolve(name: &str, env: &Environment, ctx: &EvalContext) -> Result<Value> {
    match env.lookup(name) {
        Some(var) if var.kind == VarKind::Lexical => {
            env.lexical_value(&var)
                .ok_or_else(|| EvalError::UnboundVariable {
                    name: name.to_string(),
                })
        }
        // Dynamic marker, or no frame at all: the cell is authoritative
        _ => ctx
            .dynamics
            .get(name)
            .ok_or_else(|| EvalError::UnboundVariable {
                name: name.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declare(src_specs: Vec<Value>) -> Value {
        let mut items = vec![Value::symbol("declare")];
        items.extend(src_specs);
        Value::list(items)
    }

    #[test]
    fn test_split_declarations_stops_at_body() {
        let body = vec![
            declare(vec![Value::list(vec![
                Value::symbol("integer"),
                Value::symbol("x"),
            ])]),
            declare(vec![Value::list(vec![
                Value::symbol("special"),
                Value::symbol("y"),
            ])]),
            Value::Int(42),
            declare(vec![]), // not a declaration: after the body starts
        ];

        let (groups, rest) = split_declarations(&body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0], Value::Int(42));
    }

    #[test]
    fn test_iterate_declarations_flattens_in_order() {
        let groups = vec![
            vec![
                DeclSpec::Special { name: Arc::from("a") },
                DeclSpec::Special { name: Arc::from("b") },
            ],
            vec![DeclSpec::Special { name: Arc::from("c") }],
        ];

        let names: Vec<_> = iterate_declarations(&groups)
            .map(|s| match s {
                DeclSpec::Special { name } => name.to_string(),
                DeclSpec::Type { name, .. } => name.to_string(),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        // Restartable: a second pass yields the same sequence
        assert_eq!(iterate_declarations(&groups).count(), 3);
    }

    #[test]
    fn test_multi_name_specifiers() {
        let body = vec![declare(vec![
            Value::list(vec![
                Value::symbol("type"),
                Value::symbol("integer"),
                Value::symbol("x"),
                Value::symbol("y"),
            ]),
            Value::list(vec![Value::symbol("special"), Value::symbol("z")]),
        ])];

        let (groups, _) = split_declarations(&body).unwrap();
        let decls = ScopeDecls::from_groups(&groups);
        assert_eq!(decls.constraints().len(), 2);
        assert!(decls.is_special("z"));
        assert!(!decls.is_special("x"));
    }

    #[test]
    fn test_unknown_specifier_is_malformed() {
        let body = vec![declare(vec![Value::list(vec![
            Value::symbol("inline"),
            Value::symbol("f"),
        ])])];
        assert!(matches!(
            split_declarations(&body),
            Err(EvalError::MalformedForm { .. })
        ));
    }

    #[test]
    fn test_enforce_types_lexical_violation() {
        let groups = vec![vec![DeclSpec::Type {
            name: Arc::from("v"),
            declared: TypeSpec::Integer,
        }]];
        let decls = ScopeDecls::from_groups(&groups);

        let ctx = EvalContext::new();
        let root = Environment::new();
        let mut builder = crate::environment::Frame::builder(1, None);
        builder.push_lexical("v", Value::string("not an int"));
        let env = root.extend(builder.finish());

        match decls.enforce_types(&env, &ctx) {
            Err(EvalError::TypeCheck { target, declared, got }) => {
                assert_eq!(target, "v");
                assert_eq!(declared, "integer");
                assert_eq!(got, "string");
            }
            other => panic!("expected TypeCheck, got {:?}", other),
        }
    }

    #[test]
    fn test_enforce_types_compliant_value() {
        let groups = vec![vec![DeclSpec::Type {
            name: Arc::from("v"),
            declared: TypeSpec::Number,
        }]];
        let decls = ScopeDecls::from_groups(&groups);

        let ctx = EvalContext::new();
        ctx.dynamics.define("v", Value::Float(1.5));
        let env = Environment::new();
        assert!(decls.enforce_types(&env, &ctx).is_ok());
    }
}
