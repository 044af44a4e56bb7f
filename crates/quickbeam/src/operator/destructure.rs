//! Form destructuring against declared operator shapes

use crate::error::{EvalError, Result};
use crate::value::Value;

/// The declared shape of an operator's forms.
///
/// A pattern has, in order: fixed required positions, optional positions
/// with defaults, then either a rest capture or keyword-style named
/// groups (`:name value` pairs). Construction is builder-style:
///
/// ```
/// use quickbeam::{FormPattern, Value};
///
/// let pattern = FormPattern::new("if")
///     .required("test")
///     .required("then")
///     .optional("else", Value::Nil);
/// ```
#[derive(Debug, Clone)]
pub struct FormPattern {
    operator: &'static str,
    required: Vec<&'static str>,
    optional: Vec<(&'static str, Value)>,
    rest: Option<&'static str>,
    keys: Vec<(&'static str, Value)>,
}

impl FormPattern {
    /// Start a pattern for `operator`.
    pub fn new(operator: &'static str) -> Self {
        FormPattern {
            operator,
            required: Vec::new(),
            optional: Vec::new(),
            rest: None,
            keys: Vec::new(),
        }
    }

    /// Add a fixed required position.
    pub fn required(mut self, name: &'static str) -> Self {
        self.required.push(name);
        self
    }

    /// Add an optional position with a default.
    pub fn optional(mut self, name: &'static str, default: Value) -> Self {
        self.optional.push((name, default));
        self
    }

    /// Capture all remaining subexpressions under `name`.
    pub fn rest(mut self, name: &'static str) -> Self {
        self.rest = Some(name);
        self
    }

    /// Accept a keyword-style group `:name value`, with a default when
    /// the keyword is absent.
    pub fn key(mut self, name: &'static str, default: Value) -> Self {
        self.keys.push((name, default));
        self
    }

    /// The operator this pattern belongs to.
    pub fn operator(&self) -> &'static str {
        self.operator
    }

    fn fail(&self, expected: impl Into<String>) -> EvalError {
        EvalError::MalformedForm {
            operator: self.operator.to_string(),
            expected: expected.into(),
        }
    }
}

/// Pattern variables bound by a successful match, in pattern order.
///
/// Patterns have a handful of variables at most, so storage is a plain
/// ordered vector with linear lookup.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    vars: Vec<(&'static str, Value)>,
}

impl Bindings {
    /// Read a pattern variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars
            .iter()
            .find(|(var, _)| *var == name)
            .map(|(_, value)| value)
    }

    fn insert(&mut self, name: &'static str, value: Value) {
        match self.vars.iter_mut().find(|(var, _)| *var == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name, value)),
        }
    }

    /// Read a pattern variable that the pattern guarantees is bound.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a variable of the matched pattern; that
    /// is a programming error in the operator's handler, not an
    /// evaluation error.
    pub fn var(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("`{name}` is not a pattern variable"),
        }
    }

    /// The rest capture as a slice, when `name` captured a rest list.
    pub fn rest(&self, name: &str) -> &[Value] {
        self.var(name).as_list().unwrap_or(&[])
    }

    /// Iterate bound variables in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.vars.iter().map(|(name, value)| (*name, value))
    }
}

/// Match `form`'s subexpressions against `pattern`.
///
/// The form's head (the operator name) is checked, then required
/// positions fill in order, optional positions fill or default, and the
/// tail goes to the rest capture or keyword groups. A mismatch names
/// the operator and the schema position that failed.
pub fn destructure(pattern: &FormPattern, form: &Value) -> Result<Bindings> {
    let items = form
        .as_list()
        .ok_or_else(|| pattern.fail("operator form must be a list"))?;

    let head = items.first().and_then(|h| h.as_symbol());
    if head.map(|h| h.as_ref()) != Some(pattern.operator) {
        return Err(pattern.fail(format!("head symbol `{}`", pattern.operator)));
    }

    let mut bindings = Bindings::default();
    let mut args = items[1..].iter();

    for name in &pattern.required {
        let value = args
            .next()
            .ok_or_else(|| pattern.fail(format!("missing required `{}`", name)))?;
        bindings.insert(*name, value.clone());
    }

    for (name, default) in &pattern.optional {
        let value = args.next().cloned().unwrap_or_else(|| default.clone());
        bindings.insert(*name, value);
    }

    let tail: Vec<Value> = args.cloned().collect();

    if let Some(name) = pattern.rest {
        bindings.insert(name, Value::list(tail));
        return Ok(bindings);
    }

    if !pattern.keys.is_empty() {
        for (name, default) in &pattern.keys {
            bindings.insert(*name, default.clone());
        }
        let mut pairs = tail.iter();
        while let Some(marker) = pairs.next() {
            let Value::Keyword(key) = marker else {
                return Err(pattern.fail(format!("keyword marker, got `{:?}`", marker)));
            };
            let known = pattern.keys.iter().find(|(name, _)| *name == key.as_ref());
            let Some((name, _)) = known else {
                return Err(pattern.fail(format!("unknown keyword `:{}`", key)));
            };
            let value = pairs
                .next()
                .ok_or_else(|| pattern.fail(format!("value for keyword `:{}`", key)))?;
            bindings.insert(*name, value.clone());
        }
        return Ok(bindings);
    }

    if !tail.is_empty() {
        return Err(pattern.fail(format!("{} extra subexpressions", tail.len())));
    }

    Ok(bindings)
}
