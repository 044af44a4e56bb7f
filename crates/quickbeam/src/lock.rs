//! Protected-identifier locks and the mutation bridge
//!
//! Identifiers can be locked against mutation. The low-level check
//! reports a [`LockViolation`]; [`with_mutation_guard`] is the single
//! entry through which evaluators attempt protected mutation, translating
//! violations into the interpreter's own error vocabulary. Immediate
//! evaluators and compiled artifacts both route through it, so the check
//! behaves identically on either code path.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::context::EvalContext;
use crate::error::{EvalError, Result};

/// Low-level rejection of a protected-identifier mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier `{name}` is locked")]
pub struct LockViolation {
    /// The locked identifier
    pub name: String,
}

/// The set of identifiers protected from mutation.
#[derive(Debug, Default)]
pub struct LockTable {
    protected: RefCell<FxHashSet<Arc<str>>>,
}

impl LockTable {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Protect `name` from mutation.
    pub fn protect(&self, name: impl Into<Arc<str>>) {
        self.protected.borrow_mut().insert(name.into());
    }

    /// Remove protection from `name`.
    pub fn unprotect(&self, name: &str) {
        self.protected.borrow_mut().remove(name);
    }

    /// Check whether `name` is protected.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.borrow().contains(name)
    }

    /// Reject the mutation of `name` if it is protected.
    pub fn check(&self, name: &str) -> std::result::Result<(), LockViolation> {
        if self.is_protected(name) {
            return Err(LockViolation {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Execute a mutation attempt against the context's lock table,
/// re-signaling any [`LockViolation`] as
/// [`EvalError::OperationForbidden`] with the violation as its cause.
///
/// The action receives the lock table and must run its own writes after
/// a successful `check`; it never sees interpreter-level errors.
pub fn with_mutation_guard<T, F>(ctx: &EvalContext, action: F) -> Result<T>
where
    F: FnOnce(&LockTable) -> std::result::Result<T, LockViolation>,
{
    action(&ctx.locks).map_err(|violation| EvalError::OperationForbidden {
        name: violation.name.clone(),
        cause: violation,
    })
}
