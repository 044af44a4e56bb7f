//! Evaluation context: dynamic cells, locks, and execution limits

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::environment::DynamicEnv;
use crate::error::{EvalError, Result};
use crate::lock::LockTable;

/// Configuration and mutable per-run state for evaluation.
///
/// This is passed through all evaluation calls. It owns everything that
/// is not part of the lexical frame chain: the dynamic-variable cells,
/// the protected-identifier lock table, the set of names proclaimed
/// special, and call-depth limiting.
#[derive(Debug)]
pub struct EvalContext {
    /// Dynamic-variable cells (doubles as the global table)
    pub dynamics: DynamicEnv,

    /// Identifiers protected from mutation
    pub locks: LockTable,

    /// Names proclaimed special (dynamically bound in every scope)
    specials: RefCell<FxHashSet<Arc<str>>>,

    /// Current call depth (for recursion limiting)
    depth: Cell<usize>,

    /// Maximum allowed call depth
    max_call_depth: usize,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            dynamics: DynamicEnv::new(),
            locks: LockTable::new(),
            specials: RefCell::new(FxHashSet::default()),
            depth: Cell::new(0),
            max_call_depth: 1000,
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Create a context with the standard prelude loaded into the
    /// global cells.
    pub fn with_prelude() -> Self {
        let ctx = Self::new();
        ctx.dynamics.load_prelude();
        ctx
    }

    // ═══════════════════════════════════════════════════════════════════
    // Special Proclamations
    // ═══════════════════════════════════════════════════════════════════

    /// Proclaim `name` special: every binding of it anywhere is dynamic.
    pub fn proclaim_special(&self, name: impl Into<Arc<str>>) {
        self.specials.borrow_mut().insert(name.into());
    }

    /// Whether `name` has been proclaimed special.
    pub fn is_special(&self, name: &str) -> bool {
        self.specials.borrow().contains(name)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call Depth Tracking (Stack Overflow Protection)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a function call. Returns error if max depth exceeded.
    pub fn enter_call(&self) -> Result<()> {
        let depth = self.depth.get();
        if depth >= self.max_call_depth {
            return Err(EvalError::StackOverflow {
                depth,
                max: self.max_call_depth,
            });
        }
        self.depth.set(depth + 1);
        Ok(())
    }

    /// Exit a function call.
    pub fn exit_call(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    /// Get current call depth.
    pub fn call_depth(&self) -> usize {
        self.depth.get()
    }
}
