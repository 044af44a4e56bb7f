//! Dynamic-variable cells and the scoped rebinding extent

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// The dynamic-variable cell store.
///
/// A cell's current value is whatever the innermost live
/// [`DynamicExtent`] installed, or the global value when no extent is
/// active; the same table therefore doubles as the global variable
/// table. The engine is single-threaded, so interior mutability is a
/// `RefCell`.
#[derive(Debug, Default)]
pub struct DynamicEnv {
    cells: RefCell<FxHashMap<Arc<str>, Value>>,
}

impl DynamicEnv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current value of `name`'s cell.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.cells.borrow().get(name).cloned()
    }

    /// Whether `name` currently has a cell.
    pub fn is_bound(&self, name: &str) -> bool {
        self.cells.borrow().contains_key(name)
    }

    /// Write `name`'s cell unconditionally, creating it if absent.
    pub fn define(&self, name: impl Into<Arc<str>>, value: Value) {
        self.cells.borrow_mut().insert(name.into(), value);
    }

    /// Install `value`, returning the prior cell state for later restore.
    fn install(&self, name: Arc<str>, value: Value) -> Option<Value> {
        self.cells.borrow_mut().insert(name, value)
    }

    /// Put a cell back to its pre-install state.
    fn restore(&self, name: &Arc<str>, prior: Option<Value>) {
        let mut cells = self.cells.borrow_mut();
        match prior {
            Some(value) => {
                cells.insert(name.clone(), value);
            }
            None => {
                cells.remove(name);
            }
        }
    }
}

/// A stack-disciplined dynamic rebinding: prior cell states are saved on
/// installation and restored exactly once when the extent is dropped, on
/// every exit path (normal return or error propagation).
///
/// This is the dynamic-variable analogue of an RAII scope guard: the
/// binding form's activation owns the extent, and no rebinding can leak
/// past it.
pub struct DynamicExtent<'a> {
    store: &'a DynamicEnv,
    saved: Vec<(Arc<str>, Option<Value>)>,
}

impl<'a> DynamicExtent<'a> {
    /// Install all `rebindings` together as a single dynamic-extent
    /// extension, saving each cell's prior state.
    pub fn install(store: &'a DynamicEnv, rebindings: Vec<(Arc<str>, Value)>) -> Self {
        let mut saved = Vec::with_capacity(rebindings.len());
        for (name, value) in rebindings {
            tracing::trace!(name = %name, "installing dynamic rebinding");
            let prior = store.install(name.clone(), value);
            saved.push((name, prior));
        }
        DynamicExtent { store, saved }
    }
}

impl Drop for DynamicExtent<'_> {
    fn drop(&mut self) {
        // Reverse order, so duplicate names within one extent unwind
        // to the outermost prior state.
        for (name, prior) in self.saved.drain(..).rev() {
            tracing::trace!(name = %name, "restoring dynamic cell");
            self.store.restore(&name, prior);
        }
    }
}
