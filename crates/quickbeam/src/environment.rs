//! Runtime environment: the immutable chain of binding frames

mod dynamic;
mod frame;
mod prelude;

pub use dynamic::{DynamicEnv, DynamicExtent};
pub use frame::{Frame, FrameBuilder};

use std::sync::Arc;

use crate::value::Value;

/// How a variable reference resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Resolved via static enclosing-frame position
    Lexical,

    /// Resolved via the current dynamic extent
    Dynamic,
}

/// A resolved variable reference: which frame (distance from the head of
/// the chain), which slot, and whether the slot is lexical storage or a
/// marker for a dynamically bound variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarRef {
    /// Resolution kind
    pub kind: VarKind,

    /// Frame distance from the innermost frame
    pub depth: usize,

    /// Slot index within that frame
    pub slot: usize,
}

/// The lexical environment: an immutable chain of frames.
///
/// Cloning an environment is cheap and shares the chain; a frame's
/// parent is shared across any number of child frames created from it.
/// A retained closure keeps its chain alive after the binding form that
/// created it has returned.
///
/// # Example
///
/// ```
/// use quickbeam::{Environment, Frame, Value, VarKind};
///
/// let outer = Environment::new();
/// let mut builder = Frame::builder(1, outer.head().cloned());
/// builder.push_lexical("x", Value::Int(1));
/// let env = outer.extend(builder.finish());
///
/// let var = env.lookup("x").unwrap();
/// assert_eq!(var.kind, VarKind::Lexical);
/// assert_eq!(env.lexical_value(&var), Some(Value::Int(1)));
/// assert!(outer.lookup("x").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Arc<Frame>>,
}

impl Environment {
    /// Create an empty environment (no frames).
    pub fn new() -> Self {
        Self::default()
    }

    /// The innermost frame, if any.
    #[inline]
    pub fn head(&self) -> Option<&Arc<Frame>> {
        self.head.as_ref()
    }

    /// Create a child environment whose innermost frame is `frame`.
    ///
    /// The receiver is unchanged; any number of children may share it.
    pub fn extend(&self, frame: Arc<Frame>) -> Environment {
        Environment { head: Some(frame) }
    }

    /// Resolve `name` against the frame chain.
    ///
    /// Returns the innermost matching slot. A `Dynamic` result means the
    /// variable is dynamically bound elsewhere; the frame holds no value
    /// for it.
    pub fn lookup(&self, name: &str) -> Option<VarRef> {
        let mut depth = 0;
        let mut current = self.head.as_ref();
        while let Some(frame) = current {
            if let Some((slot, kind)) = frame.resolve(name) {
                return Some(VarRef { kind, depth, slot });
            }
            depth += 1;
            current = frame.parent();
        }
        None
    }

    /// Read the lexical value a resolved reference points at.
    ///
    /// Returns `None` if the reference is dynamic or out of range.
    pub fn lexical_value(&self, var: &VarRef) -> Option<Value> {
        let mut current = self.head.as_ref();
        for _ in 0..var.depth {
            current = current?.parent();
        }
        current?.lexical_slot(var.slot)
    }
}
