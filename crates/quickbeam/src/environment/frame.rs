//! Binding frames: fixed-size ordered slot blocks

use std::sync::Arc;

use super::VarKind;
use crate::value::Value;

/// One variable slot in a frame.
#[derive(Debug, Clone)]
struct Slot {
    name: Arc<str>,
    cell: SlotCell,
}

/// Slot storage: a lexical value, or a marker for a variable bound in
/// the dynamic environment (no local storage).
#[derive(Debug, Clone)]
enum SlotCell {
    Lexical(Value),
    Dynamic,
}

/// A fixed-size ordered variable-slot block, created per binding-form
/// activation.
///
/// The slot count is fixed at creation (the arity of the binding form)
/// and each slot is written exactly once, through [`FrameBuilder`].
/// Frames are immutable once built and shared via `Arc`.
#[derive(Debug)]
pub struct Frame {
    slots: Vec<Slot>,
    parent: Option<Arc<Frame>>,
}

impl Frame {
    /// Start building a frame of exactly `arity` slots on top of `parent`.
    pub fn builder(arity: usize, parent: Option<Arc<Frame>>) -> FrameBuilder {
        FrameBuilder {
            arity,
            slots: Vec::with_capacity(arity),
            parent,
        }
    }

    /// The parent frame, shared with any sibling frames.
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Frame>> {
        self.parent.as_ref()
    }

    /// Number of slots (fixed at creation).
    #[inline]
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// Find `name` in this frame's slots.
    ///
    /// Later slots shadow earlier ones of the same name.
    pub(crate) fn resolve(&self, name: &str) -> Option<(usize, VarKind)> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.name.as_ref() == name)
            .map(|(i, s)| {
                let kind = match s.cell {
                    SlotCell::Lexical(_) => VarKind::Lexical,
                    SlotCell::Dynamic => VarKind::Dynamic,
                };
                (i, kind)
            })
    }

    /// Read slot `index` if it holds lexical storage.
    pub(crate) fn lexical_slot(&self, index: usize) -> Option<Value> {
        match self.slots.get(index)?.cell {
            SlotCell::Lexical(ref value) => Some(value.clone()),
            SlotCell::Dynamic => None,
        }
    }
}

/// Write-once construction of a [`Frame`].
///
/// Exactly `arity` slots must be pushed before `finish`.
#[derive(Debug)]
pub struct FrameBuilder {
    arity: usize,
    slots: Vec<Slot>,
    parent: Option<Arc<Frame>>,
}

impl FrameBuilder {
    /// Store a lexical value into the next slot.
    pub fn push_lexical(&mut self, name: impl Into<Arc<str>>, value: Value) {
        self.slots.push(Slot {
            name: name.into(),
            cell: SlotCell::Lexical(value),
        });
    }

    /// Mark the next slot as dynamically bound elsewhere.
    pub fn push_dynamic(&mut self, name: impl Into<Arc<str>>) {
        self.slots.push(Slot {
            name: name.into(),
            cell: SlotCell::Dynamic,
        });
    }

    /// Seal the frame.
    pub fn finish(self) -> Arc<Frame> {
        debug_assert_eq!(
            self.slots.len(),
            self.arity,
            "frame slot count must equal the binding form's arity"
        );
        Arc::new(Frame {
            slots: self.slots,
            parent: self.parent,
        })
    }
}
