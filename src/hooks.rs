//! Hooks: mutation callbacks for structures that index into a table by slot.
//!
//! A table owns its hooks value and calls it synchronously, once per
//! successful mutation and only after the table is consistent again.
//! Callbacks receive `&mut self` and nothing else, so they cannot reach the
//! table they are attached to.

use crate::table::AffectedSlots;

/// Callbacks invoked by a table after it mutates.
pub trait Hooks {
    /// A new element was stored at `slot`. Not called for duplicate inserts.
    #[inline]
    fn on_add(&mut self, slot: u64) {
        let _ = slot;
    }

    /// The element at `slot` was removed and the backward shift completed.
    ///
    /// Every `(old, new)` pair in `shifts` is an element that moved from
    /// `old` to `new`. Index entries for `slot` itself must be dropped
    /// before applying the moves, since a moved element may land on it.
    #[inline]
    fn on_delete(&mut self, slot: u64, shifts: &AffectedSlots) {
        let _ = (slot, shifts);
    }

    /// Every element was removed.
    #[inline]
    fn on_clear(&mut self) {}
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// A mutation observed by [`Recorder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookEvent {
    Add { slot: u64 },
    Delete { slot: u64, shifts: AffectedSlots },
    Clear,
}

/// Hooks that queue every event for the caller to drain after the
/// mutating call has returned.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    events: Vec<HookEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HookEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, HookEvent> {
        self.events.drain(..)
    }
}

impl Hooks for Recorder {
    fn on_add(&mut self, slot: u64) {
        self.events.push(HookEvent::Add { slot });
    }

    fn on_delete(&mut self, slot: u64, shifts: &AffectedSlots) {
        self.events.push(HookEvent::Delete {
            slot,
            shifts: shifts.clone(),
        });
    }

    fn on_clear(&mut self) {
        self.events.push(HookEvent::Clear);
    }
}
