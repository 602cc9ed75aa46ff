//! SlotTracker: stable handles to table elements, kept in sync through hooks.
//!
//! Backward shifts move elements between slots, so a raw slot index is only
//! valid until the next deletion. The tracker owns one generational handle
//! per stored element and rewrites its slot from the affected-slot report
//! of every deletion, without rescanning the table.

use crate::contract::Contract;
use crate::hooks::Hooks;
use crate::table::{AffectedSlots, SlotTable};
use hashbrown::HashMap;
use slotmap::{DefaultKey, SlotMap};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    /// Current slot of the element, or `None` once it has been removed.
    pub fn slot(&self, tracker: &SlotTracker) -> Option<u64> {
        tracker.handles.get(self.0).copied()
    }

    pub fn get<'a, T, C>(&self, table: &'a SlotTable<T, C, SlotTracker>) -> Option<&'a T>
    where
        C: Contract<T>,
    {
        let slot = self.slot(table.hooks())?;
        table.get_slot(slot)
    }
}

#[derive(Debug, Default)]
pub struct SlotTracker {
    handles: SlotMap<DefaultKey, u64>,
    by_slot: HashMap<u64, DefaultKey>,
}

impl SlotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle_at(&self, slot: u64) -> Option<Handle> {
        self.by_slot.get(&slot).copied().map(Handle)
    }
}

impl Hooks for SlotTracker {
    fn on_add(&mut self, slot: u64) {
        let key = self.handles.insert(slot);
        self.by_slot.insert(slot, key);
    }

    fn on_delete(&mut self, slot: u64, shifts: &AffectedSlots) {
        if let Some(key) = self.by_slot.remove(&slot) {
            self.handles.remove(key);
        }
        // Moves come in scan order; each target was vacated just before.
        for (old, new) in shifts {
            if let Some(key) = self.by_slot.remove(&old) {
                if let Some(at) = self.handles.get_mut(key) {
                    *at = new;
                }
                self.by_slot.insert(new, key);
            }
        }
    }

    fn on_clear(&mut self) {
        self.handles.clear();
        self.by_slot.clear();
    }
}

impl<T, C> SlotTable<T, C, SlotTracker>
where
    C: Contract<T>,
{
    /// Insert `value` and return the handle of the element now stored for
    /// it, whether it was new or already present.
    ///
    /// Returns `None` only if the tracker has been driven out of step with
    /// the table through `hooks_mut`, leaving the slot without a handle.
    pub fn insert_tracked(&mut self, value: T) -> Option<Handle> {
        let (slot, _) = self.insert_full(value);
        self.hooks().handle_at(slot)
    }

    pub fn handle_of(&self, value: &T) -> Option<Handle> {
        let slot = self.slot_of(value)?;
        self.hooks().handle_at(slot)
    }

    /// Remove the element behind `handle`. Stale handles remove nothing.
    pub fn remove_tracked(&mut self, handle: Handle) -> Option<T> {
        let slot = handle.slot(self.hooks())?;
        self.take_slot(slot).map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Modulo(u64);

    impl Contract<u64> for Modulo {
        fn eq(&self, a: &u64, b: &u64) -> bool {
            a == b
        }
        fn hash(&self, v: &u64) -> u64 {
            v % self.0
        }
    }

    fn tracked(m: u64) -> SlotTable<u64, Modulo, SlotTracker> {
        SlotTable::with_hooks(Modulo(m), SlotTracker::new())
    }

    /// Invariant: handles keep resolving to their element after the element
    /// is moved by a backward shift.
    #[test]
    fn handles_follow_backward_shift() {
        let mut t = tracked(4);
        let handles: Vec<Handle> = (0..8).flat_map(|v| t.insert_tracked(v)).collect();
        assert_eq!(handles.len(), 8);
        assert_eq!(handles[4].slot(t.hooks()), Some(4));

        t.delete(&2);
        assert_eq!(handles[4].slot(t.hooks()), Some(2));
        assert_eq!(handles[7].slot(t.hooks()), Some(6));
        for (v, h) in handles.iter().enumerate() {
            let v = v as u64;
            if v == 2 {
                assert_eq!(h.get(&t), None);
            } else {
                assert_eq!(h.get(&t), Some(&v));
            }
        }
        assert_eq!(t.hooks().len(), 7);
    }

    /// Invariant: a duplicate insert returns the existing element's handle.
    #[test]
    fn duplicate_insert_returns_existing_handle() {
        let mut t = tracked(8);
        let h1 = t.insert_tracked(5).unwrap();
        let h2 = t.insert_tracked(5).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(t.handle_of(&5), Some(h1));
        assert_eq!(t.hooks().len(), 1);
    }

    /// Invariant: a removed element's handle never resolves again, even when
    /// a new element later occupies the same slot.
    #[test]
    fn stale_handle_does_not_alias_new_entry() {
        let mut t = tracked(8);
        let old = t.insert_tracked(3).unwrap();
        assert_eq!(t.remove_tracked(old), Some(3));
        assert_eq!(t.remove_tracked(old), None);

        let new = t.insert_tracked(11).unwrap(); // same canonical slot as 3
        assert_ne!(old, new);
        assert_eq!(old.get(&t), None);
        assert_eq!(new.get(&t), Some(&11));
    }

    /// Invariant: clearing the table invalidates every handle.
    #[test]
    fn clear_drops_all_handles() {
        let mut t = tracked(8);
        let hs: Vec<Handle> = (0..4).flat_map(|v| t.insert_tracked(v)).collect();
        assert_eq!(hs.len(), 4);
        t.clear();
        assert!(t.hooks().is_empty());
        assert!(hs.iter().all(|h| h.get(&t).is_none()));
    }

    /// Invariant: a tracker reset behind the table's back yields no handle
    /// for elements it no longer knows, instead of panicking.
    #[test]
    fn desynced_tracker_yields_no_handle() {
        let mut t = tracked(8);
        t.insert_tracked(5).unwrap();
        t.hooks_mut().on_clear();
        assert_eq!(t.insert_tracked(5), None);
        assert_eq!(t.handle_of(&5), None);
        assert!(t.insert_tracked(6).is_some());
    }
}
