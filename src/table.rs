//! SlotTable: open addressing over an unbounded slot space with
//! backward-shift deletion.
//!
//! Elements live in a sparse map from slot index to element. An element's
//! probe sequence starts at its canonical slot (`Contract::hash`) and walks
//! `h, h+1, h+2, ...`. Probe invariant: for every element `v` stored at slot
//! `s`, every slot from `hash(v)` up to `s` is occupied by an element not
//! equal to `v`. Lookups therefore stop at the first empty slot, and
//! deletion restores the invariant by sliding dependent elements back instead of
//! leaving tombstones.
//!
//! Slot arithmetic wraps at `u64::MAX`; the shift test compares modular
//! distances so a run crossing the wrap point is handled like any other.

use crate::cfg::trace;
use crate::contract::{Contract, StdContract};
use crate::error::TableError;
use crate::hooks::{Hooks, NoHooks};
use core::hash::Hash;
use hashbrown::HashMap;

/// Old-to-new slot moves performed by one deletion, in scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AffectedSlots {
    moves: Vec<(u64, u64)>,
}

impl AffectedSlots {
    #[inline]
    fn push(&mut self, old: u64, new: u64) {
        self.moves.push((old, new));
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// New slot of the element that was at `old`, if it moved.
    pub fn get(&self, old: u64) -> Option<u64> {
        self.moves
            .iter()
            .find_map(|&(from, to)| (from == old).then_some(to))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.moves.iter().copied()
    }

    pub fn as_slice(&self) -> &[(u64, u64)] {
        &self.moves
    }
}

impl<'a> IntoIterator for &'a AffectedSlots {
    type Item = (u64, u64);
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, (u64, u64)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter().copied()
    }
}

/// Outcome of [`SlotTable::delete`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deletion {
    slot: Option<u64>,
    shifts: AffectedSlots,
}

impl Deletion {
    /// Number of elements removed: 0 or 1.
    pub fn removed(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    /// Slot the removed element occupied.
    pub fn slot(&self) -> Option<u64> {
        self.slot
    }

    pub fn shifts(&self) -> &AffectedSlots {
        &self.shifts
    }

    pub fn into_shifts(self) -> AffectedSlots {
        self.shifts
    }
}

enum Probe {
    Found(u64),
    Vacant(u64),
}

pub struct SlotTable<T, C = StdContract, H = NoHooks> {
    contract: C,
    slots: HashMap<u64, T>,
    hooks: H,
}

impl<T> SlotTable<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_contract(StdContract::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_contract(capacity, StdContract::new())
    }
}

impl<T> Default for SlotTable<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> SlotTable<T, C>
where
    C: Contract<T>,
{
    pub fn with_contract(contract: C) -> Self {
        Self::with_hooks(contract, NoHooks)
    }

    pub fn with_capacity_and_contract(capacity: usize, contract: C) -> Self {
        Self {
            contract,
            slots: HashMap::with_capacity(capacity),
            hooks: NoHooks,
        }
    }
}

/// Immutable iterator over the elements of a `SlotTable`.
pub struct Iter<'a, T> {
    it: hashbrown::hash_map::Values<'a, u64, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Iterator over `(slot, element)` pairs of a `SlotTable`.
pub struct Slots<'a, T> {
    it: hashbrown::hash_map::Iter<'a, u64, T>,
}

impl<'a, T> Iterator for Slots<'a, T> {
    type Item = (u64, &'a T);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(&slot, v)| (slot, v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> ExactSizeIterator for Slots<'_, T> {}

impl<T, C, H> SlotTable<T, C, H>
where
    C: Contract<T>,
    H: Hooks,
{
    pub fn with_hooks(contract: C, hooks: H) -> Self {
        Self {
            contract,
            slots: HashMap::new(),
            hooks,
        }
    }

    /// Build a table pre-sized for `hint` elements. The hint only reserves
    /// storage; it is not a capacity limit.
    pub fn with_size_hint(hint: isize, contract: C, hooks: H) -> Result<Self, TableError> {
        let capacity = usize::try_from(hint).map_err(|_| TableError::InvalidSize(hint))?;
        Ok(Self {
            contract,
            slots: HashMap::with_capacity(capacity),
            hooks,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    /// Walk the probe sequence from `start` until `is_match` accepts an
    /// occupant or an empty slot ends the sequence.
    fn probe<F>(&self, start: u64, mut is_match: F) -> Probe
    where
        F: FnMut(&T) -> bool,
    {
        let mut slot = start;
        loop {
            match self.slots.get(&slot) {
                None => return Probe::Vacant(slot),
                Some(occupant) if is_match(occupant) => return Probe::Found(slot),
                Some(_) => slot = slot.wrapping_add(1),
            }
        }
    }

    /// Probe from `hash` with a caller-supplied equality. `hash` must be
    /// the canonical slot every element accepted by `is_match` would have.
    pub(crate) fn find_slot_by<F>(&self, hash: u64, is_match: F) -> Option<u64>
    where
        F: FnMut(&T) -> bool,
    {
        match self.probe(hash, is_match) {
            Probe::Found(slot) => Some(slot),
            Probe::Vacant(_) => None,
        }
    }

    pub(crate) fn get_slot_mut(&mut self, slot: u64) -> Option<&mut T> {
        self.slots.get_mut(&slot)
    }

    /// Slot currently holding the element equal to `value`.
    pub fn slot_of(&self, value: &T) -> Option<u64> {
        let hash = self.contract.hash(value);
        self.find_slot_by(hash, |occupant| self.contract.eq(value, occupant))
    }

    pub fn get_slot(&self, slot: u64) -> Option<&T> {
        self.slots.get(&slot)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.slot_of(value).is_some()
    }

    /// Return the stored element equal to `partial`.
    ///
    /// `partial` only needs to carry the fields the contract inspects; the
    /// stored element is returned whole.
    pub fn get_unique(&self, partial: &T) -> Result<&T, TableError> {
        self.slot_of(partial)
            .and_then(|slot| self.slots.get(&slot))
            .ok_or(TableError::NotFound)
    }

    /// Insert `value` unless an equal element is already stored.
    ///
    /// Returns `true` when the element is new. A duplicate leaves the
    /// table untouched, drops `value`, and does not call `on_add`.
    pub fn insert(&mut self, value: T) -> bool {
        self.insert_full(value).1
    }

    /// Like [`insert`](Self::insert), also returning the slot holding the
    /// element equal to `value` afterwards.
    pub fn insert_full(&mut self, value: T) -> (u64, bool) {
        let hash = self.contract.hash(&value);
        match self.probe(hash, |occupant| self.contract.eq(&value, occupant)) {
            Probe::Found(slot) => (slot, false),
            Probe::Vacant(slot) => {
                self.slots.insert(slot, value);
                trace!(hash, slot, "slot table insert");
                self.hooks.on_add(slot);
                (slot, true)
            }
        }
    }

    /// Remove the element equal to `value` and hand it back unchanged.
    pub fn take(&mut self, value: &T) -> Option<(T, Deletion)> {
        let slot = self.slot_of(value)?;
        self.take_slot(slot)
    }

    /// Remove whatever element occupies `slot`, then run the backward shift.
    pub(crate) fn take_slot(&mut self, slot: u64) -> Option<(T, Deletion)> {
        let removed = self.slots.remove(&slot)?;
        let shifts = self.backward_shift(slot);
        trace!(slot, moved = shifts.len(), "slot table delete");
        self.hooks.on_delete(slot, &shifts);
        Some((
            removed,
            Deletion {
                slot: Some(slot),
                shifts,
            },
        ))
    }

    /// Remove the element equal to `value`, reset it through the contract
    /// and drop it.
    ///
    /// Deleting an absent value is a no-op with `removed() == 0`.
    pub fn delete(&mut self, value: &T) -> Deletion {
        match self.take(value) {
            Some((mut removed, deletion)) => {
                self.contract.zero(&mut removed);
                deletion
            }
            None => Deletion::default(),
        }
    }

    /// Close the gap left at `gap` by sliding back every later element of
    /// the run whose probe sequence passes through the gap.
    fn backward_shift(&mut self, mut gap: u64) -> AffectedSlots {
        let mut shifts = AffectedSlots::default();
        let mut j = gap.wrapping_add(1);
        while let Some(occupant) = self.slots.get(&j) {
            let home = self.contract.hash(occupant);
            // The occupant stays put only when its home lies in (gap, j].
            if j.wrapping_sub(home) >= j.wrapping_sub(gap) {
                if let Some(moved) = self.slots.remove(&j) {
                    self.slots.insert(gap, moved);
                }
                shifts.push(j, gap);
                gap = j;
            }
            j = j.wrapping_add(1);
        }
        shifts
    }

    /// Reset every element through the contract, then discard them all.
    pub fn clear(&mut self) {
        for value in self.slots.values_mut() {
            self.contract.zero(value);
        }
        let dropped = core::mem::take(&mut self.slots);
        trace!(len = dropped.len(), "slot table clear");
        drop(dropped);
        self.hooks.on_clear();
    }

    /// Replace the contents with `values`: clear first, then insert each.
    pub(crate) fn assign<I>(&mut self, values: I, capacity: usize)
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.slots.reserve(capacity);
        for value in values {
            self.insert(value);
        }
        trace!(len = self.len(), "slot table assign");
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.slots.values(),
        }
    }

    pub fn slots(&self) -> Slots<'_, T> {
        Slots {
            it: self.slots.iter(),
        }
    }
}

impl<'a, T, C, H> IntoIterator for &'a SlotTable<T, C, H>
where
    C: Contract<T>,
    H: Hooks,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C, H> Extend<T> for SlotTable<T, C, H>
where
    C: Contract<T>,
    H: Hooks,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> FromIterator<T> for SlotTable<T>
where
    T: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<T, C, H> core::fmt::Debug for SlotTable<T, C, H>
where
    T: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.slots.iter()).finish()
    }
}
