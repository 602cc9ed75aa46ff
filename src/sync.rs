//! SyncSlotTable: a `SlotTable` behind a reader-writer lock.
//!
//! Every operation delegates to the wrapped table while holding the lock:
//! lookups and iteration take it shared, mutations take it exclusive.
//! Nothing is reimplemented here, and the unlocked `SlotTable` carries no
//! locking surface at all.
//!
//! Lock order for binary algebra is left operand, right operand, receiver.
//! Each distinct table is locked once. A receiver that is also an operand
//! is taken as an upgradable read in that operand's position and upgraded
//! to exclusive only after the result has been computed and the other
//! operand has been released. Callers running
//! algebra concurrently over overlapping tables are responsible for
//! ordering their calls so that this rule cannot form a cycle.
//!
//! The `*_with` variants take any [`SetRead`] operands, which this type does
//! not lock; only the receiver is locked, exclusively, for the assignment.
//!
//! Hooks run on the calling thread inside the exclusive section. A hook
//! that blocks on this table deadlocks.

use crate::algebra::{self, SetRead};
use crate::contract::{Contract, StdContract};
use crate::error::TableError;
use crate::hooks::{Hooks, NoHooks};
use crate::table::{Deletion, SlotTable};
use core::hash::Hash;
use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard, RwLockWriteGuard};

pub struct SyncSlotTable<T, C = StdContract, H = NoHooks> {
    inner: RwLock<SlotTable<T, C, H>>,
}

impl<T> SyncSlotTable<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::from_table(SlotTable::new())
    }
}

impl<T> Default for SyncSlotTable<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, H> From<SlotTable<T, C, H>> for SyncSlotTable<T, C, H> {
    fn from(table: SlotTable<T, C, H>) -> Self {
        Self::from_table(table)
    }
}

impl<T, C, H> SyncSlotTable<T, C, H> {
    pub fn from_table(table: SlotTable<T, C, H>) -> Self {
        Self {
            inner: RwLock::new(table),
        }
    }

    pub fn into_inner(self) -> SlotTable<T, C, H> {
        self.inner.into_inner()
    }

    /// Shared access for as long as the guard lives.
    ///
    /// Iterating through the guard keeps the read lock held until the
    /// guard is dropped, however slowly the iterator is consumed.
    pub fn read(&self) -> RwLockReadGuard<'_, SlotTable<T, C, H>> {
        self.inner.read()
    }

    /// Exclusive access for a batch of mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, SlotTable<T, C, H>> {
        self.inner.write()
    }
}

impl<T, C, H> SyncSlotTable<T, C, H>
where
    C: Contract<T>,
    H: Hooks,
{
    pub fn with_hooks(contract: C, hooks: H) -> Self {
        Self::from_table(SlotTable::with_hooks(contract, hooks))
    }

    pub fn with_size_hint(hint: isize, contract: C, hooks: H) -> Result<Self, TableError> {
        SlotTable::with_size_hint(hint, contract, hooks).map(Self::from_table)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.inner.read().contains(value)
    }

    pub fn slot_of(&self, value: &T) -> Option<u64> {
        self.inner.read().slot_of(value)
    }

    /// Copy of the stored element equal to `partial`.
    pub fn get_unique(&self, partial: &T) -> Result<T, TableError>
    where
        T: Clone,
    {
        self.inner.read().get_unique(partial).cloned()
    }

    pub fn insert(&self, value: T) -> bool {
        self.inner.write().insert(value)
    }

    pub fn insert_full(&self, value: T) -> (u64, bool) {
        self.inner.write().insert_full(value)
    }

    pub fn delete(&self, value: &T) -> Deletion {
        self.inner.write().delete(value)
    }

    pub fn take(&self, value: &T) -> Option<(T, Deletion)> {
        self.inner.write().take(value)
    }

    pub fn clear(&self) {
        self.inner.write().clear()
    }

    /// Visit every element under one read lock.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let table = self.inner.read();
        for value in table.iter() {
            f(value);
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.read().iter().cloned().collect()
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        let own = self.inner.read();
        let theirs = other.inner.read();
        own.is_subset(&*theirs)
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        let own = self.inner.read();
        let theirs = other.inner.read();
        own.is_superset(&*theirs)
    }

    /// Subset test against an operand this type does not lock.
    pub fn is_subset_of<O>(&self, other: &O) -> bool
    where
        O: SetRead<T> + ?Sized,
    {
        self.inner.read().is_subset(other)
    }

    pub fn is_superset_of<O>(&self, other: &O) -> bool
    where
        O: SetRead<T> + ?Sized,
    {
        self.inner.read().is_superset(other)
    }
}

impl<T, C, H> SyncSlotTable<T, C, H>
where
    T: Clone,
    C: Contract<T>,
    H: Hooks,
{
    /// Replace the contents with `l ∪ r`.
    pub fn union(&self, l: &Self, r: &Self) {
        self.rebuild(l, r, |l, r| algebra::union(l, r))
    }

    /// Replace the contents with `l ∩ r`.
    pub fn intersection(&self, l: &Self, r: &Self) {
        self.rebuild(l, r, |l, r| algebra::intersection(l, r))
    }

    /// Replace the contents with `l \ r`.
    pub fn difference(&self, l: &Self, r: &Self) {
        self.rebuild(l, r, |l, r| algebra::difference(l, r))
    }

    /// Replace the contents with `l ∪ r` for operands of any representation.
    ///
    /// The operands are read without locking `self`; passing a guard of
    /// this table as an operand deadlocks.
    pub fn union_with<L, R>(&self, l: &L, r: &R)
    where
        L: SetRead<T> + ?Sized,
        R: SetRead<T> + ?Sized,
    {
        self.assign(algebra::union(l, r))
    }

    pub fn intersection_with<L, R>(&self, l: &L, r: &R)
    where
        L: SetRead<T> + ?Sized,
        R: SetRead<T> + ?Sized,
    {
        self.assign(algebra::intersection(l, r))
    }

    pub fn difference_with<L, R>(&self, l: &L, r: &R)
    where
        L: SetRead<T> + ?Sized,
        R: SetRead<T> + ?Sized,
    {
        self.assign(algebra::difference(l, r))
    }

    fn assign(&self, values: Vec<T>) {
        let len = values.len();
        self.inner.write().assign(values, len);
    }

    fn rebuild<F>(&self, l: &Self, r: &Self, op: F)
    where
        F: FnOnce(&SlotTable<T, C, H>, &SlotTable<T, C, H>) -> Vec<T>,
    {
        let is_l = core::ptr::eq(self, l);
        let is_r = core::ptr::eq(self, r);
        let same_operands = core::ptr::eq(l, r);

        // The other operand is released before upgrading: a concurrent call
        // with the roles swapped may hold it upgradable while reading ours.
        if is_l {
            let own = self.inner.upgradable_read();
            let right = (!same_operands).then(|| r.inner.read());
            let values = op(&*own, right.as_deref().unwrap_or(&*own));
            drop(right);
            let mut own = RwLockUpgradableReadGuard::upgrade(own);
            let len = values.len();
            own.assign(values, len);
        } else if is_r {
            let left = l.inner.read();
            let own = self.inner.upgradable_read();
            let values = op(&*left, &*own);
            drop(left);
            let mut own = RwLockUpgradableReadGuard::upgrade(own);
            let len = values.len();
            own.assign(values, len);
        } else {
            let left = l.inner.read();
            let right = (!same_operands).then(|| r.inner.read());
            let mut own = self.inner.write();
            let values = op(&*left, right.as_deref().unwrap_or(&*left));
            let len = values.len();
            own.assign(values, len);
        }
    }
}
