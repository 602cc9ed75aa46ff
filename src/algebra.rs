//! Set algebra over anything that can answer membership and list its
//! elements.
//!
//! The free functions compute result elements from two readers; the
//! `SlotTable` methods then replace the receiver's contents with them
//! (clear first, then insert each). Operands need not share a
//! representation: a `SlotTable` can be combined with a [`SliceSet`].

use crate::contract::Contract;
use crate::hooks::Hooks;
use crate::table::{Iter, SlotTable};

/// Read access needed by the algebra: size, membership and iteration.
///
/// Implementations must hold distinct elements under their contract, or
/// the length short-circuits in [`is_subset`] give wrong answers.
pub trait SetRead<T> {
    type Elements<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, value: &T) -> bool;

    fn elements(&self) -> Self::Elements<'_>;
}

impl<T, C, H> SetRead<T> for SlotTable<T, C, H>
where
    C: Contract<T>,
    H: Hooks,
{
    type Elements<'a>
        = Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn len(&self) -> usize {
        SlotTable::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        SlotTable::contains(self, value)
    }

    fn elements(&self) -> Self::Elements<'_> {
        self.iter()
    }
}

/// A borrowed slice of distinct elements read as a set.
///
/// Membership is a linear scan under the given contract.
pub struct SliceSet<'s, T, C> {
    items: &'s [T],
    contract: C,
}

impl<'s, T, C> SliceSet<'s, T, C>
where
    C: Contract<T>,
{
    pub fn new(items: &'s [T], contract: C) -> Self {
        Self { items, contract }
    }
}

impl<'s, T, C> SetRead<T> for SliceSet<'s, T, C>
where
    C: Contract<T>,
{
    type Elements<'a>
        = core::slice::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn contains(&self, value: &T) -> bool {
        self.items.iter().any(|item| self.contract.eq(item, value))
    }

    fn elements(&self) -> Self::Elements<'_> {
        self.items.iter()
    }
}

/// Elements of `l`, then the elements of `r` that `l` lacks.
pub fn union<T, L, R>(l: &L, r: &R) -> Vec<T>
where
    T: Clone,
    L: SetRead<T> + ?Sized,
    R: SetRead<T> + ?Sized,
{
    // Unions land closer to the larger input than to the sum.
    let hint = (l.len().max(r.len()) + l.len() + r.len()) / 2;
    let mut out = Vec::with_capacity(hint);
    out.extend(l.elements().cloned());
    out.extend(r.elements().filter(|v| !l.contains(v)).cloned());
    out
}

/// Elements present in both `l` and `r`, iterating the smaller side.
pub fn intersection<T, L, R>(l: &L, r: &R) -> Vec<T>
where
    T: Clone,
    L: SetRead<T> + ?Sized,
    R: SetRead<T> + ?Sized,
{
    let mut out = Vec::with_capacity((l.len() + r.len()) / 2);
    if l.len() <= r.len() {
        out.extend(l.elements().filter(|v| r.contains(v)).cloned());
    } else {
        out.extend(r.elements().filter(|v| l.contains(v)).cloned());
    }
    out
}

/// Elements of `l` absent from `r`.
pub fn difference<T, L, R>(l: &L, r: &R) -> Vec<T>
where
    T: Clone,
    L: SetRead<T> + ?Sized,
    R: SetRead<T> + ?Sized,
{
    let mut out = Vec::with_capacity(l.len());
    out.extend(l.elements().filter(|v| !r.contains(v)).cloned());
    out
}

/// Whether every element of `l` is in `r`.
pub fn is_subset<T, L, R>(l: &L, r: &R) -> bool
where
    L: SetRead<T> + ?Sized,
    R: SetRead<T> + ?Sized,
{
    if l.len() > r.len() {
        return false;
    }
    l.elements().all(|v| r.contains(v))
}

/// Whether every element of `r` is in `l`.
pub fn is_superset<T, L, R>(l: &L, r: &R) -> bool
where
    L: SetRead<T> + ?Sized,
    R: SetRead<T> + ?Sized,
{
    is_subset(r, l)
}

impl<T, C, H> SlotTable<T, C, H>
where
    T: Clone,
    C: Contract<T>,
    H: Hooks,
{
    /// Replace the contents with `l ∪ r`.
    pub fn union<L, R>(&mut self, l: &L, r: &R)
    where
        L: SetRead<T> + ?Sized,
        R: SetRead<T> + ?Sized,
    {
        let values = union(l, r);
        let len = values.len();
        self.assign(values, len);
    }

    /// Replace the contents with `l ∩ r`.
    pub fn intersection<L, R>(&mut self, l: &L, r: &R)
    where
        L: SetRead<T> + ?Sized,
        R: SetRead<T> + ?Sized,
    {
        let values = intersection(l, r);
        let len = values.len();
        self.assign(values, len);
    }

    /// Replace the contents with `l \ r`.
    pub fn difference<L, R>(&mut self, l: &L, r: &R)
    where
        L: SetRead<T> + ?Sized,
        R: SetRead<T> + ?Sized,
    {
        let values = difference(l, r);
        let len = values.len();
        self.assign(values, len);
    }
}

impl<T, C, H> SlotTable<T, C, H>
where
    C: Contract<T>,
    H: Hooks,
{
    pub fn is_subset<O>(&self, other: &O) -> bool
    where
        O: SetRead<T> + ?Sized,
    {
        is_subset(self, other)
    }

    pub fn is_superset<O>(&self, other: &O) -> bool
    where
        O: SetRead<T> + ?Sized,
    {
        is_superset(self, other)
    }
}
