//! Element contract: the pluggable identity of stored values.

use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;

/// Equality, hash and reset behaviour for elements of type `T`.
///
/// A contract is bound to a table when it is built and is consulted for
/// every probe. Implementations must be congruent: whenever `eq(a, b)`
/// holds, `hash(a) == hash(b)`. The table does not check this; a
/// non-congruent or non-deterministic contract can make lookups miss stored
/// elements or let equal elements be stored twice.
///
/// The value returned by `hash` is the canonical slot of the element, i.e.
/// the first slot of its probe sequence.
pub trait Contract<T> {
    fn eq(&self, a: &T, b: &T) -> bool;

    fn hash(&self, value: &T) -> u64;

    /// Reset `value` before the table discards it.
    ///
    /// Owned resources are released by `Drop` anyway, so the default does
    /// nothing. Override it when an element holds something that must be
    /// released explicitly.
    #[inline]
    fn zero(&self, value: &mut T) {
        let _ = value;
    }
}

/// Contract for `Eq + Hash` types, hashing through a `BuildHasher`.
pub struct StdContract<S = RandomState> {
    hasher: S,
}

impl StdContract {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl Default for StdContract {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StdContract<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<S: Clone> Clone for StdContract<S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
        }
    }
}

impl<S> core::fmt::Debug for StdContract<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StdContract").finish_non_exhaustive()
    }
}

impl<T, S> Contract<T> for StdContract<S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn eq(&self, a: &T, b: &T) -> bool {
        a == b
    }

    #[inline]
    fn hash(&self, value: &T) -> u64 {
        self.hasher.hash_one(value)
    }
}

/// Contract assembled from two closures; `zero` stays a no-op.
///
/// Handy for tables over types that do not implement `Eq`/`Hash`, or whose
/// identity is a projection of their fields.
pub struct FnContract<T, E, H> {
    eq: E,
    hash: H,
    _pd: PhantomData<fn(&T)>,
}

impl<T, E, H> FnContract<T, E, H>
where
    E: Fn(&T, &T) -> bool,
    H: Fn(&T) -> u64,
{
    pub fn new(eq: E, hash: H) -> Self {
        Self {
            eq,
            hash,
            _pd: PhantomData,
        }
    }
}

impl<T, E, H> Contract<T> for FnContract<T, E, H>
where
    E: Fn(&T, &T) -> bool,
    H: Fn(&T) -> u64,
{
    #[inline]
    fn eq(&self, a: &T, b: &T) -> bool {
        (self.eq)(a, b)
    }

    #[inline]
    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }
}
