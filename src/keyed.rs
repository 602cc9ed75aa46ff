//! KeyedTable: a map stored as key-value pairs in a `SlotTable` whose
//! contract only looks at the key.

use crate::contract::{Contract, StdContract};
use crate::error::TableError;
use crate::hooks::{Hooks, NoHooks};
use crate::table::{Deletion, SlotTable};
use core::hash::Hash;

/// One map entry as stored in the slot table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
}

/// Lifts a key contract to pairs: equality and hash see only the key,
/// `zero` resets both halves.
#[derive(Clone, Debug, Default)]
pub struct KeyContract<C> {
    keys: C,
}

impl<C> KeyContract<C> {
    pub fn new(keys: C) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &C {
        &self.keys
    }
}

impl<K, V, C> Contract<Pair<K, V>> for KeyContract<C>
where
    V: Default,
    C: Contract<K>,
{
    #[inline]
    fn eq(&self, a: &Pair<K, V>, b: &Pair<K, V>) -> bool {
        self.keys.eq(&a.key, &b.key)
    }

    #[inline]
    fn hash(&self, pair: &Pair<K, V>) -> u64 {
        self.keys.hash(&pair.key)
    }

    fn zero(&self, pair: &mut Pair<K, V>) {
        self.keys.zero(&mut pair.key);
        pair.value = V::default();
    }
}

pub struct KeyedTable<K, V, C = StdContract, H = NoHooks> {
    table: SlotTable<Pair<K, V>, KeyContract<C>, H>,
}

impl<K, V> KeyedTable<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    pub fn new() -> Self {
        Self::with_contract(StdContract::new())
    }
}

impl<K, V> Default for KeyedTable<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> KeyedTable<K, V, C>
where
    V: Default,
    C: Contract<K>,
{
    pub fn with_contract(keys: C) -> Self {
        Self {
            table: SlotTable::with_contract(KeyContract::new(keys)),
        }
    }
}

impl<K, V, C, H> KeyedTable<K, V, C, H>
where
    V: Default,
    C: Contract<K>,
    H: Hooks,
{
    pub fn with_hooks(keys: C, hooks: H) -> Self {
        Self {
            table: SlotTable::with_hooks(KeyContract::new(keys), hooks),
        }
    }

    pub fn with_size_hint(hint: isize, keys: C, hooks: H) -> Result<Self, TableError> {
        let table = SlotTable::with_size_hint(hint, KeyContract::new(keys), hooks)?;
        Ok(Self { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn hooks(&self) -> &H {
        self.table.hooks()
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        self.table.hooks_mut()
    }

    /// The underlying pair table, e.g. as an operand for set algebra over
    /// keys.
    pub fn as_table(&self) -> &SlotTable<Pair<K, V>, KeyContract<C>, H> {
        &self.table
    }

    fn key_slot(&self, key: &K) -> Option<u64> {
        let keys = self.table.contract().keys();
        self.table
            .find_slot_by(keys.hash(key), |pair| keys.eq(&pair.key, key))
    }

    pub fn slot_of(&self, key: &K) -> Option<u64> {
        self.key_slot(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.key_slot(key).is_some()
    }

    /// Insert unless `key` is already present; an existing value is kept.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.table.insert(Pair { key, value })
    }

    /// Insert or overwrite. An overwrite keeps the entry in its slot, fires
    /// no hook and returns the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self
            .key_slot(&key)
            .and_then(|slot| self.table.get_slot_mut(slot))
        {
            Some(pair) => Some(core::mem::replace(&mut pair.value, value)),
            None => {
                self.table.insert(Pair { key, value });
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Result<&V, TableError> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Result<(&K, &V), TableError> {
        self.key_slot(key)
            .and_then(|slot| self.table.get_slot(slot))
            .map(|pair| (&pair.key, &pair.value))
            .ok_or(TableError::NotFound)
    }

    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, TableError> {
        self.key_slot(key)
            .and_then(|slot| self.table.get_slot_mut(slot))
            .map(|pair| &mut pair.value)
            .ok_or(TableError::NotFound)
    }

    /// Remove the entry for `key` and return its value.
    pub fn remove(&mut self, key: &K) -> Result<V, TableError> {
        let slot = self.key_slot(key).ok_or(TableError::NotFound)?;
        let (pair, _) = self.table.take_slot(slot).ok_or(TableError::NotFound)?;
        Ok(pair.value)
    }

    /// Remove the entry for `key`, resetting it through the contract.
    pub fn delete(&mut self, key: &K) -> Deletion {
        let Some(slot) = self.key_slot(key) else {
            return Deletion::default();
        };
        match self.table.take_slot(slot) {
            Some((mut pair, deletion)) => {
                self.table.contract().zero(&mut pair);
                deletion
            }
            None => Deletion::default(),
        }
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.table.iter().map(|pair| (&pair.key, &pair.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|pair| &pair.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.table.iter().map(|pair| &pair.value)
    }
}

impl<K, V, C, H> Extend<(K, V)> for KeyedTable<K, V, C, H>
where
    V: Default,
    C: Contract<K>,
    H: Hooks,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for KeyedTable<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
