//! slot-table: an open-addressing table with pluggable element identity,
//! backward-shift deletion and mutation hooks, plus the sets, maps and
//! locked variants built on it.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one probing engine that every other structure composes, so the
//!   collision and deletion logic exists exactly once.
//! - Layers:
//!   - Contract<T>: equality, hash and reset for one element type, bound
//!     at construction like a `BuildHasher`.
//!   - SlotTable<T, C, H>: linear probing over an unbounded slot space
//!     stored sparsely; backward-shift deletion that reports every moved
//!     slot; hooks `H` told about each add, delete and clear.
//!   - Set algebra: union, intersection, difference and subset tests over
//!     any `SetRead`, assigned into a `SlotTable` receiver.
//!   - SyncSlotTable<T, C, H>: the same table behind a `parking_lot`
//!     reader-writer lock.
//!   - KeyedTable<K, V, C, H>: a map storing `Pair<K, V>` under a contract
//!     that looks only at the key.
//!   - SlotTracker: a hooks implementation keeping generational handles
//!     pointed at the right slot across shifts.
//!
//! Constraints
//! - Contracts must be congruent (`eq(a, b)` implies `hash(a) == hash(b)`)
//!   and deterministic. Violations are not detected; lookups may miss and
//!   duplicates may be stored, but memory safety is unaffected.
//! - No tombstones: after any deletion every element is reachable by
//!   probing from its canonical slot without crossing an empty slot.
//! - Slot indices are only stable until the next deletion; dependent
//!   structures follow moves through `Hooks::on_delete`.
//!
//! Hooks and reentrancy
//! - A table owns its hooks and calls them after it is consistent again.
//!   Hooks get `&mut self` only, so they cannot reach the table they are
//!   attached to. Under `SyncSlotTable` they run inside the write lock.
//!
//! Logging
//! - With the `tracing` feature, mutations emit `trace`-level events.
//!
//! Non-goals
//! - No persistence, no load-factor driven resizing policy, no lock-free
//!   reads, no serialization format.

mod cfg;

pub mod algebra;
pub mod contract;
mod error;
pub mod hooks;
pub mod keyed;
pub mod sync;
pub mod table;
mod table_proptest;
pub mod tracker;

// Public surface
pub use algebra::{SetRead, SliceSet};
pub use contract::{Contract, FnContract, StdContract};
pub use error::TableError;
pub use hooks::{HookEvent, Hooks, NoHooks, Recorder};
pub use keyed::{KeyContract, KeyedTable, Pair};
pub use sync::SyncSlotTable;
pub use table::{AffectedSlots, Deletion, SlotTable};
pub use tracker::{Handle, SlotTracker};
