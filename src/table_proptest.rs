#![cfg(test)]

// Property tests for SlotTable kept inside the crate so the probe
// invariant can be checked slot by slot.

use crate::contract::Contract;
use crate::hooks::{HookEvent, Hooks, Recorder};
use crate::table::SlotTable;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Canonical slot is `v % m`; small moduli force long runs.
struct Modulo(u64);

impl Contract<u16> for Modulo {
    fn eq(&self, a: &u16, b: &u16) -> bool {
        a == b
    }
    fn hash(&self, v: &u16) -> u64 {
        u64::from(*v) % self.0
    }
}

/// Every element starts probing just below the wrap point.
struct NearMax;

impl Contract<u16> for NearMax {
    fn eq(&self, a: &u16, b: &u16) -> bool {
        a == b
    }
    fn hash(&self, v: &u16) -> u64 {
        u64::MAX - u64::from(*v % 4)
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16),
    Delete(u16),
    Contains(u16),
    Clear,
    Iterate,
}

prop_compose! {
    fn arb_ops()(ops in proptest::collection::vec(
        prop_oneof![
            6 => (0u16..48).prop_map(Op::Insert),
            4 => (0u16..48).prop_map(Op::Delete),
            3 => (0u16..48).prop_map(Op::Contains),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ], 1..120)) -> Vec<Op> { ops }
}

/// Probe invariant: walking from an element's canonical slot reaches its slot over
/// occupied, non-equal slots only.
fn check_probe_invariant<T, C, H>(t: &SlotTable<T, C, H>) -> Result<(), TestCaseError>
where
    C: Contract<T>,
    H: Hooks,
{
    for (slot, v) in t.slots() {
        let mut s = t.contract().hash(v);
        while s != slot {
            let other = t.get_slot(s);
            prop_assert!(other.is_some(), "gap at {} before slot {}", s, slot);
            if let Some(other) = other {
                prop_assert!(!t.contract().eq(other, v), "duplicate at {}", s);
            }
            s = s.wrapping_add(1);
        }
    }
    Ok(())
}

/// Replays recorded hook events onto a slot -> value mirror and checks it
/// matches the table's real layout.
fn run_state_machine<C>(contract: C, ops: Vec<Op>) -> Result<(), TestCaseError>
where
    C: Contract<u16>,
{
    let mut sut = SlotTable::with_hooks(contract, Recorder::new());
    let mut model: HashSet<u16> = HashSet::new();
    let mut mirror: HashMap<u64, u16> = HashMap::new();

    for op in ops {
        let mut inserted = None;
        match op {
            Op::Insert(v) => {
                let fresh = sut.insert(v);
                prop_assert_eq!(fresh, model.insert(v));
                inserted = Some(v);
            }
            Op::Delete(v) => {
                let d = sut.delete(&v);
                prop_assert_eq!(d.removed() == 1, model.remove(&v));
            }
            Op::Contains(v) => {
                prop_assert_eq!(sut.contains(&v), model.contains(&v));
                prop_assert_eq!(sut.get_unique(&v).is_ok(), model.contains(&v));
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Iterate => {
                let seen: BTreeSet<u16> = sut.iter().copied().collect();
                let expected: BTreeSet<u16> = model.iter().copied().collect();
                prop_assert_eq!(seen, expected);
            }
        }

        let events: Vec<HookEvent> = sut.hooks_mut().drain().collect();
        prop_assert!(events.len() <= 1, "one hook call per mutation");
        for event in events {
            match event {
                HookEvent::Add { slot } => {
                    let v = inserted.expect("add hook only fires on insert");
                    prop_assert!(mirror.insert(slot, v).is_none());
                }
                HookEvent::Delete { slot, shifts } => {
                    prop_assert!(mirror.remove(&slot).is_some());
                    for (old, new) in &shifts {
                        let v = mirror.remove(&old);
                        prop_assert!(v.is_some(), "moved from empty slot {}", old);
                        prop_assert!(mirror.insert(new, v.unwrap()).is_none());
                    }
                }
                HookEvent::Clear => mirror.clear(),
            }
        }

        let actual: HashMap<u64, u16> = sut.slots().map(|(s, v)| (s, *v)).collect();
        prop_assert_eq!(&actual, &mirror);
        prop_assert_eq!(sut.len(), model.len());
        check_probe_invariant(&sut)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_state_machine_spread(ops in arb_ops()) {
        run_state_machine(Modulo(1 << 20), ops)?;
    }

    #[test]
    fn prop_state_machine_with_collisions(m in 1u64..6, ops in arb_ops()) {
        run_state_machine(Modulo(m), ops)?;
    }

    #[test]
    fn prop_state_machine_across_wrap(ops in arb_ops()) {
        run_state_machine(NearMax, ops)?;
    }
}

/// Hook fidelity on a fixed layout: 16 elements homed on 0..7 twice over,
/// then one deletion from the first half.
#[test]
fn delete_hook_matches_returned_shifts() {
    let mut t = SlotTable::with_hooks(Modulo(8), Recorder::new());
    for v in 0..16u16 {
        t.insert(v);
    }
    t.hooks_mut().drain().for_each(drop);

    let d = t.delete(&4);
    let expected = [
        (8, 4),
        (9, 8),
        (10, 9),
        (11, 10),
        (12, 11),
        (13, 12),
        (14, 13),
        (15, 14),
    ];
    assert_eq!(d.shifts().as_slice(), &expected);
    assert_eq!(
        t.hooks().events(),
        &[HookEvent::Delete {
            slot: 4,
            shifts: d.shifts().clone(),
        }]
    );
}
