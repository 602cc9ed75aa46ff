use slot_table::{SlotTracker, StdContract, SyncSlotTable};
use std::collections::BTreeSet;
use std::sync::{mpsc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 4;
const PER_THREAD: u64 = 500;

#[test]
fn concurrent_inserts_are_all_kept() {
    let t: SyncSlotTable<u64> = SyncSlotTable::new();
    let barrier = Barrier::new(THREADS);
    thread::scope(|s| {
        for i in 0..THREADS as u64 {
            let (t, barrier) = (&t, &barrier);
            s.spawn(move || {
                barrier.wait();
                for v in 0..PER_THREAD {
                    t.insert(i * PER_THREAD + v);
                    // Every thread also races on a shared value.
                    t.insert(u64::MAX - v);
                }
            });
        }
    });
    assert_eq!(t.len(), THREADS * PER_THREAD as usize + PER_THREAD as usize);
    for v in 0..THREADS as u64 * PER_THREAD {
        assert!(t.contains(&v));
    }
}

#[test]
fn readers_see_whole_mutations() {
    // Writers move values between "present" and "absent" in pairs inside a
    // single write section; readers must never observe half a move.
    let t: SyncSlotTable<u64> = SyncSlotTable::new();
    for v in 0..64 {
        t.insert(v * 2);
    }
    thread::scope(|s| {
        s.spawn(|| {
            for round in 0..200u64 {
                let v = (round % 64) * 2;
                let mut w = t.write();
                w.delete(&v);
                w.insert(v + 1);
                drop(w);
                let mut w = t.write();
                w.delete(&(v + 1));
                w.insert(v);
            }
        });
        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..200 {
                    let r = t.read();
                    assert_eq!(r.len(), 64);
                    let count = r.iter().count();
                    assert_eq!(count, 64);
                }
            });
        }
    });
    let values: BTreeSet<u64> = t.to_vec().into_iter().collect();
    assert_eq!(values, (0..64).map(|v| v * 2).collect());
}

#[test]
fn concurrent_algebra_on_shared_operands() {
    let a: SyncSlotTable<u32> = SyncSlotTable::new();
    let b: SyncSlotTable<u32> = SyncSlotTable::new();
    for v in 0..100 {
        a.insert(v);
    }
    for v in 50..150 {
        b.insert(v);
    }
    let outs: Vec<SyncSlotTable<u32>> = (0..THREADS).map(|_| SyncSlotTable::new()).collect();

    thread::scope(|s| {
        for (i, out) in outs.iter().enumerate() {
            let (a, b) = (&a, &b);
            s.spawn(move || {
                for _ in 0..20 {
                    match i % 3 {
                        0 => out.union(a, b),
                        1 => out.intersection(a, b),
                        _ => out.difference(a, b),
                    }
                }
            });
        }
    });

    for (i, out) in outs.iter().enumerate() {
        let expected = match i % 3 {
            0 => 150,
            1 => 50,
            _ => 50,
        };
        assert_eq!(out.len(), expected);
    }
    assert!(outs[1].is_subset(&a) && outs[1].is_subset(&b));
    assert!(a.is_superset(&outs[2]));
}

/// Runs `f` on its own thread and fails if it has not finished in time, so a
/// lock cycle shows up as a failure rather than a hung test run.
fn within_deadline<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    let (done, wait) = mpsc::channel();
    let worker = thread::spawn(move || {
        f();
        let _ = done.send(());
    });
    match wait.recv_timeout(Duration::from_secs(60)) {
        Ok(()) => worker.join().unwrap(),
        // A panic drops the sender; surface the worker's panic instead.
        Err(mpsc::RecvTimeoutError::Disconnected) => worker.join().unwrap(),
        Err(mpsc::RecvTimeoutError::Timeout) => panic!("algebra calls deadlocked"),
    }
}

fn set_of(t: &SyncSlotTable<u32>) -> BTreeSet<u32> {
    t.to_vec().into_iter().collect()
}

#[test]
fn receivers_aliasing_opposite_operands_make_progress() {
    within_deadline(|| {
        let a: SyncSlotTable<u32> = SyncSlotTable::from_table((0..2000).collect());
        let b: SyncSlotTable<u32> = SyncSlotTable::from_table((1000..3000).collect());
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            s.spawn(|| {
                barrier.wait();
                for _ in 0..200 {
                    a.union(&a, &b);
                }
            });
            s.spawn(|| {
                barrier.wait();
                for _ in 0..200 {
                    b.union(&a, &b);
                }
            });
        });
        let expected: BTreeSet<u32> = (0..3000).collect();
        assert_eq!(set_of(&a), expected);
        assert_eq!(set_of(&b), expected);
    });
}

#[test]
fn aliased_difference_and_intersection_make_progress() {
    within_deadline(|| {
        let a: SyncSlotTable<u32> = SyncSlotTable::from_table((0..100).collect());
        let b: SyncSlotTable<u32> = SyncSlotTable::from_table((50..150).collect());
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            s.spawn(|| {
                barrier.wait();
                for _ in 0..200 {
                    a.difference(&a, &b);
                }
            });
            s.spawn(|| {
                barrier.wait();
                for _ in 0..200 {
                    b.intersection(&a, &b);
                }
            });
        });
        // Either order of the first two calls ends with `a` = 0..50; `b` is
        // what was left of 50..100 and never overlaps `a`.
        let (a, b) = (set_of(&a), set_of(&b));
        assert_eq!(a, (0..50).collect());
        assert!(b.is_subset(&(50..100).collect()));
        assert!(a.is_disjoint(&b));
    });
}

#[test]
fn tracked_handles_behind_lock() {
    let t: SyncSlotTable<String, _, _> =
        SyncSlotTable::with_hooks(StdContract::new(), SlotTracker::new());
    let h = t.write().insert_tracked("root".to_string()).unwrap();
    t.insert("leaf".to_string());
    {
        let r = t.read();
        assert_eq!(h.get(&*r), Some(&"root".to_string()));
    }
    t.delete(&"root".to_string());
    assert_eq!(h.get(&*t.read()), None);
    assert_eq!(t.read().hooks().len(), 1);
}
