use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use slot_table::{Contract, SlotTable, SlotTracker, SyncSlotTable};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

/// Folds keys into a narrow slot range so runs get long.
struct Clustered;

impl Contract<u64> for Clustered {
    fn eq(&self, a: &u64, b: &u64) -> bool {
        a == b
    }
    fn hash(&self, v: &u64) -> u64 {
        v % 4096
    }
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("slot_table_insert_10k", |b| {
        b.iter_batched(
            || SlotTable::<u64>::with_capacity(10_000),
            |mut t| {
                for x in lcg(1).take(10_000) {
                    t.insert(x);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_contains_hit(c: &mut Criterion) {
    c.bench_function("slot_table_contains_hit", |b| {
        let keys: Vec<u64> = lcg(7).take(20_000).collect();
        let t: SlotTable<u64> = keys.iter().copied().collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.contains(k));
        })
    });
}

fn bench_contains_miss(c: &mut Criterion) {
    c.bench_function("slot_table_contains_miss", |b| {
        let t: SlotTable<u64> = lcg(11).take(10_000).collect();
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = miss.next().unwrap();
            black_box(t.contains(&k));
        })
    });
}

fn bench_delete_clustered(c: &mut Criterion) {
    c.bench_function("slot_table_delete_clustered_8k", |b| {
        let keys: Vec<u64> = lcg(3).take(8_192).collect();
        b.iter_batched(
            || {
                let mut t = SlotTable::with_contract(Clustered);
                t.extend(keys.iter().copied());
                t
            },
            |mut t| {
                for k in &keys {
                    black_box(t.delete(k));
                }
                t
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_tracked_delete(c: &mut Criterion) {
    c.bench_function("slot_table_tracked_delete_8k", |b| {
        let keys: Vec<u64> = lcg(5).take(8_192).collect();
        b.iter_batched(
            || {
                let mut t = SlotTable::with_hooks(Clustered, SlotTracker::new());
                t.extend(keys.iter().copied());
                t
            },
            |mut t| {
                for k in &keys {
                    black_box(t.delete(k));
                }
                t
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_sync_union(c: &mut Criterion) {
    c.bench_function("sync_slot_table_union_5k", |b| {
        let l: SyncSlotTable<u64> = SyncSlotTable::from_table(lcg(13).take(5_000).collect());
        let r: SyncSlotTable<u64> = SyncSlotTable::from_table(lcg(17).take(5_000).collect());
        let out: SyncSlotTable<u64> = SyncSlotTable::new();
        b.iter(|| {
            out.union(&l, &r);
            black_box(out.len());
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_contains_hit, bench_contains_miss,
        bench_delete_clustered, bench_tracked_delete, bench_sync_union
}
criterion_main!(benches);
