use assoc_table::{AssociativeTable, OwnedText, TableConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> OwnedText {
    format!("k{:016x}", n).into()
}

fn filled(seed: u64, n: usize) -> (AssociativeTable<OwnedText, u64>, Vec<OwnedText>) {
    let mut t = AssociativeTable::new();
    let keys: Vec<OwnedText> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.insert_or_assign(k.clone(), i as u64);
    }
    (t, keys)
}

fn bench_insert_or_assign_100k(c: &mut Criterion) {
    c.bench_function("table::insert_or_assign_fresh_100k", |b| {
        b.iter_batched(
            AssociativeTable::<OwnedText, u64>::new,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    t.insert_or_assign(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("table::insert_or_assign_reserved_100k", |b| {
        b.iter_batched(
            || AssociativeTable::<OwnedText, u64>::with_capacity(100_000),
            |mut t| {
                for (i, x) in lcg(2).take(100_000).enumerate() {
                    t.insert_or_assign(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("table::insert_or_assign_overwrite_100k", |b| {
        b.iter_batched(
            || filled(3, 100_000),
            |(mut t, keys)| {
                for (i, k) in keys.into_iter().enumerate() {
                    t.insert_or_assign(k, !(i as u64));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("table::get_hit_10k_on_100k", |b| {
        let (t, keys) = filled(7, 100_000);
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].to_string()
            })
            .collect();
        b.iter(|| {
            for q in &queries {
                black_box(t.get(q.as_str()));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("table::get_miss_10k_on_100k", |b| {
        let (t, _) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = format!("k{:016x}", miss.next().unwrap_or_default());
                black_box(t.get(k.as_str()));
            }
        })
    });
}

fn bench_erase_churn(c: &mut Criterion) {
    // Erase then re-insert, leaving tombstones for the next growth check to purge.
    c.bench_function("table::erase_reinsert_churn_10k_on_100k", |b| {
        b.iter_batched(
            || {
                let (t, keys) = filled(13, 100_000);
                let n = keys.len();
                let mut s = 0x9e3779b97f4a7c15u64;
                let targets: Vec<OwnedText> = (0..10_000)
                    .map(|_| {
                        s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                        keys[(s as usize) % n].clone()
                    })
                    .collect();
                (t, targets)
            },
            |(mut t, targets)| {
                for (i, k) in targets.into_iter().enumerate() {
                    t.erase(k.as_str());
                    t.insert_or_assign(k, i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("table::erase_with_value_hook_10k", |b| {
        b.iter_batched(
            || {
                let mut t = TableConfig::<u64, u64>::new()
                    .on_value_drop(|v| {
                        black_box(v);
                    })
                    .build();
                for (i, x) in lcg(17).take(10_000).enumerate() {
                    t.insert_or_assign(x, i as u64);
                }
                t
            },
            |mut t| {
                for x in lcg(17).take(10_000) {
                    t.erase(&x);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_all_100k(c: &mut Criterion) {
    c.bench_function("table::iter_all_100k", |b| {
        let (t, _) = filled(999, 100_000);
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in &t {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_or_assign_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_erase_churn,
              bench_iter_all_100k
}
criterion_main!(benches_insert, benches_ops);
