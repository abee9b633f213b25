use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probing_hashtable::{OpenAddressingBuilder, OpenAddressingTable, ProbingStrategy};
use rand::{rngs::StdRng, Rng, SeedableRng};

const STRATEGIES: [(&str, ProbingStrategy); 2] = [
    ("linear", ProbingStrategy::Linear { constant: 17 }),
    ("quadratic", ProbingStrategy::Quadratic),
];

fn table(strategy: ProbingStrategy) -> OpenAddressingTable<u64, u64> {
    OpenAddressingBuilder::new()
        .with_strategy(strategy)
        .build()
        .unwrap()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("OpenAddressingTable::insert");

    for size in [1_000u64, 10_000, 100_000] {
        for (name, strategy) in STRATEGIES {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let mut t = table(strategy);
                    for k in 0..size {
                        t.insert(black_box(k), k);
                    }
                    t
                });
            });
        }
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("OpenAddressingTable::get");
    let size = 10_000u64;

    for (name, strategy) in STRATEGIES {
        let mut t = table(strategy);
        for k in 0..size {
            t.insert(k, k);
        }

        group.bench_function(BenchmarkId::new(name, "hit"), |b| {
            b.iter(|| {
                for k in 0..size {
                    black_box(t.get(&k));
                }
            });
        });

        group.bench_function(BenchmarkId::new(name, "miss"), |b| {
            b.iter(|| {
                for k in size..2 * size {
                    black_box(t.get(&k));
                }
            });
        });
    }

    group.finish();
}

/// Interleaved inserts and removes over a small key space, which keeps the table full of tombstones.
fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("OpenAddressingTable::churn");

    for (name, strategy) in STRATEGIES {
        group.bench_function(name, |b| {
            let mut rng = StdRng::seed_from_u64(42);
            let ops: Vec<(bool, u64)> = (0..10_000)
                .map(|_| (rng.gen_bool(0.5), rng.gen_range(0..1_024)))
                .collect();
            b.iter(|| {
                let mut t = table(strategy);
                for &(insert, k) in &ops {
                    if insert {
                        t.insert(k, k);
                    } else {
                        t.remove(&k);
                    }
                }
                t
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_churn);
criterion_main!(benches);
