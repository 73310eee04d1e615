use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use deferval_core::{CounterRegistry, Formatted, Held, SingleFlightCell, TtlCache, Value};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_value_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_get");

    let held = Held::new(String::from("fixed"));
    group.bench_function("held", |b| b.iter(|| black_box(held.get())));

    let formatted = Formatted::new(|| format!("{}-{}", "user", 42));
    group.bench_function("formatted", |b| b.iter(|| black_box(formatted.get())));

    let cell = SingleFlightCell::new(|| Ok::<_, ()>(42u64));
    group.bench_function("single_flight_completed", |b| {
        b.iter(|| black_box(cell.get()))
    });

    group.finish();
}

fn bench_ttl_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ttl_cache_hit");

    let plain = TtlCache::new("bench", || Ok::<_, ()>(42u64), Duration::from_secs(3600));
    group.bench_function("noop_counters", |b| b.iter(|| black_box(plain.get())));

    let registry = Arc::new(CounterRegistry::new());
    let counted = TtlCache::builder("bench", || Ok::<_, ()>(42u64))
        .lifetime(Duration::from_secs(3600))
        .counters(registry)
        .build();
    group.bench_function("registry_counters", |b| {
        b.iter(|| black_box(counted.get()))
    });

    group.finish();
}

fn bench_ttl_cache_refresh(c: &mut Criterion) {
    // Zero lifetime: every get installs and evaluates a new snapshot
    let cache = TtlCache::new("bench", || Ok::<_, ()>(42u64), Duration::ZERO);
    c.bench_function("ttl_cache_refresh_every_get", |b| {
        b.iter(|| black_box(cache.get()))
    });
}

fn bench_concurrent_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("ttl_cache_concurrent");

    for threads in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("threads", threads),
            threads,
            |b, &threads| {
                let cache = Arc::new(TtlCache::new(
                    "bench",
                    || Ok::<_, ()>(42u64),
                    Duration::from_millis(1),
                ));
                b.iter(|| {
                    let handles: Vec<_> = (0..threads)
                        .map(|_| {
                            let cache = Arc::clone(&cache);
                            thread::spawn(move || {
                                for _ in 0..1000 {
                                    black_box(cache.get()).ok();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().ok();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_value_variants,
    bench_ttl_cache_hit,
    bench_ttl_cache_refresh,
    bench_concurrent_get
);
criterion_main!(benches);
