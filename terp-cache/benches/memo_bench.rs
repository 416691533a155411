//! Criterion benchmarks for the memoizer: hit path, miss path, key building.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;
use terp_cache::{ttl_cache, CacheKey};

fn bench_hit(c: &mut Criterion) {
    let memo = ttl_cache(Duration::from_secs(3600))
        .memoize(|x: &u64| x.wrapping_mul(31))
        .unwrap();
    memo.get(&7).unwrap();

    let mut g = c.benchmark_group("memo_hit");
    g.throughput(Throughput::Elements(1));
    g.bench_function("u64", |b| {
        b.iter(|| black_box(memo.get(black_box(&7))).unwrap());
    });
    g.finish();
}

fn bench_miss(c: &mut Criterion) {
    let memo = ttl_cache(Duration::from_secs(3600))
        .with_max_entries(1024)
        .memoize(|x: &u64| x.wrapping_mul(31))
        .unwrap();

    let mut next = 0u64;
    let mut g = c.benchmark_group("memo_miss");
    g.throughput(Throughput::Elements(1));
    g.bench_function("u64_with_eviction", |b| {
        b.iter(|| {
            next += 1;
            black_box(memo.get(&next)).unwrap()
        });
    });
    g.finish();
}

fn bench_key(c: &mut Criterion) {
    let args = (42i64, "professor-slug".to_string(), json!([1, 2.5, "x"]));

    let mut g = c.benchmark_group("key");
    g.bench_function("untyped_tuple", |b| {
        b.iter(|| black_box(args.to_key(false)).unwrap());
    });
    g.bench_function("typed_tuple", |b| {
        b.iter(|| black_box(args.to_key(true)).unwrap());
    });
    g.finish();
}

criterion_group!(benches, bench_hit, bench_miss, bench_key);
criterion_main!(benches);
