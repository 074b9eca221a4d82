//! Page cache benchmarks
//!
//! Benchmarks for insert, promoting reads, get-or-create misses, and batch
//! trimming.
//!
//! Run with: `cargo bench --bench cache_bench`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pagecache::{CacheConfig, PageCache};
use rand::seq::SliceRandom;

// ============================================================================
// Basic Operations Benchmarks
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_insert");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("count_limited", size), &size, |b, &size| {
            let cache: PageCache<u64, Arc<String>> =
                PageCache::new(CacheConfig::count_limited(size));
            let page = Arc::new("x".repeat(256));
            let mut counter = 0u64;
            b.iter(|| {
                cache.insert(black_box(counter), Arc::clone(&page));
                counter = counter.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_get_hit");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("count_limited", size), &size, |b, &size| {
            let cache: PageCache<u64, Arc<String>> =
                PageCache::new(CacheConfig::count_limited(size));
            let page = Arc::new("x".repeat(256));
            for key in 0..size as u64 {
                cache.insert(key, Arc::clone(&page));
            }
            let mut counter = 0u64;
            b.iter(|| {
                let key = counter % (size as u64);
                let _ = black_box(cache.get(&black_box(key)));
                counter = counter.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_get_or_insert_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_get_or_insert_miss");
    group.throughput(Throughput::Elements(1));

    group.bench_function("unbounded", |b| {
        let cache: PageCache<u64, Arc<String>> = PageCache::new(CacheConfig::default());
        let mut counter = 0u64;
        b.iter(|| {
            let page = cache
                .get_or_insert_with(black_box(counter), || Arc::new(format!("page_{counter}")));
            black_box(page);
            counter = counter.wrapping_add(1);
        });
    });

    group.finish();
}

// ============================================================================
// Trim Benchmarks
// ============================================================================

fn bench_trim_to_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_trim_to_count");

    for size in [1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("batch", size), &size, |b, &size| {
            let page = Arc::new("x".repeat(256));
            let mut keys: Vec<u64> = (0..size as u64).collect();
            keys.shuffle(&mut rand::thread_rng());

            b.iter_batched(
                || {
                    let cache: PageCache<u64, Arc<String>> =
                        PageCache::new(CacheConfig::default());
                    for &key in &keys {
                        cache.insert(key, Arc::clone(&page));
                    }
                    cache
                },
                |cache| cache.trim_to_count(black_box(size / 10)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_remove_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_remove_all");

    for size in [1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("swap", size), &size, |b, &size| {
            let page = Arc::new("x".repeat(256));
            b.iter_batched(
                || {
                    let cache: PageCache<u64, Arc<String>> =
                        PageCache::new(CacheConfig::default());
                    for key in 0..size as u64 {
                        cache.insert(key, Arc::clone(&page));
                    }
                    cache
                },
                |cache| cache.remove_all(),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_get_hit,
    bench_get_or_insert_miss,
    bench_trim_to_count,
    bench_remove_all
);
criterion_main!(benches);
