use std::cmp::Ordering;
use std::collections::BTreeMap;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use wabi_mmap::{Adapter, Arena, Handle, Iwbt, KeyAdapter, Link, Multimap};

const N: usize = 10_000;

struct Entry {
    link: Link,
    key: i64,
}

struct ByKey;

impl Adapter for ByKey {
    type Value = Entry;

    fn link(value: &Entry) -> &Link {
        &value.link
    }

    fn link_mut(value: &mut Entry) -> &mut Link {
        &mut value.link
    }
}

impl KeyAdapter for ByKey {
    type Key = i64;

    fn key(value: &Entry) -> &i64 {
        &value.key
    }

    fn compare(a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }
}

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64 % (n as i64 / 4));
    }
    keys
}

/// Allocates one unlinked entry per key.
fn arena_of(keys: &[i64]) -> (Arena<Entry>, Vec<Handle>) {
    let mut arena = Arena::with_capacity(keys.len());
    let handles = keys.iter().map(|&key| arena.alloc(Entry { link: Link::new(), key })).collect();
    (arena, handles)
}

fn filled_map(keys: &[i64]) -> (Arena<Entry>, Multimap<ByKey>, Vec<Handle>) {
    let (mut arena, handles) = arena_of(keys);
    let mut map = Multimap::new();
    for &handle in &handles {
        map.insert_last(&mut arena, handle);
    }
    (arena, map, handles)
}

/// The std stand-in for a stable multimap: duplicates are told apart by insertion sequence.
fn filled_btree(keys: &[i64]) -> BTreeMap<(i64, usize), ()> {
    keys.iter().enumerate().map(|(seq, &key)| ((key, seq), ())).collect()
}

// ─── Multimap Benchmarks ────────────────────────────────────────────────────

fn bench_multimap_insert(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("Multimap", N), |b| {
        b.iter_batched(
            || arena_of(keys),
            |(mut arena, handles)| {
                let mut map = Multimap::<ByKey>::new();
                for &handle in &handles {
                    map.insert_last(&mut arena, handle);
                }
                (arena, map)
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| filled_btree(keys));
    });

    group.finish();
}

fn bench_multimap_insert_ordered(c: &mut Criterion) {
    bench_multimap_insert(c, "multimap_insert_ordered", &ordered_keys(N));
}

fn bench_multimap_insert_reverse(c: &mut Criterion) {
    bench_multimap_insert(c, "multimap_insert_reverse", &reverse_ordered_keys(N));
}

fn bench_multimap_insert_random(c: &mut Criterion) {
    bench_multimap_insert(c, "multimap_insert_random", &random_keys(N));
}

fn bench_multimap_find_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let (arena, map, _) = filled_map(&keys);
    let bt_map = filled_btree(&keys);

    let mut group = c.benchmark_group("multimap_find_random");

    group.bench_function(BenchmarkId::new("Multimap", N), |b| {
        b.iter(|| {
            let mut found = 0usize;
            for key in &keys {
                if map.find_first(&arena, key).is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut found = 0usize;
            for &key in &keys {
                if bt_map.range((key, 0)..=(key, usize::MAX)).next().is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.finish();
}

fn bench_multimap_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("multimap_remove_random");

    group.bench_function(BenchmarkId::new("Multimap", N), |b| {
        b.iter_batched(
            || filled_map(&keys),
            |(mut arena, mut map, _)| {
                for key in &keys {
                    map.remove_first(&mut arena, key);
                }
                (arena, map)
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || filled_btree(&keys),
            |mut bt_map| {
                for &key in &keys {
                    if let Some(&first) = bt_map.range((key, 0)..=(key, usize::MAX)).next().map(|(k, _)| k) {
                        bt_map.remove(&first);
                    }
                }
                bt_map
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Positional Benchmarks ──────────────────────────────────────────────────

fn bench_iwbt_insert_at_random(c: &mut Criterion) {
    let positions = random_keys(N);
    let mut group = c.benchmark_group("iwbt_insert_at_random");

    group.bench_function(BenchmarkId::new("Iwbt", N), |b| {
        b.iter_batched(
            || arena_of(&positions),
            |(mut arena, handles)| {
                let mut tree = Iwbt::<ByKey>::new();
                for (len, &handle) in handles.iter().enumerate() {
                    let index = arena[handle].key as usize % (len + 1);
                    tree.insert_at(&mut arena, index, handle);
                }
                (arena, tree)
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("Vec", N), |b| {
        b.iter(|| {
            let mut vec = Vec::with_capacity(N);
            for (len, &position) in positions.iter().enumerate() {
                vec.insert(position as usize % (len + 1), position);
            }
            vec
        });
    });

    group.finish();
}

fn bench_iwbt_rank_queries(c: &mut Criterion) {
    let (arena, map, handles) = filled_map(&ordered_keys(N));
    let tree = map.tree();
    let mut group = c.benchmark_group("iwbt_rank_queries");

    group.bench_function(BenchmarkId::new("get_by_rank", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for rank in 0..N {
                if let Some(handle) = tree.get_by_rank(&arena, rank) {
                    sum = sum.wrapping_add(arena[handle].key);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("rank_of", N), |b| {
        b.iter(|| handles.iter().map(|&handle| tree.rank_of(&arena, handle)).sum::<usize>());
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(
    multimap_insert_benches,
    bench_multimap_insert_ordered,
    bench_multimap_insert_reverse,
    bench_multimap_insert_random,
);

criterion_group!(multimap_lookup_benches, bench_multimap_find_random, bench_multimap_remove_random,);

criterion_group!(iwbt_benches, bench_iwbt_insert_at_random, bench_iwbt_rank_queries,);

criterion_main!(multimap_insert_benches, multimap_lookup_benches, iwbt_benches);
