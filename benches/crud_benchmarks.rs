use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use avl_core::marshal::I64Marshaller;
use avl_core::{ArrayTree, AvlTree, AvlTreeMap, AvlTreeMarshaller, Cursor};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

const N: usize = 10_000;

/// `ArrayTree` re-sorts on every insert, so it is measured on a smaller set.
const ARRAY_N: usize = 1_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Insert ─────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("AvlTree", keys.len()), |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &k in keys {
                tree.insert(k);
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", keys.len()), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_insert_ordered(c: &mut Criterion) {
    bench_insert(c, "insert_ordered", &ordered_keys(N));
}

fn bench_insert_random(c: &mut Criterion) {
    bench_insert(c, "insert_random", &random_keys(N));
}

fn bench_array_insert_random(c: &mut Criterion) {
    let keys = random_keys(ARRAY_N);
    let mut group = c.benchmark_group("array_insert_random");

    group.bench_function(BenchmarkId::new("ArrayTree", ARRAY_N), |b| {
        b.iter(|| {
            let mut tree = ArrayTree::new();
            for &k in &keys {
                tree.insert(k);
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("AvlTree", ARRAY_N), |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for &k in &keys {
                tree.insert(k);
            }
            tree
        });
    });

    group.finish();
}

// ─── Lookup ─────────────────────────────────────────────────────────────────

fn bench_find_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree: AvlTree<i64> = keys.iter().copied().collect();
    let array: ArrayTree<i64> = keys.iter().copied().collect();
    let set: BTreeSet<i64> = keys.iter().copied().collect();

    let mut group = c.benchmark_group("find_random");

    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        b.iter(|| keys.iter().filter(|k| tree.contains(k)).count());
    });

    group.bench_function(BenchmarkId::new("ArrayTree", N), |b| {
        b.iter(|| keys.iter().filter(|k| array.contains(k)).count());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| keys.iter().filter(|k| set.contains(k)).count());
    });

    group.finish();
}

fn bench_find_greater(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree: AvlTree<i64> = keys.iter().copied().collect();
    let array: ArrayTree<i64> = keys.iter().copied().collect();
    let set: BTreeSet<i64> = keys.iter().copied().collect();
    let probes: Vec<i64> = keys.iter().map(|k| k + 1).collect();

    let mut group = c.benchmark_group("find_greater");

    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        b.iter(|| probes.iter().filter_map(|k| tree.find_greater(k)).count());
    });

    group.bench_function(BenchmarkId::new("ArrayTree", N), |b| {
        b.iter(|| probes.iter().filter_map(|k| array.find_greater(k)).count());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            probes
                .iter()
                .filter_map(|k| set.range((Excluded(k), Unbounded)).next())
                .count()
        });
    });

    group.finish();
}

// ─── Remove ─────────────────────────────────────────────────────────────────

fn bench_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("remove_random");

    group.bench_function(BenchmarkId::new("AvlTree", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<AvlTree<i64>>(),
            |mut tree| {
                for k in &keys {
                    tree.remove(k);
                }
                tree
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BTreeSet<i64>>(),
            |mut set| {
                for k in &keys {
                    set.remove(k);
                }
                set
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Traversal ──────────────────────────────────────────────────────────────

fn bench_walk(c: &mut Criterion) {
    let tree: AvlTree<i64> = random_keys(N).into_iter().collect();
    let set: BTreeSet<i64> = tree.iter().copied().collect();

    let mut group = c.benchmark_group("walk");

    group.bench_function(BenchmarkId::new("AvlTreeCursor", N), |b| {
        b.iter(|| {
            let mut cursor = tree.cursor();
            let mut sum = 0i64;
            while cursor.next().unwrap_or(false) {
                if let Ok(&k) = cursor.get() {
                    sum = sum.wrapping_add(k);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("AvlTree::iter", N), |b| {
        b.iter(|| tree.iter().fold(0i64, |sum, &k| sum.wrapping_add(k)));
    });

    group.bench_function(BenchmarkId::new("BTreeSet::iter", N), |b| {
        b.iter(|| set.iter().fold(0i64, |sum, &k| sum.wrapping_add(k)));
    });

    group.finish();
}

// ─── Duplicate-key map ──────────────────────────────────────────────────────

fn bench_map_insert_duplicates(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("map_insert_duplicates");

    group.bench_function(BenchmarkId::new("AvlTreeMap", N), |b| {
        b.iter(|| {
            let mut map = AvlTreeMap::new(true);
            for &k in &keys {
                map.insert(k % 1_000, k);
            }
            map
        });
    });

    group.finish();
}

// ─── Marshalling ────────────────────────────────────────────────────────────

fn bench_marshal_round_trip(c: &mut Criterion) {
    let tree: AvlTree<i64> = random_keys(N).into_iter().collect();
    let marshaller = AvlTreeMarshaller::natural(I64Marshaller);
    let bytes = marshaller.serialize(&tree).unwrap();

    let mut group = c.benchmark_group("marshal");

    group.bench_function(BenchmarkId::new("serialize", N), |b| {
        b.iter(|| marshaller.serialize(&tree).unwrap());
    });

    group.bench_function(BenchmarkId::new("deserialize", N), |b| {
        b.iter(|| marshaller.deserialize::<i64>(&bytes).unwrap());
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(insert_benches, bench_insert_ordered, bench_insert_random, bench_array_insert_random,);

criterion_group!(lookup_benches, bench_find_random, bench_find_greater,);

criterion_group!(remove_benches, bench_remove_random,);

criterion_group!(walk_benches, bench_walk,);

criterion_group!(map_benches, bench_map_insert_duplicates,);

criterion_group!(marshal_benches, bench_marshal_round_trip,);

criterion_main!(
    insert_benches,
    lookup_benches,
    remove_benches,
    walk_benches,
    map_benches,
    marshal_benches,
);
