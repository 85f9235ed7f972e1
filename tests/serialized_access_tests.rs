//! Serialized Access Tests
//!
//! The cache does no locking of its own; every lookup mutates recency and
//! frequency, so sharing it means wrapping it in a mutex. These tests drive a
//! `Mutex<SegmentedCache>` from a `scoped_threadpool` and check that the
//! bookkeeping still adds up once all workers are done.

use gencache::{GenerationKind, SegmentedCache};
use scoped_threadpool::Pool;
use std::sync::Mutex;

const WORKERS: u32 = 4;
const OPS_PER_WORKER: u32 = 500;

type SharedCache = Mutex<SegmentedCache<u32, Vec<u8>, u32>>;

fn make_shared(limit: u64) -> SharedCache {
    Mutex::new(SegmentedCache::new(limit))
}

#[test]
fn test_concurrent_inserts_and_lookups_keep_accounting() {
    let cache = make_shared(4096);
    let mut pool = Pool::new(WORKERS);

    pool.scoped(|scope| {
        for worker in 0..WORKERS {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..OPS_PER_WORKER {
                    let key = worker * OPS_PER_WORKER + i;
                    let mut guard = cache.lock().unwrap();
                    // Admission may turn a candidate away; that is not an error.
                    guard.insert(key, vec![0; (key % 13) as usize + 1], worker).unwrap();
                    if i % 3 == 0 {
                        guard.get(&(key / 2));
                    }
                }
            });
        }
    });

    let cache = cache.into_inner().unwrap();
    let resident: u64 = cache.entries().map(|e| e.weight()).sum();
    assert_eq!(cache.size(), resident, "size must equal the resident weights");

    let per_generation: usize = GenerationKind::ALL
        .iter()
        .map(|&kind| cache.generation(kind).len())
        .sum();
    assert_eq!(per_generation, cache.len());

    let stats = cache.stats();
    assert_eq!(
        stats["requests"],
        f64::from(WORKERS * OPS_PER_WORKER.div_ceil(3)),
        "every lookup is counted exactly once"
    );
    assert_eq!(
        stats["rejections"] + stats["evictions"] + cache.len() as f64,
        f64::from(WORKERS * OPS_PER_WORKER),
        "every candidate is resident, rejected or evicted"
    );

    let probation = cache.generation(GenerationKind::Probation);
    assert!(probation.size() < probation.limit() + 13);
    let protected = cache.generation(GenerationKind::Protected);
    assert!(protected.size() <= protected.limit());
}

#[test]
fn test_concurrent_lookups_count_every_hit() {
    let cache = make_shared(1024);
    {
        let mut guard = cache.lock().unwrap();
        guard.add_mrus((0..8).map(|k| (k, (vec![0; 4], 0))));
    }

    let mut pool = Pool::new(WORKERS);
    pool.scoped(|scope| {
        for _ in 0..WORKERS {
            let cache = &cache;
            scope.execute(move || {
                for _ in 0..OPS_PER_WORKER {
                    assert!(cache.lock().unwrap().get(&3).is_some());
                }
            });
        }
    });

    let mut cache = cache.into_inner().unwrap();
    let expected = u64::from(WORKERS * OPS_PER_WORKER) + 1;
    assert_eq!(cache.peek(&3).unwrap().frequency(), expected);

    cache.age_frequencies();
    assert_eq!(cache.peek(&3).unwrap().frequency(), expected / 2);
    assert_eq!(cache.stats()["cache_hits"], f64::from(WORKERS * OPS_PER_WORKER));
}

#[test]
fn test_concurrent_removals_leave_free_slots() {
    let cache = make_shared(1024);
    {
        let mut guard = cache.lock().unwrap();
        guard.add_mrus((0..40).map(|k| (k, (vec![0; 2], 0))));
    }
    let loaded = cache.lock().unwrap().len();

    let mut pool = Pool::new(WORKERS);
    pool.scoped(|scope| {
        for worker in 0..WORKERS {
            let cache = &cache;
            scope.execute(move || {
                for key in (worker..40).step_by(WORKERS as usize) {
                    cache.lock().unwrap().remove(&key);
                }
            });
        }
    });

    let cache = cache.into_inner().unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
    assert_eq!(cache.free_node_count(), loaded);
}
