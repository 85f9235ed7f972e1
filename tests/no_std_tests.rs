#![no_std]
extern crate alloc;
extern crate gencache;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use gencache::config::SegmentedCacheConfig;
use gencache::weight::{ValueLen, WeightFns};
use gencache::{GenerationKind, SegmentedCache};

// Helper functions to create caches with the init pattern
fn make_cache<K: core::hash::Hash + Eq + Clone>(limit: u64) -> SegmentedCache<K, Vec<u8>> {
    SegmentedCache::init(SegmentedCacheConfig::new(limit), ValueLen, None).unwrap()
}

#[test]
fn test_segmented_in_no_std() {
    let mut cache = make_cache(100);

    // Using String as it requires the alloc crate
    let key1 = String::from("key1");
    let key2 = String::from("key2");

    cache.insert(key1.clone(), vec![1; 4], ()).unwrap();
    cache.insert(key2.clone(), vec![2; 4], ()).unwrap();

    assert_eq!(cache.get(&key1).map(Vec::len), Some(4));
    assert_eq!(cache.get("key2").map(|v| v[0]), Some(2));
    assert!(cache.get("key3").is_none());
    assert_eq!(cache.size(), 8);
}

#[test]
fn test_bulk_load_in_no_std() {
    let mut cache = make_cache(20);
    let keys: Vec<String> = (0..6).map(|i| format!("key{i}")).collect();

    let admitted = cache.add_mrus(keys.iter().map(|k| (k.clone(), (vec![0; 5], ()))));
    assert_eq!(admitted.len(), 4);
    assert_eq!(cache.generation(GenerationKind::Protected).len(), 3);
    assert!(!cache.contains_key("key5"));
}

#[test]
fn test_snapshot_in_no_std() {
    let mut cache: SegmentedCache<String, Vec<u8>, u32> = SegmentedCache::new(100);
    for i in 0..3 {
        cache.insert(format!("key{i}"), vec![0; 2], i).unwrap();
    }
    let snapshot = cache.snapshot();
    let extras: Vec<u32> = snapshot.iter().map(|(_, x)| *x).collect();
    assert_eq!(extras, [2, 1, 0]);
}

#[test]
fn test_weight_fns_in_no_std() {
    let weigher = WeightFns::new(|k: &String| k.len() as u64, |v: &u32| u64::from(*v));
    let mut cache = SegmentedCache::with_weigher(100, weigher);
    cache.insert(String::from("abcd"), 6u32, ()).unwrap();
    assert_eq!(cache.size(), 10);

    cache.age_frequencies();
    assert_eq!(cache.peek("abcd").unwrap().frequency(), 0);
}
