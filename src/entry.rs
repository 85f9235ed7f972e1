//! Cache Entry Type
//!
//! A [`CacheEntry`] is the single record kept for a resident key. It holds the
//! caller's key, value and extra tag together with the bookkeeping the
//! generational policy needs:
//!
//! - `weight`: capacity units charged for the entry, fixed when the entry is
//!   created and only recomputed by an explicit `update_mru`
//! - `frequency`: approximate access counter, 1 on insertion, incremented by
//!   every hit and halved by `age_frequencies`
//! - `generation`: the generation whose recency list currently links the entry
//!
//! Entries are only mutated by the cache and its generation views; callers get
//! shared references.
//!
//! # Extra Tag
//!
//! The `X` parameter carries metadata that travels with a value without being
//! part of it, typically the transaction id the value was read at. It is what
//! iteration and snapshots return next to each key.
//!
//! ```
//! use gencache::SegmentedCache;
//!
//! let mut cache: SegmentedCache<u64, Vec<u8>, u64> = SegmentedCache::new(100);
//! cache.insert(7, b"state".to_vec(), 42).unwrap();
//!
//! let entry = cache.peek(&7).unwrap();
//! assert_eq!(entry.weight(), 5);
//! assert_eq!(entry.frequency(), 1);
//! assert_eq!(*entry.extra(), 42);
//! ```

use crate::meta::GenerationKind;
use crate::traits::LruEntry;
use core::fmt;

/// A resident cache record.
pub struct CacheEntry<K, V, X = ()> {
    key: K,
    value: V,
    extra: X,
    weight: u64,
    frequency: u64,
    generation: GenerationKind,
}

impl<K, V, X> CacheEntry<K, V, X> {
    /// Fresh entry with a frequency of 1.
    #[inline]
    pub(crate) fn new(
        key: K,
        value: V,
        extra: X,
        weight: u64,
        generation: GenerationKind,
    ) -> Self {
        Self {
            key,
            value,
            extra,
            weight,
            frequency: 1,
            generation,
        }
    }

    /// The cached key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The cached value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The extra tag stored alongside the value.
    #[inline]
    pub fn extra(&self) -> &X {
        &self.extra
    }

    /// Capacity units charged for this entry.
    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Approximate, decaying access counter.
    #[inline]
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// The generation currently holding this entry.
    #[inline]
    pub fn generation(&self) -> GenerationKind {
        self.generation
    }

    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.frequency = self.frequency.saturating_add(1);
    }

    #[inline]
    pub(crate) fn age(&mut self) {
        self.frequency /= 2;
    }

    #[inline]
    pub(crate) fn set_generation(&mut self, generation: GenerationKind) {
        self.generation = generation;
    }

    /// Swaps in a new value and weight, returning the old value.
    #[inline]
    pub(crate) fn replace_value(&mut self, value: V, weight: u64) -> V {
        self.weight = weight;
        core::mem::replace(&mut self.value, value)
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (K, V, X) {
        (self.key, self.value, self.extra)
    }
}

impl<K, V, X> LruEntry<K, V> for CacheEntry<K, V, X> {
    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn weight(&self) -> u64 {
        self.weight
    }

    fn frequency(&self) -> u64 {
        self.frequency
    }
}

impl<K: fmt::Debug, V, X: fmt::Debug> fmt::Debug for CacheEntry<K, V, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("extra", &self.extra)
            .field("weight", &self.weight)
            .field("frequency", &self.frequency)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_starts_at_frequency_one() {
        let entry = CacheEntry::new("k", 10, (), 3, GenerationKind::Eden);
        assert_eq!(entry.frequency(), 1);
        assert_eq!(entry.weight(), 3);
        assert_eq!(entry.generation(), GenerationKind::Eden);
    }

    #[test]
    fn test_aging_floors() {
        let mut entry = CacheEntry::new("k", 10, (), 3, GenerationKind::Eden);
        for _ in 0..4 {
            entry.record_hit();
        }
        assert_eq!(entry.frequency(), 5);
        entry.age();
        assert_eq!(entry.frequency(), 2);
        entry.age();
        entry.age();
        assert_eq!(entry.frequency(), 0);
    }

    #[test]
    fn test_replace_value_updates_weight() {
        let mut entry = CacheEntry::new("k", 10, 7u64, 3, GenerationKind::Protected);
        assert_eq!(entry.replace_value(20, 9), 10);
        assert_eq!(*entry.value(), 20);
        assert_eq!(entry.weight(), 9);
        assert_eq!(*entry.extra(), 7);
    }
}
