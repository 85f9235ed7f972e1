//! Capability Traits
//!
//! The contracts a cache entry, a single generation and a whole cache offer.
//! [`CacheEntry`](crate::CacheEntry), [`GenerationMut`](crate::GenerationMut)
//! and [`SegmentedCache`](crate::SegmentedCache) are the implementations
//! shipped with the crate; code that only needs the contract can be written
//! against the traits instead.

extern crate alloc;

use crate::error::CacheError;
use crate::list::EntryId;
use crate::meta::GenerationKind;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Read access to a resident entry.
pub trait LruEntry<K, V> {
    /// The cached key.
    fn key(&self) -> &K;
    /// The cached value.
    fn value(&self) -> &V;
    /// Capacity units charged for the entry.
    fn weight(&self) -> u64;
    /// Approximate access counter.
    fn frequency(&self) -> u64;
}

/// One weight-bounded recency list.
pub trait LruGeneration<K, V, X> {
    /// Which generation this is.
    fn kind(&self) -> GenerationKind;

    /// Resident entries.
    fn len(&self) -> usize;

    /// `true` when no entry is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resident weight.
    fn size(&self) -> u64;

    /// Weight limit.
    fn limit(&self) -> u64;

    /// Links a new entry at the MRU end with a frequency of 1.
    ///
    /// Fails with [`CacheError::DuplicateKey`] if the key is resident in any
    /// generation of the owning cache.
    fn add_mru(&mut self, key: K, value: V, extra: X) -> Result<EntryId, CacheError>;

    /// Counts a hit on a resident entry and moves it to the MRU end.
    fn on_hit(&mut self, id: EntryId) -> Result<(), CacheError>;

    /// Replaces an entry's value, moves it to the MRU end and evicts from the
    /// LRU end until the generation fits its limit again. The updated entry
    /// itself is never evicted. Evicted pairs are returned LRU-first.
    fn update_mru(&mut self, id: EntryId, value: V) -> Result<Vec<(K, V)>, CacheError>;
}

/// A bounded, weight-aware key/value cache.
pub trait LruCache<K, V, X> {
    /// The resident entry type.
    type Entry: LruEntry<K, V>;

    /// `true` if the key is resident. No side effects.
    fn contains_key(&self, key: &K) -> bool;

    /// Looks a key up, counting a hit or a miss. A hit raises the entry's
    /// frequency and refreshes its recency.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Inserts a new key. Returns `Ok(None)` when the admission check turns
    /// the candidate away.
    fn insert(&mut self, key: K, value: V, extra: X) -> Result<Option<EntryId>, CacheError>;

    /// Removes a key, returning its value and extra tag.
    fn remove(&mut self, key: &K) -> Option<(V, X)>;

    /// Resident entries.
    fn len(&self) -> usize;

    /// `true` when no entry is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resident weight.
    fn size(&self) -> u64;

    /// Bulk-loads candidates ordered most valuable first and returns the
    /// admitted entries in input order.
    fn add_mrus<I>(&mut self, items: I) -> Vec<&Self::Entry>
    where
        I: IntoIterator<Item = (K, (V, X))>;

    /// Halves every resident entry's frequency.
    fn age_frequencies(&mut self);

    /// Counters and occupancy as a sorted report.
    fn stats(&self) -> BTreeMap<String, f64>;
}
