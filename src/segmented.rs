//! Three-Generation Segmented Cache
//!
//! A weight-bounded cache that splits its budget across three recency lists
//! ("generations") so that one burst of new keys cannot flush the entries
//! that have been resident for a while.
//!
//! # How the Cache Works
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                            SegmentedCache                                │
//! │                                                                          │
//! │   insert / add_mrus                                                      │
//! │          │                                                               │
//! │          ▼                                                               │
//! │  ┌──────────────────────────────┐                                        │
//! │  │ EDEN (10 %)                  │  admission window                      │
//! │  │ MRU ◀──▶ [new] ◀──▶ ... LRU  │                                        │
//! │  └──────────────┬───────────────┘                                        │
//! │                 │ overflow: pop LRU                                      │
//! │        fits? ───┴─── probation has room? ─── neither: evict              │
//! │          ▼               ▼                                               │
//! │  ┌──────────────────┐  ┌──────────────────┐                              │
//! │  │ PROTECTED (80 %) │  │ PROBATION (10 %) │                              │
//! │  │ promoted entries │  │ terminal tier    │                              │
//! │  └──────────────────┘  └──────────────────┘                              │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! 1. **Admission**: a candidate of weight `w` is admitted only if at least
//!    one generation has `w` units of room left. Turned-away candidates are
//!    counted as rejections, never as evictions.
//! 2. **Insert**: admitted keys enter eden at the MRU end with frequency 1.
//! 3. **Cascade**: while eden is over its limit and holds more than one entry,
//!    its LRU entry moves to protected if it fits there, otherwise to
//!    probation while probation is under its limit. An entry neither tier
//!    takes is evicted. The newest eden entry always stays, so eden can hold
//!    a single oversized entry.
//! 4. **Hits**: raise the frequency by one and refresh recency within the
//!    entry's current generation. Entries never move between generations on a
//!    hit.
//! 5. **Eviction**: the cascade evicts entries leaving eden that have nowhere
//!    to go, and [`SegmentedCache::update_mru`] evicts from the LRU end of the
//!    updated entry's generation.
//!
//! Protected never exceeds its limit through the cascade. Probation takes an
//! entry while it has any room left, so it overshoots its limit by less than
//! one entry's weight.
//!
//! # Bulk Reload
//!
//! [`SegmentedCache::snapshot`] lists resident keys most valuable first and
//! [`SegmentedCache::add_mrus`] accepts candidates in that order, so a cache
//! can be persisted as `(key, extra)` pairs and warmed up again by fetching
//! the values and feeding them back in.
//!
//! # Examples
//!
//! ```
//! use gencache::{GenerationKind, SegmentedCache};
//!
//! // 20 units: eden 2, protected 16, probation 2.
//! let mut cache: SegmentedCache<u32, Vec<u8>> = SegmentedCache::new(20);
//!
//! let admitted = cache.add_mrus((1..=6).map(|k| (k, (vec![0u8; 5], ()))));
//! let keys: Vec<u32> = admitted.iter().map(|e| *e.key()).collect();
//! assert_eq!(keys, [1, 2, 3, 4]);
//!
//! assert_eq!(cache.generation(GenerationKind::Protected).len(), 3);
//! assert_eq!(cache.generation(GenerationKind::Eden).len(), 1);
//! ```

extern crate alloc;

use crate::config::SegmentedCacheConfig;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::generation::{Generation, GenerationMut, GenerationState};
use crate::list::{EntryId, NodeArena};
use crate::meta::GenerationKind;
use crate::metrics::{CacheMetrics, SegmentedCacheMetrics};
use crate::traits::LruCache;
use crate::weight::{ValueLen, Weigher};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

const EDEN: usize = GenerationKind::Eden.index();
const PROTECTED: usize = GenerationKind::Protected.index();
const PROBATION: usize = GenerationKind::Probation.index();

/// A weight-bounded cache with eden, protected and probation generations.
///
/// `X` is an extra tag stored next to every value and returned by iteration,
/// `W` weighs entries and `S` hashes keys for the index.
///
/// # Examples
///
/// ```
/// use gencache::SegmentedCache;
///
/// let mut cache: SegmentedCache<&str, String> = SegmentedCache::new(100);
/// cache.insert("greeting", "hello".to_string(), ()).unwrap();
///
/// assert_eq!(cache.get(&"greeting").map(String::as_str), Some("hello"));
/// assert_eq!(cache.size(), 5);
/// assert!(cache.insert("greeting", "again".to_string(), ()).is_err());
/// ```
pub struct SegmentedCache<K, V, X = (), W = ValueLen, S = DefaultHashBuilder> {
    config: SegmentedCacheConfig,

    /// Node storage shared by the three generations.
    arena: NodeArena<CacheEntry<K, V, X>>,

    /// Indexed by `GenerationKind::index()`.
    generations: [GenerationState; 3],

    /// Key to arena slot.
    index: HashMap<K, usize, S>,

    metrics: SegmentedCacheMetrics,

    weigher: W,
}

impl<K, V, X> SegmentedCache<K, V, X> {
    /// A cache with the default partition that weighs values by byte length.
    pub fn new(limit: u64) -> Self {
        Self::build(
            SegmentedCacheConfig::new(limit),
            ValueLen,
            DefaultHashBuilder::default(),
        )
    }
}

impl<K, V, X, W> SegmentedCache<K, V, X, W> {
    /// A cache with the default partition and a custom weigher.
    ///
    /// ```
    /// use gencache::SegmentedCache;
    /// use gencache::weight::WeightFns;
    ///
    /// let weigher = WeightFns::new(|_: &u32| 0u64, |v: &u64| *v);
    /// let mut cache = SegmentedCache::with_weigher(100, weigher);
    /// cache.insert(1, 40u64, ()).unwrap();
    /// assert_eq!(cache.size(), 40);
    /// ```
    pub fn with_weigher(limit: u64, weigher: W) -> Self {
        Self::build(
            SegmentedCacheConfig::new(limit),
            weigher,
            DefaultHashBuilder::default(),
        )
    }
}

impl<K, V, X, W, S> SegmentedCache<K, V, X, W, S> {
    /// Creates a cache from a validated configuration.
    ///
    /// When `hasher` is `None` the hasher's default is used.
    ///
    /// ```
    /// use gencache::SegmentedCache;
    /// use gencache::config::SegmentedCacheConfig;
    /// use gencache::weight::ValueLen;
    ///
    /// let config = SegmentedCacheConfig {
    ///     limit: 1000,
    ///     eden_percent: 20,
    ///     probation_percent: 10,
    ///     entry_overhead: 8,
    /// };
    /// let cache: SegmentedCache<u64, Vec<u8>> = SegmentedCache::init(config, ValueLen, None).unwrap();
    /// assert_eq!(cache.limit(), 1000);
    ///
    /// let bad = SegmentedCacheConfig { eden_percent: 60, probation_percent: 40, ..config };
    /// assert!(SegmentedCache::<u64, Vec<u8>>::init(bad, ValueLen, None).is_err());
    /// ```
    pub fn init(
        config: SegmentedCacheConfig,
        weigher: W,
        hasher: Option<S>,
    ) -> Result<Self, CacheError>
    where
        S: Default,
    {
        config.validate()?;
        Ok(Self::build(config, weigher, hasher.unwrap_or_default()))
    }

    fn build(config: SegmentedCacheConfig, weigher: W, hasher: S) -> Self {
        let generations = GenerationKind::ALL
            .map(|kind| GenerationState::new(kind, config.generation_limit(kind)));
        let limits = generations.map(|state| state.limit);
        SegmentedCache {
            config,
            arena: NodeArena::new(),
            generations,
            index: HashMap::with_hasher(hasher),
            metrics: SegmentedCacheMetrics::new(config.limit, limits),
            weigher,
        }
    }

    /// The configuration the cache was built with.
    #[inline]
    pub fn config(&self) -> &SegmentedCacheConfig {
        &self.config
    }

    /// Resident entries across all generations.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// `true` when no entry is resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Resident weight across all generations.
    #[inline]
    pub fn size(&self) -> u64 {
        self.generations.iter().map(|state| state.size).sum()
    }

    /// Total weight budget.
    #[inline]
    pub fn limit(&self) -> u64 {
        self.config.limit
    }

    /// Released node slots waiting to be reused by the next insertion.
    #[inline]
    pub fn free_node_count(&self) -> usize {
        self.arena.free_len()
    }

    /// Shared view of one generation.
    pub fn generation(&self, kind: GenerationKind) -> Generation<'_, K, V, X> {
        Generation {
            state: &self.generations[kind.index()],
            arena: &self.arena,
        }
    }

    /// Shared view of the generation with the given ordinal
    /// (1 = probation, 2 = protected, 3 = eden).
    pub fn generation_by_ordinal(&self, ordinal: u8) -> Result<Generation<'_, K, V, X>, CacheError> {
        GenerationKind::try_from(ordinal).map(|kind| self.generation(kind))
    }

    /// Exclusive view of one generation.
    pub fn generation_mut(&mut self, kind: GenerationKind) -> GenerationMut<'_, K, V, X, W, S> {
        GenerationMut {
            state: &mut self.generations[kind.index()],
            arena: &mut self.arena,
            index: &mut self.index,
            metrics: &mut self.metrics,
            weigher: &self.weigher,
            overhead: self.config.entry_overhead,
        }
    }

    /// Resident entry behind a handle, if the handle is still valid.
    pub fn entry(&self, id: EntryId) -> Option<&CacheEntry<K, V, X>> {
        self.arena.resolve(id).and_then(|slot| self.arena.get(slot))
    }

    /// Every resident entry: probation, then protected, then eden, each from
    /// the LRU end to the MRU end.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<K, V, X>> + '_ {
        GenerationKind::ALL
            .into_iter()
            .flat_map(move |kind| self.generation(kind).iter())
    }

    /// `(key, extra)` pairs in the order of [`entries`](Self::entries).
    pub fn iter(&self) -> impl Iterator<Item = (&K, &X)> + '_ {
        self.entries().map(|entry| (entry.key(), entry.extra()))
    }

    /// `(key, extra)` pairs ordered most valuable first: protected, then
    /// eden, then probation, each from the MRU end. Feeding the keys back
    /// through [`add_mrus`](Self::add_mrus) in this order rebuilds a similar
    /// cache.
    pub fn snapshot(&self) -> Vec<(K, X)>
    where
        K: Clone,
        X: Clone,
    {
        let mut pairs = Vec::with_capacity(self.len());
        for kind in [
            GenerationKind::Protected,
            GenerationKind::Eden,
            GenerationKind::Probation,
        ] {
            pairs.extend(
                self.generation(kind)
                    .iter_mru()
                    .map(|entry| (entry.key().clone(), entry.extra().clone())),
            );
        }
        pairs
    }

    /// Halves every resident entry's frequency, rounding down. Nothing moves.
    pub fn age_frequencies(&mut self) {
        for entry in self.arena.values_mut() {
            entry.age();
        }
        self.metrics.record_aging();
        tracing::trace!(len = self.arena.len(), "aged entry frequencies");
    }

    /// Drops every entry. Slots go back to the free list and outstanding
    /// handles become stale.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        for state in &mut self.generations {
            state.clear();
        }
    }

    /// Counters with the occupancy refreshed from the live generations.
    fn report(&self) -> SegmentedCacheMetrics {
        let mut metrics = self.metrics.clone();
        for state in &self.generations {
            metrics.update_generation(state.kind, state.ring.len(), state.size);
        }
        metrics
    }

    /// Counters and occupancy as a sorted report.
    pub fn stats(&self) -> BTreeMap<String, f64> {
        self.report().to_btreemap()
    }

    /// `true` if no generation has `weight` units of room left.
    fn is_oversized(&self, weight: u64) -> bool {
        self.generations
            .iter()
            .all(|state| weight > state.remaining())
    }
}

impl<K, V, X, W, S> SegmentedCache<K, V, X, W, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// `true` if the key is resident. Does not count as a lookup.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Reads an entry without counting a lookup or touching its frequency
    /// and recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&CacheEntry<K, V, X>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = *self.index.get(key)?;
        self.arena.get(slot)
    }

    /// Handle of a resident key.
    pub fn entry_id<Q>(&self, key: &Q) -> Option<EntryId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get(key).map(|&slot| self.arena.id_at(slot))
    }

    /// Removes a key, returning its value and extra tag.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(V, X)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.index.remove(key)?;
        let kind = self.arena.get(slot)?.generation();
        self.generations[kind.index()].unlink(&mut self.arena, slot);
        let (_, value, extra) = self.arena.release(slot)?.into_parts();
        Some((value, extra))
    }
}

impl<K, V, X, W, S> SegmentedCache<K, V, X, W, S>
where
    K: Hash + Eq + Clone,
    W: Weigher<K, V>,
    S: BuildHasher,
{
    /// Looks a key up and returns its entry.
    ///
    /// A hit raises the entry's frequency by one and moves it to the MRU end
    /// of its generation. Hits and misses are both counted.
    pub fn get_entry<Q>(&mut self, key: &Q) -> Option<&CacheEntry<K, V, X>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&slot) = self.index.get(key) else {
            self.metrics.core.record_miss();
            return None;
        };
        let kind = self.arena.get(slot)?.generation();
        self.generation_mut(kind).hit_slot(slot);
        self.arena.get(slot)
    }

    /// Looks a key up and returns its value. See [`get_entry`](Self::get_entry).
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_entry(key).map(CacheEntry::value)
    }

    /// Inserts a new key into eden and runs the eden cascade.
    ///
    /// Returns `Ok(None)` when the candidate is heavier than the room left in
    /// every generation, and [`CacheError::DuplicateKey`] when the key is
    /// already resident.
    pub fn insert(&mut self, key: K, value: V, extra: X) -> Result<Option<EntryId>, CacheError> {
        if self.index.contains_key(&key) {
            return Err(CacheError::DuplicateKey);
        }
        Ok(self.admit(key, value, extra))
    }

    /// Bulk-loads candidates ordered most valuable first.
    ///
    /// Keys already resident are skipped. Each remaining candidate goes
    /// through the admission check and, if admitted, into eden followed by
    /// the cascade. Returns the admitted entries in input order.
    ///
    /// ```
    /// use gencache::{GenerationKind, SegmentedCache};
    ///
    /// let mut cache: SegmentedCache<u32, Vec<u8>> = SegmentedCache::new(20);
    /// let weights = [15, 3, 1, 2];
    /// let admitted = cache.add_mrus(
    ///     weights.iter().enumerate().map(|(i, &w)| (i as u32 + 1, (vec![0u8; w], ()))),
    /// );
    /// assert_eq!(admitted.len(), 3);
    ///
    /// let keys = |kind| cache.generation(kind).keys().copied().collect::<Vec<_>>();
    /// assert_eq!(keys(GenerationKind::Protected), [1]);
    /// assert_eq!(keys(GenerationKind::Probation), [2]);
    /// assert_eq!(keys(GenerationKind::Eden), [3]);
    /// ```
    pub fn add_mrus<I>(&mut self, items: I) -> Vec<&CacheEntry<K, V, X>>
    where
        I: IntoIterator<Item = (K, (V, X))>,
    {
        let mut admitted = Vec::new();
        let mut skipped = 0usize;
        let mut rejected = 0usize;
        for (key, (value, extra)) in items {
            if self.index.contains_key(&key) {
                skipped += 1;
                continue;
            }
            match self.admit(key, value, extra) {
                Some(id) => admitted.push(id),
                None => rejected += 1,
            }
        }

        tracing::debug!(
            admitted = admitted.len(),
            rejected,
            skipped,
            size = self.size(),
            limit = self.limit(),
            "bulk load finished"
        );

        let arena = &self.arena;
        admitted
            .into_iter()
            .filter_map(|id| arena.resolve(id).and_then(|slot| arena.get(slot)))
            .collect()
    }

    /// Replaces the value behind a handle and evicts from the LRU end of its
    /// generation until that generation fits its limit again.
    ///
    /// The updated entry is never evicted. Evicted pairs are returned
    /// LRU-first and counted as evictions.
    pub fn update_mru(&mut self, id: EntryId, value: V) -> Result<Vec<(K, V)>, CacheError> {
        use crate::traits::LruGeneration;

        let kind = self.entry(id).ok_or(CacheError::UnknownEntry)?.generation();
        self.generation_mut(kind).update_mru(id, value)
    }

    /// Admission check, eden insertion and cascade for an absent key.
    fn admit(&mut self, key: K, value: V, extra: X) -> Option<EntryId> {
        let weight = self
            .weigher
            .weigh(&key, &value)
            .saturating_add(self.config.entry_overhead);
        if self.is_oversized(weight) {
            self.metrics.core.record_rejection();
            tracing::debug!(weight, size = self.size(), "rejected oversized candidate");
            return None;
        }
        let id = self
            .generation_mut(GenerationKind::Eden)
            .push_new(key, value, extra, weight);
        self.cascade();
        Some(id)
    }

    /// Moves LRU entries out of eden until it fits its limit, keeping at
    /// least one entry in it. An entry goes to protected if it fits there,
    /// to probation while probation is under its limit, and is evicted
    /// otherwise.
    fn cascade(&mut self) {
        while self.generations[EDEN].size > self.generations[EDEN].limit
            && self.generations[EDEN].ring.len() > 1
        {
            let Some(slot) = self.generations[EDEN].unlink_lru(&mut self.arena) else {
                break;
            };
            let weight = self.arena.get(slot).map_or(0, CacheEntry::weight);

            let protected = &self.generations[PROTECTED];
            let probation = &self.generations[PROBATION];
            let destination = if protected.size.saturating_add(weight) <= protected.limit {
                GenerationKind::Protected
            } else if probation.size < probation.limit {
                GenerationKind::Probation
            } else {
                if let Some(entry) = self.arena.release(slot) {
                    self.index.remove(entry.key());
                    self.metrics.core.record_eviction();
                }
                tracing::trace!(
                    weight,
                    eden_size = self.generations[EDEN].size,
                    "evicted entry leaving eden"
                );
                continue;
            };
            self.generations[destination.index()].link_mru(&mut self.arena, slot);
            self.metrics.record_move(destination);

            tracing::trace!(
                to = destination.name(),
                weight,
                eden_size = self.generations[EDEN].size,
                "moved entry out of eden"
            );
        }
    }
}

impl<K, V, X, W, S> LruCache<K, V, X> for SegmentedCache<K, V, X, W, S>
where
    K: Hash + Eq + Clone,
    W: Weigher<K, V>,
    S: BuildHasher,
{
    type Entry = CacheEntry<K, V, X>;

    fn contains_key(&self, key: &K) -> bool {
        SegmentedCache::contains_key(self, key)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        SegmentedCache::get(self, key)
    }

    fn insert(&mut self, key: K, value: V, extra: X) -> Result<Option<EntryId>, CacheError> {
        SegmentedCache::insert(self, key, value, extra)
    }

    fn remove(&mut self, key: &K) -> Option<(V, X)> {
        SegmentedCache::remove(self, key)
    }

    fn len(&self) -> usize {
        SegmentedCache::len(self)
    }

    fn size(&self) -> u64 {
        SegmentedCache::size(self)
    }

    fn add_mrus<I>(&mut self, items: I) -> Vec<&Self::Entry>
    where
        I: IntoIterator<Item = (K, (V, X))>,
    {
        SegmentedCache::add_mrus(self, items)
    }

    fn age_frequencies(&mut self) {
        SegmentedCache::age_frequencies(self)
    }

    fn stats(&self) -> BTreeMap<String, f64> {
        SegmentedCache::stats(self)
    }
}

impl<K, V, X, W, S> CacheMetrics for SegmentedCache<K, V, X, W, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.stats()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

impl<K, V, X, W, S> fmt::Debug for SegmentedCache<K, V, X, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentedCache")
            .field("limit", &self.config.limit)
            .field("size", &self.size())
            .field("len", &self.arena.len())
            .field("generations", &self.generations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec;
    use std::vec::Vec;

    type ByteCache = SegmentedCache<u32, Vec<u8>>;

    fn bytes(n: usize) -> Vec<u8> {
        vec![0u8; n]
    }

    fn keys_of(cache: &ByteCache, kind: GenerationKind) -> Vec<u32> {
        cache.generation(kind).keys().copied().collect()
    }

    fn resident_weight(cache: &ByteCache) -> u64 {
        cache.entries().map(CacheEntry::weight).sum()
    }

    #[test]
    fn test_partition_of_twenty() {
        let cache = ByteCache::new(20);
        assert_eq!(cache.generation(GenerationKind::Eden).limit(), 2);
        assert_eq!(cache.generation(GenerationKind::Protected).limit(), 16);
        assert_eq!(cache.generation(GenerationKind::Probation).limit(), 2);
    }

    #[test]
    fn test_fresh_cache_is_empty() {
        let cache = ByteCache::new(20);
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.iter().count(), 0);
    }

    #[test]
    fn test_insert_then_remove() {
        let mut cache = ByteCache::new(20);
        cache.insert(1, bytes(3), ()).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&1));

        assert_eq!(cache.remove(&1), Some((bytes(3), ())));
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.remove(&1), None);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut cache = ByteCache::new(20);
        cache.insert(1, bytes(1), ()).unwrap();
        assert_eq!(cache.insert(1, bytes(1), ()), Err(CacheError::DuplicateKey));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_second_insert_promotes_first() {
        let mut cache = ByteCache::new(20);
        cache.insert(1, bytes(15), ()).unwrap();
        cache.insert(2, bytes(3), ()).unwrap();
        assert_eq!(keys_of(&cache, GenerationKind::Protected), [1]);
        assert_eq!(keys_of(&cache, GenerationKind::Eden), [2]);
        assert_eq!(cache.peek(&1).unwrap().generation(), GenerationKind::Protected);
    }

    #[test]
    fn test_oversized_eden_entry_stays() {
        let mut cache = ByteCache::new(20);
        cache.insert(1, bytes(15), ()).unwrap();
        assert_eq!(keys_of(&cache, GenerationKind::Eden), [1]);
        assert_eq!(cache.generation(GenerationKind::Eden).size(), 15);
    }

    #[test]
    fn test_insert_rejects_oversized_candidate() {
        let mut cache = ByteCache::new(20);
        assert_eq!(cache.insert(1, bytes(17), ()), Ok(None));
        assert!(cache.is_empty());
        let stats = cache.stats();
        assert_eq!(stats["rejections"], 1.0);
        assert_eq!(stats["evictions"], 0.0);
    }

    #[test]
    fn test_get_counts_hits_and_misses() {
        let mut cache = ByteCache::new(20);
        cache.insert(1, bytes(1), ()).unwrap();
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&2).is_none());

        assert_eq!(cache.peek(&1).unwrap().frequency(), 3);
        let stats = cache.stats();
        assert_eq!(stats["cache_hits"], 2.0);
        assert_eq!(stats["cache_misses"], 1.0);
        assert_eq!(stats["requests"], 3.0);
    }

    #[test]
    fn test_peek_and_contains_have_no_side_effects() {
        let mut cache = ByteCache::new(100);
        cache.insert(1, bytes(1), ()).unwrap();
        assert!(cache.contains_key(&1));
        assert_eq!(cache.peek(&1).unwrap().frequency(), 1);
        assert_eq!(cache.stats()["requests"], 0.0);
    }

    #[test]
    fn test_hit_refreshes_recency_within_generation() {
        let mut cache = ByteCache::new(100);
        cache.add_mrus((1..=3).map(|k| (k, (bytes(8), ()))));
        assert_eq!(keys_of(&cache, GenerationKind::Protected), [1, 2]);

        cache.get(&1);
        assert_eq!(keys_of(&cache, GenerationKind::Protected), [2, 1]);
        assert_eq!(cache.peek(&1).unwrap().generation(), GenerationKind::Protected);
    }

    #[test]
    fn test_age_frequencies_halves_with_floor() {
        let mut cache = ByteCache::new(20);
        cache.insert(1, bytes(1), ()).unwrap();
        for _ in 0..4 {
            cache.get(&1);
        }
        assert_eq!(cache.peek(&1).unwrap().frequency(), 5);
        cache.age_frequencies();
        assert_eq!(cache.peek(&1).unwrap().frequency(), 2);
        assert_eq!(cache.stats()["agings"], 1.0);
    }

    #[test]
    fn test_cascade_counts_promotions_and_demotions() {
        let mut cache = ByteCache::new(20);
        cache.add_mrus([(1, (bytes(15), ())), (2, (bytes(3), ())), (3, (bytes(1), ()))]);
        let stats = cache.stats();
        assert_eq!(stats["promotions"], 1.0);
        assert_eq!(stats["demotions"], 1.0);
        assert_eq!(stats["probation_size"], 3.0);
        assert_eq!(stats["len"], 3.0);
    }

    #[test]
    fn test_cascade_evicts_entry_with_nowhere_to_go() {
        let mut cache = ByteCache::new(20);
        for (key, weight) in [(1, 10), (2, 10), (3, 6), (4, 6)] {
            cache.insert(key, bytes(weight), ()).unwrap();
        }
        assert_eq!(keys_of(&cache, GenerationKind::Probation), [2]);

        cache.remove(&1);
        cache.insert(10, bytes(10), ()).unwrap();
        cache.insert(11, bytes(4), ()).unwrap();

        // Key 10 fits neither protected (12 of 16 used) nor probation (full).
        assert!(!cache.contains_key(&10));
        assert_eq!(keys_of(&cache, GenerationKind::Protected), [3, 4]);
        assert_eq!(keys_of(&cache, GenerationKind::Probation), [2]);
        assert_eq!(keys_of(&cache, GenerationKind::Eden), [11]);
        assert_eq!(cache.free_node_count(), 1);
        assert_eq!(cache.size(), resident_weight(&cache));

        let stats = cache.stats();
        assert_eq!(stats["evictions"], 1.0);
        assert_eq!(stats["demotions"], 1.0);
        assert_eq!(stats["size"], 26.0);
    }

    #[test]
    fn test_add_mrus_skips_resident_keys() {
        let mut cache = ByteCache::new(100);
        cache.insert(2, bytes(1), ()).unwrap();
        let admitted = cache.add_mrus((1..=3).map(|k| (k, (bytes(2), ()))));
        let keys: Vec<u32> = admitted.iter().map(|e| *e.key()).collect();
        assert_eq!(keys, [1, 3]);
        assert_eq!(cache.peek(&2).unwrap().weight(), 1);
    }

    #[test]
    fn test_size_matches_resident_weights() {
        let mut cache = ByteCache::new(100);
        cache.add_mrus((0..50).map(|k| (k, (bytes(k as usize), ()))));
        cache.remove(&3);
        let id = cache.entry_id(&5).unwrap();
        cache.update_mru(id, bytes(40)).unwrap();
        cache.insert(99, bytes(1), ()).unwrap();

        assert_eq!(cache.size(), resident_weight(&cache));
        assert_eq!(cache.stats()["size"], cache.size() as f64);
    }

    #[test]
    fn test_update_mru_via_handle() {
        let mut cache = ByteCache::new(100);
        let id = cache.insert(1, bytes(1), ()).unwrap().unwrap();
        let evicted = cache.update_mru(id, bytes(2)).unwrap();
        assert!(evicted.is_empty());
        assert_eq!(cache.get(&1), Some(&bytes(2)));

        cache.remove(&1);
        assert_eq!(cache.update_mru(id, bytes(2)), Err(CacheError::UnknownEntry));
    }

    #[test]
    fn test_entry_overhead_is_charged() {
        let config = SegmentedCacheConfig::new(100).with_entry_overhead(4);
        let mut cache: ByteCache = SegmentedCache::init(config, ValueLen, None).unwrap();
        cache.insert(1, bytes(3), ()).unwrap();
        assert_eq!(cache.peek(&1).unwrap().weight(), 7);
        assert_eq!(cache.size(), 7);
    }

    #[test]
    fn test_generation_by_ordinal() {
        let cache = ByteCache::new(20);
        assert_eq!(
            cache.generation_by_ordinal(1).unwrap().kind(),
            GenerationKind::Probation
        );
        assert_eq!(
            cache.generation_by_ordinal(3).unwrap().kind(),
            GenerationKind::Eden
        );
        assert_eq!(
            cache.generation_by_ordinal(0).unwrap_err(),
            CacheError::InvalidGeneration(0)
        );
        assert!(cache.generation_by_ordinal(4).is_err());
    }

    #[test]
    fn test_snapshot_orders_most_valuable_first() {
        let mut cache: SegmentedCache<u32, Vec<u8>, u64> = SegmentedCache::new(20);
        cache.add_mrus([
            (1, (bytes(15), 10)),
            (2, (bytes(3), 20)),
            (3, (bytes(1), 30)),
        ]);
        assert_eq!(cache.snapshot(), [(1, 10), (3, 30), (2, 20)]);
    }

    #[test]
    fn test_iter_walks_probation_protected_eden() {
        let mut cache = ByteCache::new(20);
        cache.add_mrus([(1, (bytes(15), ())), (2, (bytes(3), ())), (3, (bytes(1), ()))]);
        let keys: Vec<u32> = cache.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [2, 1, 3]);
    }

    #[test]
    fn test_clear_recycles_every_slot() {
        let mut cache = ByteCache::new(100);
        let id = cache.insert(1, bytes(1), ()).unwrap().unwrap();
        cache.insert(2, bytes(1), ()).unwrap();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.free_node_count(), 2);
        assert!(cache.entry(id).is_none());

        cache.insert(3, bytes(1), ()).unwrap();
        assert_eq!(cache.free_node_count(), 1);
    }

    #[test]
    fn test_generic_lru_cache_usage() {
        fn load<C: LruCache<u32, Vec<u8>, ()>>(cache: &mut C) -> usize {
            cache.add_mrus((0..4).map(|k| (k, (vec![1u8; 2], ())))).len()
        }
        let mut cache = ByteCache::new(100);
        assert_eq!(load(&mut cache), 4);
        assert_eq!(LruCache::len(&cache), 4);
        assert_eq!(cache.algorithm_name(), "SEGMENTED");
    }
}
