//! Generations
//!
//! A generation is one weight-bounded recency list. The cache owns three of
//! them, all threaded through the same node arena, and hands out two kinds of
//! views:
//!
//! - [`Generation`]: a shared view for inspection and iteration
//! - [`GenerationMut`]: an exclusive view implementing
//!   [`LruGeneration`], for direct manipulation of a single generation
//!
//! Both borrow the cache, so a generation cannot change while it is being
//! iterated.
//!
//! ```
//! use gencache::{GenerationKind, SegmentedCache};
//! use gencache::traits::LruGeneration;
//!
//! let mut cache: SegmentedCache<u32, Vec<u8>> = SegmentedCache::new(100);
//! let id = cache
//!     .generation_mut(GenerationKind::Protected)
//!     .add_mru(1, vec![0; 10], ())
//!     .unwrap();
//!
//! let evicted = cache
//!     .generation_mut(GenerationKind::Protected)
//!     .update_mru(id, vec![0; 12])
//!     .unwrap();
//! assert!(evicted.is_empty());
//! assert_eq!(cache.generation(GenerationKind::Protected).size(), 12);
//! ```

extern crate alloc;

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::list::{EntryId, NodeArena, Ring};
use crate::meta::GenerationKind;
use crate::metrics::SegmentedCacheMetrics;
use crate::traits::LruGeneration;
use crate::weight::Weigher;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Bookkeeping of one generation inside the cache.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GenerationState {
    pub(crate) kind: GenerationKind,
    pub(crate) ring: Ring,
    pub(crate) size: u64,
    pub(crate) limit: u64,
}

impl GenerationState {
    pub(crate) const fn new(kind: GenerationKind, limit: u64) -> Self {
        Self {
            kind,
            ring: Ring::new(),
            size: 0,
            limit,
        }
    }

    /// Capacity left before the limit, saturating at zero.
    #[inline]
    pub(crate) fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.size)
    }

    /// Links an occupied, unlinked slot at the MRU end and charges its weight.
    pub(crate) fn link_mru<K, V, X>(
        &mut self,
        arena: &mut NodeArena<CacheEntry<K, V, X>>,
        slot: usize,
    ) {
        if let Some(entry) = arena.get_mut(slot) {
            entry.set_generation(self.kind);
            self.size += entry.weight();
        }
        self.ring.push_front(arena, slot);
    }

    /// Unlinks a slot of this generation and refunds its weight. The slot
    /// stays occupied.
    pub(crate) fn unlink<K, V, X>(&mut self, arena: &mut NodeArena<CacheEntry<K, V, X>>, slot: usize) {
        self.ring.unlink(arena, slot);
        if let Some(entry) = arena.get(slot) {
            self.size = self.size.saturating_sub(entry.weight());
        }
    }

    /// Unlinks the LRU slot, refunding its weight.
    pub(crate) fn unlink_lru<K, V, X>(
        &mut self,
        arena: &mut NodeArena<CacheEntry<K, V, X>>,
    ) -> Option<usize> {
        let slot = self.ring.pop_lru(arena)?;
        if let Some(entry) = arena.get(slot) {
            self.size = self.size.saturating_sub(entry.weight());
        }
        Some(slot)
    }

    pub(crate) fn clear(&mut self) {
        self.ring.clear();
        self.size = 0;
    }
}

/// Shared view of one generation.
pub struct Generation<'a, K, V, X> {
    pub(crate) state: &'a GenerationState,
    pub(crate) arena: &'a NodeArena<CacheEntry<K, V, X>>,
}

impl<'a, K, V, X> Generation<'a, K, V, X> {
    /// Which generation this is.
    pub fn kind(&self) -> GenerationKind {
        self.state.kind
    }

    /// Resident entries.
    pub fn len(&self) -> usize {
        self.state.ring.len()
    }

    /// `true` when no entry is resident.
    pub fn is_empty(&self) -> bool {
        self.state.ring.is_empty()
    }

    /// Resident weight. May exceed [`limit`](Self::limit) for protected and
    /// probation, which absorb eden overflow without evicting.
    pub fn size(&self) -> u64 {
        self.state.size
    }

    /// Weight limit.
    pub fn limit(&self) -> u64 {
        self.state.limit
    }

    /// Entries from the LRU end to the MRU end.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a CacheEntry<K, V, X>> + 'a {
        self.state.ring.iter(self.arena).map(|(_, entry)| entry)
    }

    /// Entries from the MRU end to the LRU end.
    pub fn iter_mru(&self) -> impl ExactSizeIterator<Item = &'a CacheEntry<K, V, X>> + 'a {
        self.state.ring.iter_mru(self.arena).map(|(_, entry)| entry)
    }

    /// `(key, extra)` pairs from the LRU end to the MRU end.
    pub fn items(&self) -> impl ExactSizeIterator<Item = (&'a K, &'a X)> + 'a {
        self.iter().map(|entry| (entry.key(), entry.extra()))
    }

    /// Keys from the LRU end to the MRU end.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &'a K> + 'a {
        self.iter().map(|entry| entry.key())
    }

    /// Least recently used entry.
    pub fn lru(&self) -> Option<&'a CacheEntry<K, V, X>> {
        self.state.ring.lru().and_then(|slot| self.arena.get(slot))
    }
}

impl<K, V, X> fmt::Debug for Generation<'_, K, V, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("kind", &self.state.kind)
            .field("len", &self.len())
            .field("size", &self.state.size)
            .field("limit", &self.state.limit)
            .finish()
    }
}

/// Exclusive view of one generation.
///
/// Entries added here skip the cache's admission check and eden cascade; they
/// land directly in this generation. The key index and statistics of the
/// owning cache are kept in sync.
pub struct GenerationMut<'a, K, V, X, W, S> {
    pub(crate) state: &'a mut GenerationState,
    pub(crate) arena: &'a mut NodeArena<CacheEntry<K, V, X>>,
    pub(crate) index: &'a mut HashMap<K, usize, S>,
    pub(crate) metrics: &'a mut SegmentedCacheMetrics,
    pub(crate) weigher: &'a W,
    pub(crate) overhead: u64,
}

impl<K, V, X, W, S> GenerationMut<'_, K, V, X, W, S>
where
    K: Hash + Eq + Clone,
    W: Weigher<K, V>,
    S: BuildHasher,
{
    /// Weight charged for a pair, overhead included.
    #[inline]
    pub(crate) fn weigh(&self, key: &K, value: &V) -> u64 {
        self.weigher.weigh(key, value).saturating_add(self.overhead)
    }

    /// Stores a new entry of known weight at the MRU end. The caller has
    /// already checked that the key is absent.
    pub(crate) fn push_new(&mut self, key: K, value: V, extra: X, weight: u64) -> EntryId {
        let id = self
            .arena
            .alloc(CacheEntry::new(key.clone(), value, extra, weight, self.state.kind));
        self.state.link_mru(self.arena, id.index());
        self.index.insert(key, id.index());
        self.metrics.core.record_write(weight);
        id
    }

    /// Resolves a handle to a slot linked into this generation.
    fn resolve(&self, id: EntryId) -> Result<usize, CacheError> {
        self.arena
            .resolve(id)
            .filter(|&slot| {
                self.arena
                    .get(slot)
                    .is_some_and(|entry| entry.generation() == self.state.kind)
            })
            .ok_or(CacheError::UnknownEntry)
    }

    /// Counts a hit on a slot known to be in this generation.
    pub(crate) fn hit_slot(&mut self, slot: usize) {
        if let Some(entry) = self.arena.get_mut(slot) {
            entry.record_hit();
        }
        self.state.ring.move_to_front(self.arena, slot);
        self.metrics.record_hit(self.state.kind);
    }
}

impl<K, V, X, W, S> LruGeneration<K, V, X> for GenerationMut<'_, K, V, X, W, S>
where
    K: Hash + Eq + Clone,
    W: Weigher<K, V>,
    S: BuildHasher,
{
    fn kind(&self) -> GenerationKind {
        self.state.kind
    }

    fn len(&self) -> usize {
        self.state.ring.len()
    }

    fn size(&self) -> u64 {
        self.state.size
    }

    fn limit(&self) -> u64 {
        self.state.limit
    }

    fn add_mru(&mut self, key: K, value: V, extra: X) -> Result<EntryId, CacheError> {
        if self.index.contains_key(&key) {
            return Err(CacheError::DuplicateKey);
        }
        let weight = self.weigh(&key, &value);
        Ok(self.push_new(key, value, extra, weight))
    }

    fn on_hit(&mut self, id: EntryId) -> Result<(), CacheError> {
        let slot = self.resolve(id)?;
        self.hit_slot(slot);
        Ok(())
    }

    fn update_mru(&mut self, id: EntryId, value: V) -> Result<Vec<(K, V)>, CacheError> {
        let slot = self.resolve(id)?;

        let entry = self.arena.get(slot).ok_or(CacheError::UnknownEntry)?;
        let weight = self.weigh(entry.key(), &value);
        let old_weight = entry.weight();
        if let Some(entry) = self.arena.get_mut(slot) {
            entry.replace_value(value, weight);
        }
        self.state.size = self.state.size.saturating_sub(old_weight) + weight;
        self.metrics.core.record_write(weight);
        self.state.ring.move_to_front(self.arena, slot);

        // The updated entry sits at the MRU end, so it is never the LRU while
        // another entry remains.
        let mut evicted = Vec::new();
        while self.state.size > self.state.limit && self.state.ring.len() > 1 {
            let Some(victim) = self.state.unlink_lru(self.arena) else {
                break;
            };
            let Some(entry) = self.arena.release(victim) else {
                continue;
            };
            self.metrics.core.record_eviction();
            let (key, value, _) = entry.into_parts();
            self.index.remove(&key);
            evicted.push((key, value));
        }

        if !evicted.is_empty() {
            tracing::debug!(
                generation = self.state.kind.name(),
                evicted = evicted.len(),
                size = self.state.size,
                limit = self.state.limit,
                "update_mru evicted entries"
            );
        }
        Ok(evicted)
    }
}

impl<K, V, X, W, S> fmt::Debug for GenerationMut<'_, K, V, X, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationMut")
            .field("kind", &self.state.kind)
            .field("len", &self.state.ring.len())
            .field("size", &self.state.size)
            .field("limit", &self.state.limit)
            .finish()
    }
}
