//! Cache Metrics System
//!
//! Counters are kept in plain structs and reported through the
//! [`CacheMetrics`] trait as a `BTreeMap<String, f64>`. A `BTreeMap` keeps the
//! key order deterministic, so two reports can be diffed or asserted on
//! directly.
//!
//! [`CoreCacheMetrics`] holds what any weighted cache tracks: lookups, hits,
//! evictions, rejected candidates and weight written. Resident weight is not
//! counted here; the cache fills it in from its generations when it reports.
//! [`SegmentedCacheMetrics`] adds the generation-level movement counters.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod segmented;

pub use segmented::SegmentedCacheMetrics;

/// Counters common to weighted caches.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Lookups made through `get`/`get_entry`.
    pub requests: u64,

    /// Lookups that found a resident entry.
    pub cache_hits: u64,

    /// Admitted entries dropped for lack of room, by the eden cascade or by
    /// an update.
    pub evictions: u64,

    /// Candidates refused by the admission check because no generation had
    /// room for them. Never counted as evictions.
    pub rejections: u64,

    /// Total weight admitted into the cache, including updates.
    pub weight_written: u64,

    /// Weight resident when the report was taken.
    pub size: u64,

    /// Total weight budget.
    pub limit: u64,
}

impl CoreCacheMetrics {
    /// Empty counters for a cache with the given budget.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Records a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a value of the given weight written into the cache, either a
    /// new entry or an update.
    pub fn record_write(&mut self, weight: u64) {
        self.weight_written += weight;
    }

    /// Records an admitted entry leaving the cache for lack of room.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records a candidate turned away by the admission check.
    pub fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    /// Misses derived from requests and hits.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Share of lookups that hit, between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Share of lookups that missed, between 0.0 and 1.0.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Resident weight relative to the budget. Can exceed 1.0 while
    /// protected or probation hold more than their share.
    pub fn utilization(&self) -> f64 {
        if self.limit > 0 {
            self.size as f64 / self.limit as f64
        } else {
            0.0
        }
    }

    /// Converts the counters into a report map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("rejections".to_string(), self.rejections as f64);
        metrics.insert("requests".to_string(), self.requests as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics.insert("size".to_string(), self.size as f64);
        metrics.insert("limit".to_string(), self.limit as f64);
        metrics.insert("utilization".to_string(), self.utilization());
        metrics.insert("weight_written".to_string(), self.weight_written as f64);

        metrics
    }
}

/// Uniform access to a cache's counters.
pub trait CacheMetrics {
    /// Every metric as a name/value pair, sorted by name.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short identifier of the eviction policy.
    fn algorithm_name(&self) -> &'static str;
}
