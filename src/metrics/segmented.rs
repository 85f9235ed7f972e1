//! Segmented Cache Metrics
//!
//! Metrics specific to the three-generation cache: per-generation occupancy
//! and the movement counters of the eden-overflow cascade.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use crate::meta::GenerationKind;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};

/// Occupancy of one generation at the time of the last update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStats {
    /// Resident entries.
    pub len: u64,
    /// Resident weight.
    pub size: u64,
    /// Weight limit.
    pub limit: u64,
}

impl GenerationStats {
    /// Resident weight relative to the limit.
    pub fn utilization(&self) -> f64 {
        if self.limit > 0 {
            self.size as f64 / self.limit as f64
        } else {
            0.0
        }
    }
}

/// Segmented cache metrics (extends [`CoreCacheMetrics`]).
#[derive(Debug, Clone)]
pub struct SegmentedCacheMetrics {
    /// Core metrics common to all caches.
    pub core: CoreCacheMetrics,

    /// Occupancy per generation, indexed by ordinal - 1.
    pub generations: [GenerationStats; 3],

    /// Entries moved from eden into protected.
    pub promotions: u64,

    /// Entries moved from eden into probation.
    pub demotions: u64,

    /// Completed `age_frequencies` passes.
    pub agings: u64,

    /// Hits per generation, indexed by ordinal - 1.
    pub generation_hits: [u64; 3],
}

impl SegmentedCacheMetrics {
    /// Empty counters for a cache with the given total budget and
    /// per-generation limits.
    pub fn new(limit: u64, generation_limits: [u64; 3]) -> Self {
        let mut generations = [GenerationStats::default(); 3];
        for (stats, limit) in generations.iter_mut().zip(generation_limits) {
            stats.limit = limit;
        }
        Self {
            core: CoreCacheMetrics::new(limit),
            generations,
            promotions: 0,
            demotions: 0,
            agings: 0,
            generation_hits: [0; 3],
        }
    }

    /// Records a hit served by the given generation.
    pub fn record_hit(&mut self, kind: GenerationKind) {
        self.core.record_hit();
        self.generation_hits[kind.index()] += 1;
    }

    /// Records a cascade move out of eden.
    pub fn record_move(&mut self, destination: GenerationKind) {
        match destination {
            GenerationKind::Protected => self.promotions += 1,
            GenerationKind::Probation => self.demotions += 1,
            GenerationKind::Eden => {}
        }
    }

    /// Records an aging pass.
    pub fn record_aging(&mut self) {
        self.agings += 1;
    }

    /// Refreshes the occupancy of one generation and the resident total.
    pub fn update_generation(&mut self, kind: GenerationKind, len: usize, size: u64) {
        let stats = &mut self.generations[kind.index()];
        stats.len = len as u64;
        stats.size = size;
        self.core.size = self.generations.iter().map(|stats| stats.size).sum();
    }

    /// Occupancy of one generation.
    pub fn generation(&self, kind: GenerationKind) -> &GenerationStats {
        &self.generations[kind.index()]
    }

    /// Share of hits served by protected.
    pub fn protection_ratio(&self) -> f64 {
        if self.core.cache_hits > 0 {
            self.generation_hits[GenerationKind::Protected.index()] as f64
                / self.core.cache_hits as f64
        } else {
            0.0
        }
    }

    /// Converts the counters into a report map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        let mut len = 0;
        for kind in GenerationKind::ALL {
            let stats = self.generation(kind);
            let name = kind.name();
            metrics.insert(format!("{name}_len"), stats.len as f64);
            metrics.insert(format!("{name}_size"), stats.size as f64);
            metrics.insert(format!("{name}_limit"), stats.limit as f64);
            metrics.insert(format!("{name}_utilization"), stats.utilization());
            metrics.insert(
                format!("{name}_hits"),
                self.generation_hits[kind.index()] as f64,
            );
            len += stats.len;
        }
        metrics.insert("len".to_string(), len as f64);

        metrics.insert("promotions".to_string(), self.promotions as f64);
        metrics.insert("demotions".to_string(), self.demotions as f64);
        metrics.insert("agings".to_string(), self.agings as f64);
        metrics.insert("protection_ratio".to_string(), self.protection_ratio());

        metrics
    }
}

impl CacheMetrics for SegmentedCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "SEGMENTED"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_keys_present() {
        let mut metrics = SegmentedCacheMetrics::new(20, [2, 16, 2]);
        metrics.update_generation(GenerationKind::Protected, 1, 15);
        metrics.update_generation(GenerationKind::Eden, 1, 1);

        let report = metrics.to_btreemap();
        assert_eq!(report["protected_limit"], 16.0);
        assert_eq!(report["protected_size"], 15.0);
        assert_eq!(report["eden_len"], 1.0);
        assert_eq!(report["probation_limit"], 2.0);
        assert_eq!(report["len"], 2.0);
        assert_eq!(report["size"], 16.0);
        assert_eq!(report["limit"], 20.0);
    }

    #[test]
    fn test_moves_split_by_destination() {
        let mut metrics = SegmentedCacheMetrics::new(20, [2, 16, 2]);
        metrics.record_move(GenerationKind::Protected);
        metrics.record_move(GenerationKind::Protected);
        metrics.record_move(GenerationKind::Probation);
        assert_eq!(metrics.promotions, 2);
        assert_eq!(metrics.demotions, 1);
    }

    #[test]
    fn test_hits_by_generation() {
        let mut metrics = SegmentedCacheMetrics::new(20, [2, 16, 2]);
        metrics.record_hit(GenerationKind::Protected);
        metrics.record_hit(GenerationKind::Eden);
        assert_eq!(metrics.core.cache_hits, 2);
        assert_eq!(metrics.protection_ratio(), 0.5);
        assert_eq!(metrics.algorithm_name(), "SEGMENTED");
    }
}
