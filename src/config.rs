//! Cache Configuration
//!
//! [`SegmentedCacheConfig`] describes the weight budget of a cache and how it
//! is partitioned across the three generations. Fields are public so a config
//! can be written as a struct literal; [`SegmentedCacheConfig::new`] fills in
//! the default partition.
//!
//! # Partitioning
//!
//! ```text
//! eden      = limit * eden_percent / 100
//! probation = limit * probation_percent / 100
//! protected = limit - eden - probation
//! ```
//!
//! With the defaults (10 % eden, 10 % probation) a budget of 20 becomes
//! 2 / 16 / 2 and a budget of 100 becomes 10 / 80 / 10.
//!
//! # Sizing Guidelines
//!
//! `limit` is expressed in the same units the weigher produces. With the
//! default [`ValueLen`](crate::weight::ValueLen) weigher that is bytes of
//! value payload; add `entry_overhead` to charge for the per-entry
//! bookkeeping as well:
//!
//! ```text
//! resident memory ≈ limit + len × (size_of entry + index slot)
//! ```
//!
//! # Examples
//!
//! ```
//! use gencache::config::SegmentedCacheConfig;
//!
//! let config = SegmentedCacheConfig {
//!     limit: 64 * 1024 * 1024,
//!     eden_percent: 5,
//!     probation_percent: 15,
//!     entry_overhead: 48,
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.eden_limit(), 64 * 1024 * 1024 * 5 / 100);
//! ```

use crate::error::CacheError;
use crate::meta::GenerationKind;

/// Configuration for a [`SegmentedCache`](crate::SegmentedCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentedCacheConfig {
    /// Total weight budget across all generations.
    pub limit: u64,
    /// Share of `limit` given to the eden admission window, in percent.
    pub eden_percent: u8,
    /// Share of `limit` given to the probation tier, in percent.
    pub probation_percent: u8,
    /// Fixed weight added to every entry on top of the weigher's result.
    pub entry_overhead: u64,
}

impl SegmentedCacheConfig {
    /// Default share of the budget for eden.
    pub const DEFAULT_EDEN_PERCENT: u8 = 10;
    /// Default share of the budget for probation.
    pub const DEFAULT_PROBATION_PERCENT: u8 = 10;

    /// A config with the default partition and no per-entry overhead.
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            eden_percent: Self::DEFAULT_EDEN_PERCENT,
            probation_percent: Self::DEFAULT_PROBATION_PERCENT,
            entry_overhead: 0,
        }
    }

    /// Sets the per-entry overhead.
    #[must_use]
    pub const fn with_entry_overhead(mut self, entry_overhead: u64) -> Self {
        self.entry_overhead = entry_overhead;
        self
    }

    /// Checks that the partition leaves room for the protected generation.
    pub fn validate(&self) -> Result<(), CacheError> {
        if u16::from(self.eden_percent) + u16::from(self.probation_percent) >= 100 {
            return Err(CacheError::InvalidConfig(
                "eden_percent + probation_percent must be below 100",
            ));
        }
        Ok(())
    }

    /// Weight limit of the eden generation.
    pub fn eden_limit(&self) -> u64 {
        percent_of(self.limit, self.eden_percent)
    }

    /// Weight limit of the probation generation.
    pub fn probation_limit(&self) -> u64 {
        percent_of(self.limit, self.probation_percent)
    }

    /// Weight limit of the protected generation: whatever eden and probation
    /// do not take.
    pub fn protected_limit(&self) -> u64 {
        self.limit
            .saturating_sub(self.eden_limit())
            .saturating_sub(self.probation_limit())
    }

    /// Weight limit of the given generation.
    pub fn generation_limit(&self, kind: GenerationKind) -> u64 {
        match kind {
            GenerationKind::Eden => self.eden_limit(),
            GenerationKind::Protected => self.protected_limit(),
            GenerationKind::Probation => self.probation_limit(),
        }
    }
}

/// `value * percent / 100` without overflowing for budgets near `u64::MAX`.
fn percent_of(value: u64, percent: u8) -> u64 {
    let scaled = u128::from(value) * u128::from(percent) / 100;
    // percent <= 255 keeps the quotient below 2.55 * u64::MAX; validate() caps it at 99.
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
