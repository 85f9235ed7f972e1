#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Quick Reference
//!
//! | Operation | Effect | Time |
//! |-----------|--------|------|
//! | [`SegmentedCache::insert`] | Admission check, eden insert, cascade | O(1) amortized |
//! | [`SegmentedCache::add_mrus`] | Bulk insert in value order | O(n) |
//! | [`SegmentedCache::get`] | Hit: frequency + 1, refresh recency | O(1) |
//! | [`SegmentedCache::peek`] | Read without side effects | O(1) |
//! | [`SegmentedCache::remove`] | Drop one key | O(1) |
//! | [`SegmentedCache::update_mru`] | Replace value, evict within its generation | O(evicted) |
//! | [`SegmentedCache::age_frequencies`] | Halve every frequency | O(n) |
//! | [`SegmentedCache::snapshot`] | `(key, extra)` pairs, most valuable first | O(n) |
//!
//! ## Persist and Reload
//!
//! ```rust
//! use gencache::SegmentedCache;
//!
//! // Values are fetched again from the backing store on reload; the extra tag
//! // records the version they were read at.
//! let store = |key: &u32| vec![0u8; (*key as usize % 7) + 1];
//!
//! let mut cache: SegmentedCache<u32, Vec<u8>, u64> = SegmentedCache::new(64);
//! for key in 0..32 {
//!     cache.insert(key, store(&key), 1).unwrap();
//! }
//! let saved = cache.snapshot();
//!
//! let mut reloaded: SegmentedCache<u32, Vec<u8>, u64> = SegmentedCache::new(64);
//! let admitted = reloaded.add_mrus(
//!     saved.iter().map(|(key, tx)| (*key, (store(key), *tx))),
//! );
//! assert!(admitted.len() <= cache.len());
//! assert!(reloaded.contains_key(&saved[0].0));
//! ```
//!
//! ## Modules
//!
//! - [`segmented`]: The three-generation cache
//! - [`generation`]: Shared and exclusive views of one generation
//! - [`entry`]: The resident entry record
//! - [`weight`]: Pluggable entry weighing
//! - [`config`]: Budget and partition configuration
//! - [`metrics`]: Counters and occupancy reporting
//! - [`traits`]: Capability traits for entries, generations and caches
//! - [`error`]: The crate error type

#![no_std]

#[cfg(any(feature = "std", not(feature = "hashbrown")))]
extern crate std;

/// Crate error type.
pub mod error;

/// Generation identifiers and ordinal conversion.
pub mod meta;

/// Arena-backed recency lists shared by all generations.
///
/// Internal infrastructure: slots are addressed by index and linked through
/// explicit `prev`/`next` indices.
pub(crate) mod list;

/// The resident cache entry.
pub mod entry;

/// Entry weighing.
pub mod weight;

/// Cache configuration.
pub mod config;

/// Cache metrics system.
///
/// Counters for hits, misses, evictions and rejections plus per-generation
/// occupancy, reported in deterministic key order.
pub mod metrics;

/// Capability traits.
pub mod traits;

/// Generation views.
pub mod generation;

/// The three-generation segmented cache.
pub mod segmented;

pub use config::SegmentedCacheConfig;
pub use entry::CacheEntry;
pub use error::CacheError;
pub use generation::{Generation, GenerationMut};
pub use list::EntryId;
pub use meta::GenerationKind;
pub use metrics::CacheMetrics;
pub use segmented::SegmentedCache;
pub use traits::{LruCache, LruEntry, LruGeneration};
pub use weight::{ValueLen, Weigher, WeightFns};
