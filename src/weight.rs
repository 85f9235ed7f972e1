//! Entry Weighing
//!
//! Capacity is accounted in weight, not in entry count. A [`Weigher`] turns a
//! key/value pair into the number of capacity units it occupies; the cache
//! adds its configured per-entry overhead on top of that.
//!
//! | Weigher | Weight |
//! |---------|--------|
//! | [`ValueLen`] | `value.as_ref().len()` (the default) |
//! | [`WeightFns`] | `key_weight(key) + value_weight(value)` |
//!
//! ```
//! use gencache::weight::{ValueLen, Weigher, WeightFns};
//!
//! assert_eq!(ValueLen.weigh(&1u64, &b"abc".to_vec()), 3);
//!
//! let by_len = WeightFns::new(|k: &&str| k.len() as u64, |v: &String| v.len() as u64);
//! assert_eq!(by_len.weigh(&"key", &"value".to_string()), 8);
//! ```

use core::fmt;

/// Computes the capacity units a key/value pair occupies.
pub trait Weigher<K, V> {
    /// Weight of the pair, excluding the cache's per-entry overhead.
    fn weigh(&self, key: &K, value: &V) -> u64;
}

/// Weighs a value by its byte length. Keys weigh nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueLen;

impl<K, V: AsRef<[u8]>> Weigher<K, V> for ValueLen {
    #[inline]
    fn weigh(&self, _key: &K, value: &V) -> u64 {
        value.as_ref().len() as u64
    }
}

/// Weighs with separate host-supplied functions for the key and the value.
#[derive(Clone, Copy)]
pub struct WeightFns<KF, VF> {
    key_weight: KF,
    value_weight: VF,
}

impl<KF, VF> WeightFns<KF, VF> {
    /// Combines a key weight function and a value weight function.
    pub fn new(key_weight: KF, value_weight: VF) -> Self {
        Self {
            key_weight,
            value_weight,
        }
    }
}

impl<K, V, KF, VF> Weigher<K, V> for WeightFns<KF, VF>
where
    KF: Fn(&K) -> u64,
    VF: Fn(&V) -> u64,
{
    #[inline]
    fn weigh(&self, key: &K, value: &V) -> u64 {
        (self.key_weight)(key).saturating_add((self.value_weight)(value))
    }
}

impl<KF, VF> fmt::Debug for WeightFns<KF, VF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightFns").finish_non_exhaustive()
    }
}
