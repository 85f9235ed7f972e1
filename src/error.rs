//! Error type shared by every fallible cache operation.
//!
//! Lookups that find nothing and deletes of absent keys are not errors; they
//! return `None`. The variants here signal contract violations at the call
//! site: inserting a key twice, naming a generation that does not exist, or
//! using an [`EntryId`](crate::EntryId) whose node slot has been released.

use thiserror::Error;

/// Errors returned by [`SegmentedCache`](crate::SegmentedCache) and its
/// generation views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The key is already resident. Callers remove the old entry first or use
    /// `update_mru` on its handle.
    #[error("key is already present in the cache")]
    DuplicateKey,

    /// A generation ordinal outside `1..=3` was supplied.
    #[error("generation {0} does not exist (valid generations are 1..=3)")]
    InvalidGeneration(u8),

    /// The entry handle is stale (its entry was evicted or removed) or does
    /// not belong to the generation it was passed to.
    #[error("entry handle does not refer to a resident entry of this generation")]
    UnknownEntry,

    /// The configuration cannot partition the weight budget.
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(&'static str),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_invalid_generation_names_ordinal() {
        let err = CacheError::InvalidGeneration(0);
        assert_eq!(
            err.to_string(),
            "generation 0 does not exist (valid generations are 1..=3)"
        );
    }

    #[test]
    fn test_invalid_config_carries_reason() {
        let err = CacheError::InvalidConfig("eden_percent + probation_percent must be below 100");
        assert!(err.to_string().contains("eden_percent"));
    }
}
