//! Generation Tags
//!
//! Every resident entry records which generation currently owns its list
//! node. The tag is an enum so a generation that does not exist cannot be
//! named; the only fallible path is converting a numeric ordinal coming from
//! outside the crate.
//!
//! | Ordinal | Generation | Role |
//! |---------|------------|------|
//! | 1 | [`GenerationKind::Probation`] | Terminal cold tier, last stop before eviction |
//! | 2 | [`GenerationKind::Protected`] | Hot tier for entries promoted out of eden |
//! | 3 | [`GenerationKind::Eden`] | Admission window for brand-new keys |
//!
//! ```
//! use gencache::{CacheError, GenerationKind};
//!
//! assert_eq!(GenerationKind::try_from(3), Ok(GenerationKind::Eden));
//! assert_eq!(GenerationKind::try_from(0), Err(CacheError::InvalidGeneration(0)));
//! ```

use crate::error::CacheError;
use core::fmt;

/// Identifies one of the three generations of a
/// [`SegmentedCache`](crate::SegmentedCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenerationKind {
    /// Small terminal tier for entries demoted out of eden once protected is full.
    Probation = 1,
    /// Large tier for entries promoted out of eden while it has room.
    Protected = 2,
    /// Small admission window receiving every newly inserted key.
    Eden = 3,
}

impl GenerationKind {
    /// All generations in ordinal order.
    pub const ALL: [GenerationKind; 3] = [
        GenerationKind::Probation,
        GenerationKind::Protected,
        GenerationKind::Eden,
    ];

    /// The 1-based ordinal of this generation.
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Zero-based slot used to index per-generation state.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize - 1
    }

    /// Lower-case name, used as the prefix of per-generation metric keys.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            GenerationKind::Probation => "probation",
            GenerationKind::Protected => "protected",
            GenerationKind::Eden => "eden",
        }
    }
}

impl TryFrom<u8> for GenerationKind {
    type Error = CacheError;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            1 => Ok(GenerationKind::Probation),
            2 => Ok(GenerationKind::Protected),
            3 => Ok(GenerationKind::Eden),
            other => Err(CacheError::InvalidGeneration(other)),
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
