//! Error types for inkmap-core operations.

use crate::color::CmykColor;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or decoding color tables.
///
/// Every variant aborts the in-progress batch; the core performs no retries
/// and no silent recovery.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A Lab tuple did not contain exactly three components.
    #[error("expected 3 Lab components, got {len}")]
    InvalidColorTuple {
        /// Number of components actually supplied.
        len: usize,
    },

    /// A Lab component was outside its valid domain.
    ///
    /// L* must lie in [0, 100], a* and b* in [-128, 127].
    #[error("value {value} not in valid L*a*b* range (L*: 0..100, a*/b*: -128..127)")]
    InvalidLabComponent {
        /// The offending component value.
        value: f64,
    },

    /// A canonical color string was not produced by this crate's encoder.
    #[error("malformed color encoding: {input:?}")]
    MalformedColorEncoding {
        /// The string that failed to decode.
        input: String,
    },

    /// The working table no longer matches a colliding color's candidate
    /// cursor. Indicates the table was mutated outside the resolution loop.
    #[error("candidate list out of sync with working table for {cmyk}")]
    CandidateListDesync {
        /// The CMYK color whose cursor desynchronized.
        cmyk: CmykColor,
    },

    /// A colliding color ran out of candidate values before finding a free
    /// one. The search radius is not escalated automatically.
    #[error("candidate list exhausted for {cmyk} before a free value was found")]
    CandidateExhaustion {
        /// The CMYK color that exhausted its candidates.
        cmyk: CmykColor,
    },
}
