//! Errors raised while constructing a sketch.

use thiserror::Error;

/// A configuration error. Every runtime operation on a sketch is total, so construction is the
/// only place one of these can surface.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// The bloom filter was asked for a bit array of length zero.
    #[error("bit count must be greater than zero")]
    ZeroBitCount,

    /// The bloom filter was asked to use zero hash functions.
    #[error("hasher count must be greater than zero")]
    ZeroHasherCount,

    /// The bloom filter was sized for zero expected items.
    #[error("expected item count must be greater than zero")]
    ZeroItemCount,

    /// The target false positive probability is not in the open interval (0, 1).
    #[error("invalid false positive probability: {fpp} (must be in (0, 1))")]
    InvalidFalsePositiveRate {
        /// The rejected probability.
        fpp: f64,
    },

    /// The HyperLogLog precision is outside of the supported range.
    #[error("precision {precision} out of range (must be between 4 and 16)")]
    PrecisionOutOfRange {
        /// The rejected precision.
        precision: u8,
    },
}

/// Result type for sketch construction.
pub type Result<T> = std::result::Result<T, Error>;
