//! Error taxonomy for table search, interpolation and sample storage.
//!
//! Every fallible operation in this crate returns [`SamplingError`]. None of
//! the variants are recoverable inside the library: a bad interpolation is
//! numerically meaningless, so it is handed straight back to the caller
//! instead of being turned into a plausible-looking float.

use thiserror::Error;

/// Errors from searching, interpolating, or storing sampled data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("Search or retrieval on an empty sequence")]
    EmptySequence,

    #[error("Index {index} is out of range for {len} samples")]
    OutOfRange { index: usize, len: usize },

    #[error("Interpolation needs {required} samples but only {available} are stored")]
    InsufficientSamples { available: usize, required: usize },

    #[error("Duplicate abscissa {x} at window positions {first} and {second}")]
    DuplicateAbscissa { first: usize, second: usize, x: f64 },

    #[error("Expected {expected} dependent values, got {got}")]
    ChannelCountMismatch { expected: usize, got: usize },

    #[error("Channel {channel} does not exist (series has {num_channels} channels)")]
    ChannelOutOfRange { channel: usize, num_channels: usize },

    #[error("Column '{column}' has {got} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Interpolation window must hold at least 2 samples, got {0}")]
    InvalidWindowSize(usize),

    #[error("A sampled series needs at least one dependent channel")]
    NoChannels,

    #[error("Sequence is not strictly monotonic at index {index} ({previous} then {value})")]
    NonMonotonic {
        index: usize,
        previous: f64,
        value: f64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SamplingError>;
