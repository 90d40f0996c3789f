//! Sampler error types

use thiserror::Error;

/// Reasons a trace cannot be sampled.
///
/// All of these are detected before the sampling walk starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("sample count must be greater than 0")]
    ZeroSamples,

    #[error("trace contains {found} kernel launch(es), at least 2 are needed for sampling")]
    TooFewLaunches { found: usize },

    #[error("kernel launch #{index} ({name}) ends before it starts")]
    InvertedInterval { index: usize, name: String },

    #[error("kernel launches are not sorted by start time (launch #{index} starts before launch #{})", .index - 1)]
    Unsorted { index: usize },

    #[error("trace spans zero time (every launch starts and ends at {at} ns), no sample point can be passed")]
    EmptySpan { at: u64 },

    #[error(
        "kernel launch #{index} ({name}) overlaps the previous launch; \
         concurrent kernels are only sampled with overlap allowed"
    )]
    Overlap { index: usize, name: String },
}
