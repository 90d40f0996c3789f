//! Time-related utilities

/// Nanoseconds per second
pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Convert a trace timestamp in nanoseconds to seconds
pub fn nanos_to_secs(nanos: f64) -> f64 {
    nanos / NANOS_PER_SEC
}
