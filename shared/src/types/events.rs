//! Kernel launch event definitions
//!
//! These types represent kernel launches as extracted from a trace capture and
//! the launch occurrences chosen for detailed profiling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in nanoseconds, as recorded by the trace capture
pub type Timestamp = u64;

/// One kernel launch observed in the trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelInterval {
    /// Launch start time
    pub start: Timestamp,

    /// Launch end time
    pub end: Timestamp,

    /// Short (demangled, unparameterized) kernel name
    pub name: String,
}

impl KernelInterval {
    /// Create a new kernel interval
    pub fn new(start: Timestamp, end: Timestamp, name: impl Into<String>) -> Self {
        Self {
            start,
            end,
            name: name.into(),
        }
    }
}

/// Addresses a single launch as "the Nth launch of the kernel named X".
///
/// This is the only way the detailed profiler can target one launch, so the
/// occurrence index doubles as its `--launch-skip` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelSelection {
    /// Kernel name
    pub name: String,

    /// 0-based index among the launches sharing `name`, in trace order
    pub occurrence: u64,
}

impl KernelSelection {
    pub fn new(name: impl Into<String>, occurrence: u64) -> Self {
        Self {
            name: name.into(),
            occurrence,
        }
    }
}

impl fmt::Display for KernelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.occurrence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_display() {
        let s = KernelSelection::new("reduce_kernel", 3);
        assert_eq!(s.to_string(), "reduce_kernel#3");
    }
}
