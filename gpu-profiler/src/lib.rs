//! GPU kernel sampling
//!
//! Captures the kernel launch timeline of a workload with Nsight Systems, picks
//! representative launches from it and measures each of them in isolation with
//! Nsight Compute.

pub mod error;
pub mod metrics;
pub mod ncu;
pub mod nsys;
pub mod sampler;

pub use error::SampleError;
pub use ncu::NcuProfiler;
pub use nsys::NsysCapture;
pub use sampler::{KernelSampler, SamplePlan};

use anyhow::Result;
use helicorder_shared::types::events::{KernelInterval, KernelSelection};
use helicorder_shared::types::profile::MetricPair;

/// Source of the kernel launch timeline
#[allow(async_fn_in_trait)]
pub trait TraceCapture {
    /// Run `command` to completion under a full trace and return its kernel
    /// launches sorted by start time.
    async fn capture(&self, command: &[String]) -> Result<Vec<KernelInterval>>;
}

/// Detailed single-launch measurement
#[allow(async_fn_in_trait)]
pub trait KernelProfiler {
    /// Re-run `command` and measure only the launch addressed by `selection`.
    ///
    /// Metrics missing from the profiler output are returned as `None`; an
    /// error means the profiler itself could not run.
    async fn profile(&self, command: &[String], selection: &KernelSelection)
        -> Result<MetricPair>;
}
