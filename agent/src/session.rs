//! Sampling session
//!
//! Drives one run end to end: capture the kernel timeline, sample it, then
//! profile every selected launch in turn. Profiling is strictly sequential
//! since each step relaunches the whole workload.

use crate::config::Config;
use anyhow::{Context, Result};
use helicorder_gpu::{KernelProfiler, SamplePlan, TraceCapture};
use helicorder_shared::types::events::KernelSelection;
use helicorder_shared::types::profile::{MetricPair, Record};
use serde::Serialize;
use tracing::{info, warn};

/// One profiled sample point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledKernel {
    /// Sample time in seconds
    pub time_s: f64,

    /// Launch measured for this point
    pub kernel: KernelSelection,

    pub metrics: MetricPair,
}

/// Everything a session produced
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub command: Vec<String>,

    /// Launches seen in the trace
    pub kernel_launches: usize,

    pub plan: SamplePlan,

    pub samples: Vec<SampledKernel>,
}

impl Session {
    /// Utilization time series, one row per profiled sample
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        for sample in &self.samples {
            record.push(sample.time_s, sample.metrics);
        }
        record
    }
}

/// Progress notifications emitted while a session runs
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// The trace was captured and sampled
    Planned {
        kernel_launches: usize,
        plan: &'a SamplePlan,
    },

    /// A sample point was profiled
    Profiled {
        index: usize,
        total: usize,
        sample: &'a SampledKernel,
    },
}

/// Run a full session against the given collaborators
pub async fn run_session<T, P, F>(
    config: &Config,
    capture: &T,
    profiler: &P,
    mut on_event: F,
) -> Result<Session>
where
    T: TraceCapture,
    P: KernelProfiler,
    F: FnMut(SessionEvent<'_>),
{
    config.validate().context("Invalid configuration")?;

    let kernels = capture
        .capture(&config.command)
        .await
        .context("Failed to capture kernel trace")?;

    let plan = config
        .sampler()
        .sample(&kernels)
        .context("Failed to sample kernel trace")?;

    info!(
        "Selected {} of {} kernel launches over {:.6} s",
        plan.selections.len(),
        kernels.len(),
        plan.span_s()
    );
    on_event(SessionEvent::Planned {
        kernel_launches: kernels.len(),
        plan: &plan,
    });

    let samples = profile_plan(&config.command, &plan, profiler, &mut on_event).await?;

    Ok(Session {
        command: config.command.clone(),
        kernel_launches: kernels.len(),
        plan,
        samples,
    })
}

/// Profile every selection of `plan`, in sample order
pub async fn profile_plan<P, F>(
    command: &[String],
    plan: &SamplePlan,
    profiler: &P,
    on_event: &mut F,
) -> Result<Vec<SampledKernel>>
where
    P: KernelProfiler,
    F: FnMut(SessionEvent<'_>),
{
    let total = plan.selections.len();
    let mut samples = Vec::with_capacity(total);

    for (index, (time_s, selection)) in plan.points().enumerate() {
        info!("Profiling sample {}/{}: {}", index + 1, total, selection);

        let metrics = profiler
            .profile(command, selection)
            .await
            .with_context(|| format!("Failed to profile {} (sample {})", selection, index + 1))?;

        if !metrics.is_complete() {
            let missing: Vec<String> = metrics.missing().iter().map(|m| m.to_string()).collect();
            warn!(
                "Sample {} ({}) is missing {} utilization; the row will be left blank",
                index + 1,
                selection,
                missing.join(" and ")
            );
        }

        samples.push(SampledKernel {
            time_s,
            kernel: selection.clone(),
            metrics,
        });
        if let Some(sample) = samples.last() {
            on_event(SessionEvent::Profiled {
                index,
                total,
                sample,
            });
        }
    }

    Ok(samples)
}
