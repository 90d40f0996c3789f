//! Helicorder session library
//!
//! Runs sampling sessions against Nsight Systems and Nsight Compute and writes
//! their outputs: the CSV utilization record, an optional SVG chart and an
//! optional JSON dump of the whole session.

pub mod config;
pub mod output;
pub mod session;

pub use config::{Config, ToolPaths};
pub use session::{run_session, SampledKernel, Session, SessionEvent};

use anyhow::{Context, Result};
use helicorder_gpu::nsys::schema::load_kernels;
use helicorder_gpu::{KernelSampler, NcuProfiler, NsysCapture, SamplePlan};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Run a session with the configured `nsys` and `ncu` binaries
pub async fn run_profiler<F>(config: &Config, on_event: F) -> Result<Session>
where
    F: FnMut(SessionEvent<'_>),
{
    let capture = NsysCapture::new(config.tools.nsys.clone());
    let profiler = NcuProfiler::new(config.tools.ncu.clone());

    run_session(config, &capture, &profiler, on_event).await
}

/// Write every output the configuration asks for and return their paths.
///
/// Only called once a session has completed, so a failed session leaves no
/// files behind.
pub fn write_outputs(config: &Config, session: &Session) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let record = session.record();

    let csv_path = config.csv_path();
    output::table::write_record(&record, &csv_path)?;
    written.push(csv_path);

    if config.graph {
        if record.long_form().is_empty() {
            warn!("No utilization values were collected; skipping chart");
        } else {
            let chart_path = config.chart_path();
            output::chart::render_chart(&record, &chart_path)?;
            written.push(chart_path);
        }
    }

    if let Some(json_path) = &config.json_output {
        output::json::generate_json(session, json_path)?;
        written.push(json_path.clone());
    }

    Ok(written)
}

/// Sample an existing `nsys` SQLite export without running anything.
///
/// Returns the number of launches in the export along with the plan.
pub fn plan_from_export(path: &Path, sampler: &KernelSampler) -> Result<(usize, SamplePlan)> {
    let kernels = load_kernels(path)?;
    info!(
        "Loaded {} kernel launches from {}",
        kernels.len(),
        path.display()
    );

    let plan = sampler
        .sample(&kernels)
        .with_context(|| format!("Failed to sample {}", path.display()))?;

    Ok((kernels.len(), plan))
}
