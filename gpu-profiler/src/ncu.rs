//! Nsight Compute wrapper
//!
//! Relaunches the workload under `ncu`, intercepting exactly one launch of
//! the selected kernel and collecting its full metric set.

use crate::metrics::parse_speed_of_light;
use crate::KernelProfiler;
use anyhow::{Context, Result};
use helicorder_shared::types::events::KernelSelection;
use helicorder_shared::types::profile::MetricPair;
use helicorder_shared::utils::format_command;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// `ncu`-backed [`KernelProfiler`]
#[derive(Debug, Clone)]
pub struct NcuProfiler {
    binary: PathBuf,
}

impl NcuProfiler {
    /// Create a profiler invoking the given `ncu` binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments passed to `ncu` ahead of the workload command
    pub fn args(selection: &KernelSelection, command: &[String]) -> Vec<String> {
        let mut args = vec![
            "--csv".to_string(),
            "--target-process".to_string(),
            "all".to_string(),
            "--kernel-name".to_string(),
            selection.name.clone(),
            "--launch-skip".to_string(),
            selection.occurrence.to_string(),
            "--launch-count".to_string(),
            "1".to_string(),
        ];
        args.extend(command.iter().cloned());
        args
    }
}

impl Default for NcuProfiler {
    fn default() -> Self {
        Self::new("ncu")
    }
}

impl KernelProfiler for NcuProfiler {
    async fn profile(&self, command: &[String], selection: &KernelSelection) -> Result<MetricPair> {
        let args = Self::args(selection, command);
        info!("Profiling kernel {}", selection);
        debug!("Running {} {}", self.binary.display(), format_command(&args));

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .with_context(|| format!("Failed to launch {}", self.binary.display()))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {} while profiling kernel {}",
                self.binary.display(),
                output.status,
                selection
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_speed_of_light(&stdout))
    }
}
