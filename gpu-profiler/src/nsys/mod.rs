//! Nsight Systems trace capture
//!
//! Runs the workload under `nsys profile`, exporting the report to SQLite in
//! a scratch directory that is removed once the kernels have been read.

pub mod schema;

use crate::TraceCapture;
use anyhow::{Context, Result};
use helicorder_shared::types::events::KernelInterval;
use helicorder_shared::utils::format_command;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// `nsys`-backed [`TraceCapture`]
#[derive(Debug, Clone)]
pub struct NsysCapture {
    binary: PathBuf,
}

impl NsysCapture {
    /// Create a capture invoking the given `nsys` binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments passed to `nsys`; the export lands at `<output>.sqlite`
    pub fn args(output: &Path, command: &[String]) -> Vec<String> {
        let mut args = vec![
            "profile".to_string(),
            "--output".to_string(),
            output.display().to_string(),
            "--export".to_string(),
            "sqlite".to_string(),
        ];
        args.extend(command.iter().cloned());
        args
    }
}

impl Default for NsysCapture {
    fn default() -> Self {
        Self::new("nsys")
    }
}

impl TraceCapture for NsysCapture {
    async fn capture(&self, command: &[String]) -> Result<Vec<KernelInterval>> {
        if command.is_empty() {
            anyhow::bail!("No target command to trace");
        }

        let scratch = tempfile::Builder::new()
            .prefix("helicorder-")
            .tempdir()
            .context("Failed to create scratch directory for the trace")?;
        let report = scratch.path().join("trace");
        let args = Self::args(&report, command);

        info!("Capturing kernel trace of: {}", format_command(command));
        debug!("Running {} {}", self.binary.display(), format_command(&args));

        let status = Command::new(&self.binary)
            .args(&args)
            .status()
            .await
            .with_context(|| format!("Failed to launch {}", self.binary.display()))?;

        if !status.success() {
            anyhow::bail!("{} exited with {}", self.binary.display(), status);
        }

        let database = report.with_extension("sqlite");
        if !database.exists() {
            anyhow::bail!(
                "{} did not produce a SQLite export at {}",
                self.binary.display(),
                database.display()
            );
        }

        let kernels = schema::load_kernels(&database)?;
        info!("Trace contains {} kernel launches", kernels.len());

        Ok(kernels)
    }
}
