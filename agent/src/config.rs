//! Configuration types for a sampling session

use helicorder_gpu::KernelSampler;
use std::ffi::OsString;
use std::path::PathBuf;

/// Default number of sample points
pub const DEFAULT_SAMPLE_COUNT: usize = 10;

/// Default output prefix
pub const DEFAULT_OUTPUT: &str = "record";

/// Locations of the external profilers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Nsight Systems CLI
    pub nsys: PathBuf,

    /// Nsight Compute CLI
    pub ncu: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            nsys: std::env::var_os("HELICORDER_NSYS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("nsys")),
            ncu: std::env::var_os("HELICORDER_NCU")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("ncu")),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Workload command line, program first
    pub command: Vec<String>,

    /// Number of evenly spaced sample points
    pub sample_count: usize,

    /// Output path or prefix for the record
    pub output: PathBuf,

    /// Also render the utilization chart
    pub graph: bool,

    /// Optional JSON dump of the whole session
    pub json_output: Option<PathBuf>,

    /// Accept overlapping kernel launches
    pub allow_overlap: bool,

    /// External profiler binaries
    pub tools: ToolPaths,
}

impl Config {
    /// Configuration with defaults for everything but the workload
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            sample_count: DEFAULT_SAMPLE_COUNT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            graph: false,
            json_output: None,
            allow_overlap: false,
            tools: ToolPaths::default(),
        }
    }

    /// Sampler built from this configuration
    pub fn sampler(&self) -> KernelSampler {
        KernelSampler::new(self.sample_count).allow_overlap(self.allow_overlap)
    }

    /// Path of the CSV record: the output itself if it already ends in
    /// `.csv`, otherwise `<output>.csv`.
    pub fn csv_path(&self) -> PathBuf {
        let is_csv = self
            .output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            return self.output.clone();
        }
        let mut path = OsString::from(self.output.as_os_str());
        path.push(".csv");
        PathBuf::from(path)
    }

    /// Path of the utilization chart, next to the CSV record
    pub fn chart_path(&self) -> PathBuf {
        self.csv_path().with_extension("svg")
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.command.is_empty() || self.command[0].is_empty() {
            anyhow::bail!("A target command is required");
        }

        if self.sample_count == 0 {
            anyhow::bail!("Sample count must be greater than 0");
        }

        if self.output.as_os_str().is_empty() {
            anyhow::bail!("Output path must not be empty");
        }

        Ok(())
    }
}
