//! Profile command implementation

use crate::output;
use anyhow::Result;
use clap::Args;
use helicorder_agent::config::DEFAULT_SAMPLE_COUNT;
use helicorder_agent::{Config, Session, SessionEvent, ToolPaths};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Output prefix; the record is written to `<OUTPUT>.csv`
    #[arg(short, long, default_value = "record")]
    pub output: PathBuf,

    /// Number of evenly spaced sample points
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_COUNT, value_parser = parse_sample_count)]
    pub sample_count: usize,

    /// Also render a utilization chart (SVG) next to the record
    #[arg(short, long)]
    pub graph: bool,

    /// Also dump the whole session as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Accept kernel launches that overlap (concurrent streams)
    #[arg(long)]
    pub allow_overlap: bool,

    /// Nsight Systems binary
    #[arg(long, env = "HELICORDER_NSYS", default_value = "nsys")]
    pub nsys: PathBuf,

    /// Nsight Compute binary
    #[arg(long, env = "HELICORDER_NCU", default_value = "ncu")]
    pub ncu: PathBuf,

    /// Program to profile, followed by its arguments
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl ProfileArgs {
    pub fn into_config(self) -> Config {
        Config {
            command: self.command,
            sample_count: self.sample_count,
            output: self.output,
            graph: self.graph,
            json_output: self.json,
            allow_overlap: self.allow_overlap,
            tools: ToolPaths {
                nsys: self.nsys,
                ncu: self.ncu,
            },
        }
    }
}

/// Parse a sample count, rejecting zero
pub fn parse_sample_count(s: &str) -> Result<usize, String> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a non-negative integer", s))?;
    if count == 0 {
        return Err("sample count must be at least 1".to_string());
    }
    Ok(count)
}

pub async fn run(args: ProfileArgs) -> Result<()> {
    let config = args.into_config();

    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")?
        .progress_chars("=> ");
    let mut bar: Option<ProgressBar> = None;

    let result = helicorder_agent::run_profiler(&config, |event| match event {
        SessionEvent::Planned {
            kernel_launches,
            plan,
        } => {
            output::info(&format!(
                "Trace has {} kernel launches over {:.6} s; profiling {} of them",
                kernel_launches,
                plan.span_s(),
                plan.selections.len()
            ));
            output::warn_unfilled(plan.unfilled(), plan.requested());
            bar = Some(ProgressBar::new(plan.selections.len() as u64).with_style(style.clone()));
        }
        SessionEvent::Profiled { sample, .. } => {
            if let Some(pb) = &bar {
                pb.set_message(sample.kernel.to_string());
                pb.inc(1);
            }
        }
    })
    .await;

    if let Some(pb) = bar.take() {
        pb.finish_and_clear();
    }
    let session = result?;

    print_samples(&session);

    let incomplete = session.record().incomplete_rows();
    if incomplete > 0 {
        output::warning(&format!(
            "{} sample(s) are missing utilization metrics; their fields are left blank",
            incomplete
        ));
    }

    for path in helicorder_agent::write_outputs(&config, &session)? {
        output::success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}

fn print_samples(session: &Session) {
    if session.samples.is_empty() {
        println!("No kernels were profiled.");
        return;
    }

    println!(
        "\n  {:>14} {:>10} {:>10}  KERNEL",
        "TIME (s)", "MEMORY %", "SM %"
    );
    for sample in &session.samples {
        println!(
            "  {:>14.9} {:>10} {:>10}  {}",
            sample.time_s,
            output::metric_cell(sample.metrics.memory),
            output::metric_cell(sample.metrics.sm),
            sample.kernel
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_count() {
        assert_eq!(parse_sample_count("10"), Ok(10));
        assert!(parse_sample_count("0").is_err());
        assert!(parse_sample_count("-3").is_err());
        assert!(parse_sample_count("ten").is_err());
    }
}
