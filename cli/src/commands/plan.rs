//! Plan command implementation
//!
//! Samples an existing Nsight Systems SQLite export and prints the launches
//! that `profile` would hand to Nsight Compute. Nothing is executed.

use super::profile::parse_sample_count;
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use helicorder_agent::config::DEFAULT_SAMPLE_COUNT;
use helicorder_gpu::{KernelSampler, SamplePlan};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// SQLite export produced by `nsys profile --export sqlite`
    pub trace: PathBuf,

    /// Number of evenly spaced sample points
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_COUNT, value_parser = parse_sample_count)]
    pub sample_count: usize,

    /// Accept kernel launches that overlap (concurrent streams)
    #[arg(long)]
    pub allow_overlap: bool,

    /// Write the plan as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn run(args: PlanArgs) -> Result<()> {
    let sampler = KernelSampler::new(args.sample_count).allow_overlap(args.allow_overlap);
    let (kernel_launches, plan) = helicorder_agent::plan_from_export(&args.trace, &sampler)?;

    print_plan(kernel_launches, &plan);

    output::warn_unfilled(plan.unfilled(), plan.requested());

    if let Some(path) = &args.json {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &plan)
            .context("Failed to serialize plan to JSON")?;
        output::success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}

fn print_plan(kernel_launches: usize, plan: &SamplePlan) {
    println!("=== Sample Plan ===");
    println!(
        "  Launches: {} | Span: {:.6} s | Points: {}/{}",
        kernel_launches,
        plan.span_s(),
        plan.selections.len(),
        plan.requested()
    );
    println!("\n  {:>4} {:>14} {:>8}  KERNEL", "#", "TIME (s)", "SKIP");

    for (i, (time_s, selection)) in plan.points().enumerate() {
        println!(
            "  {:>4} {:>14.9} {:>8}  {}",
            i + 1,
            time_s,
            selection.occurrence,
            selection.name
        );
    }
}
