//! Plot command implementation

use crate::output;
use anyhow::Result;
use clap::Args;
use helicorder_agent::output::{chart, table};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Record CSV written by `helicorder profile`
    pub record: PathBuf,

    /// Chart file (SVG); defaults to the record path with an `.svg` extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: PlotArgs) -> Result<()> {
    let record = table::read_record(&args.record)?;
    debug!("Read {} rows from {}", record.len(), args.record.display());

    let incomplete = record.incomplete_rows();
    if incomplete > 0 {
        output::warning(&format!(
            "{} of {} rows are missing a metric and are left out of the chart",
            incomplete,
            record.len()
        ));
    }

    let output_path = args
        .output
        .unwrap_or_else(|| args.record.with_extension("svg"));
    chart::render_chart(&record, &output_path)?;

    output::success(&format!("Wrote {}", output_path.display()));

    Ok(())
}
