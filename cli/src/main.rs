//! CLI for Helicorder
//!
//! Subcommands:
//! - profile: trace a workload, sample its kernels and profile each one
//! - plan: sample an existing nsys SQLite export without profiling
//! - plot: chart a previously written utilization record

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "helicorder")]
#[command(about = "Helicorder - sampled GPU utilization over a workload's lifetime", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace a workload and profile a sample of its kernel launches
    Profile(commands::profile::ProfileArgs),

    /// Show which launches would be profiled for an existing trace export
    Plan(commands::plan::PlanArgs),

    /// Render the utilization chart from an existing record
    Plot(commands::plot::PlotArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Profile(args) => commands::profile::run(args).await,
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Plot(args) => commands::plot::run(args),
    };

    if let Err(e) = result {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
