//! JSON output
//!
//! Exports the whole session (plan, selections and metrics) for further analysis

use crate::session::Session;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Generate JSON output from a finished session
pub fn generate_json(session: &Session, output_path: &Path) -> Result<()> {
    info!("Generating JSON output: {}", output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, session)
        .context("Failed to serialize session to JSON")?;

    info!("JSON output written to {}", output_path.display());

    Ok(())
}
