//! CSV record output
//!
//! The record is a fixed three-column table. Absent metrics are written as
//! empty fields so every sample point keeps its row.

use anyhow::{Context, Result};
use helicorder_shared::types::profile::{Record, RecordRow};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Column names, in order
pub const HEADER: [&str; 3] = ["Time (s)", "Memory (%)", "SM (%)"];

/// Write the record as CSV, replacing any existing file
pub fn write_record(record: &Record, output_path: &Path) -> Result<()> {
    info!("Writing utilization record: {}", output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create record file: {}", output_path.display()))?;

    // The header is written by hand so an empty record still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(HEADER)
        .context("Failed to write record header")?;
    for row in &record.rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write record row at {} s", row.time_s))?;
    }
    writer.flush().context("Failed to flush record file")?;

    info!("Wrote {} rows to {}", record.len(), output_path.display());

    Ok(())
}

/// Read a record written by [`write_record`].
///
/// The older `Timestamp (s)` header is accepted for the time column.
pub fn read_record(input_path: &Path) -> Result<Record> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(input_path)
        .with_context(|| format!("Failed to open record file: {}", input_path.display()))?;

    reader
        .deserialize::<RecordRow>()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Invalid row {} in {}", i + 1, input_path.display()))
        })
        .collect()
}
