//! Kernel extraction from Nsight Systems SQLite exports

use anyhow::{Context, Result};
use helicorder_shared::types::events::{KernelInterval, Timestamp};
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::Path;

/// Interned string table
pub const STRING_TABLE: &str = "StringIds";

/// CUPTI kernel activity table
pub const KERNEL_TABLE: &str = "CUPTI_ACTIVITY_KIND_KERNEL";

/// Check if a table exists in the database
pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let mut rows = stmt.query([table_name])?;
    Ok(rows.next()?.is_some())
}

/// Open an export read-only
pub fn open_trace(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open trace database {}", path.display()))
}

/// Read every kernel launch from the export at `path`, sorted by start time
pub fn load_kernels(path: &Path) -> Result<Vec<KernelInterval>> {
    let conn = open_trace(path)?;
    read_kernels(&conn)
}

/// Read every kernel launch, sorted by start time
pub fn read_kernels(conn: &Connection) -> Result<Vec<KernelInterval>> {
    if !table_exists(conn, STRING_TABLE)? {
        anyhow::bail!("Trace database has no {} table", STRING_TABLE);
    }
    if !table_exists(conn, KERNEL_TABLE)? {
        anyhow::bail!(
            "Trace database has no {} table; the workload launched no CUDA kernels \
             or CUDA tracing was disabled",
            KERNEL_TABLE
        );
    }

    let names = read_string_ids(conn)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT start, end, shortName FROM {} ORDER BY start",
        KERNEL_TABLE
    ))?;
    let mut rows = stmt.query([])?;

    let mut kernels = Vec::new();
    while let Some(row) = rows.next()? {
        let start: i64 = row.get(0)?;
        let end: i64 = row.get(1)?;
        let name_id: i64 = row.get(2)?;

        let name = names
            .get(&name_id)
            .with_context(|| format!("Kernel name id {} is missing from {}", name_id, STRING_TABLE))?;

        kernels.push(KernelInterval::new(
            to_timestamp(start)?,
            to_timestamp(end)?,
            name.clone(),
        ));
    }

    Ok(kernels)
}

/// Load the id -> string mapping
pub fn read_string_ids(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare(&format!("SELECT id, value FROM {}", STRING_TABLE))?;
    let names = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(names)
}

fn to_timestamp(raw: i64) -> Result<Timestamp> {
    Timestamp::try_from(raw).with_context(|| format!("Negative kernel timestamp {}", raw))
}
