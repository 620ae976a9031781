// src/load/db.rs

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Open the destination database with foreign-key enforcement on. The FK
/// pragma is per-connection in SQLite, so it must happen here rather than
/// in the DDL.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    conn.pragma_update(None, "foreign_keys", true)
        .context("enabling foreign key enforcement")?;
    Ok(conn)
}

/// In-memory connection with the same pragmas, for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("opening in-memory database")?;
    conn.pragma_update(None, "foreign_keys", true)
        .context("enabling foreign key enforcement")?;
    Ok(conn)
}

/// Cheap connectivity probe before the run starts.
pub fn health_check(conn: &Connection) -> Result<()> {
    let one: i64 = conn
        .query_row("SELECT 1", [], |row| row.get(0))
        .context("database health check")?;
    anyhow::ensure!(one == 1, "health check returned {one}");
    info!("database health check passed");
    Ok(())
}
