// src/load/insert.rs

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::{normalize::FILLER_TOKEN, schema::TableSpec};

/// Set-based insert of a clean artifact: one transaction, one prepared
/// statement, every row of the artifact. Any constraint violation (a clean
/// row can still break a foreign-key or uniqueness rule) rolls the whole
/// table back and is fatal for the run — that is a data-integrity problem
/// cleaning heuristics cannot repair.
pub fn insert_artifact(conn: &mut Connection, spec: &TableSpec, artifact: &Path) -> Result<u64> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(artifact)
        .with_context(|| format!("opening clean artifact {}", artifact.display()))?;

    let placeholders = vec!["?"; spec.columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        spec.table,
        spec.columns.join(", "),
        placeholders
    );

    let tx = conn.transaction().context("starting load transaction")?;
    let mut inserted = 0u64;
    {
        let mut stmt = tx
            .prepare(&sql)
            .with_context(|| format!("preparing insert for {}", spec.table))?;
        for result in rdr.records() {
            let record = result
                .with_context(|| format!("re-parsing clean artifact {}", artifact.display()))?;
            let values: Vec<Option<&str>> = record.iter().map(sql_value).collect();
            stmt.execute(params_from_iter(values)).with_context(|| {
                format!("constraint violation inserting into {}", spec.table)
            })?;
            inserted += 1;
        }
    }
    tx.commit()
        .with_context(|| format!("committing load of {}", spec.table))?;

    debug!(table = spec.table, inserted, "bulk insert complete");
    Ok(inserted)
}

/// NULL-sentinel contract: a field that is empty, consists solely of quote
/// characters, or is the bare filler token binds as SQL NULL, never as the
/// literal text.
fn sql_value(field: &str) -> Option<&str> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed == FILLER_TOKEN || trimmed.chars().all(|c| c == '"') {
        None
    } else {
        Some(field)
    }
}
