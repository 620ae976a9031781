// src/load/mod.rs

pub mod db;
pub mod insert;
pub mod stage;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use rusqlite::Connection;
use tracing::{error, info, instrument};

use crate::schema::{graph, TableSpec};

/// Per-table result of one run. Replaces process-wide mutable counters so
/// each table's load stays independently retestable.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: String,
    pub rows_attempted: u64,
    pub rows_accepted: u64,
    pub rows_skipped: u64,
    pub loaded: bool,
}

/// Drives the remediation pipeline: for each table in dependency order,
/// stage the source file into a clean artifact, then bulk-insert it.
pub struct BulkLoader {
    conn: Connection,
    data_dir: PathBuf,
    staging_dir: PathBuf,
    skiplog_dir: PathBuf,
}

impl BulkLoader {
    pub fn new(
        conn: Connection,
        data_dir: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        skiplog_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            conn,
            data_dir: data_dir.into(),
            staging_dir: staging_dir.into(),
            skiplog_dir: skiplog_dir.into(),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn into_conn(self) -> Connection {
        self.conn
    }

    /// Clean and load a single table. Row-level rejects are non-fatal and
    /// already ledgered by the staging pass; an insertion failure aborts.
    #[instrument(level = "info", skip(self, spec), fields(table = spec.table))]
    pub fn load_table(&mut self, spec: &TableSpec) -> Result<LoadOutcome> {
        let source = self.data_dir.join(spec.source_file);
        let staged = stage::stage_table(spec, &source, &self.staging_dir, &self.skiplog_dir)?;
        let inserted = insert::insert_artifact(&mut self.conn, spec, &staged.artifact)?;

        if inserted != staged.accepted {
            bail!(
                "table {}: staged {} rows but inserted {}",
                spec.table,
                staged.accepted,
                inserted
            );
        }

        info!(
            table = spec.table,
            attempted = staged.attempted,
            accepted = staged.accepted,
            skipped = staged.skipped,
            "load ok"
        );
        Ok(LoadOutcome {
            table: spec.table.to_string(),
            rows_attempted: staged.attempted,
            rows_accepted: staged.accepted,
            rows_skipped: staged.skipped,
            loaded: true,
        })
    }

    /// Run the whole batch in dependency order. Configuration problems
    /// (missing source file, ordering violation) surface before any row is
    /// processed; the first table-level failure halts the remaining loads.
    pub fn run_all(&mut self, order: &[&TableSpec]) -> Result<Vec<LoadOutcome>> {
        for spec in order {
            let source = self.data_dir.join(spec.source_file);
            if !source.is_file() {
                bail!(
                    "table {}: source file {} is missing",
                    spec.table,
                    source.display()
                );
            }
        }

        let mut completed: HashSet<&str> = HashSet::new();
        let mut outcomes = Vec::with_capacity(order.len());

        for spec in order {
            graph::assert_loadable(spec, &completed)?;
            match self.load_table(spec) {
                Ok(outcome) => {
                    completed.insert(spec.table);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!(table = spec.table, error = %e, "load FAILED, halting remaining tables");
                    return Err(e.context(format!("loading table {}", spec.table)));
                }
            }
        }

        Ok(outcomes)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
