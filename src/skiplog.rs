// src/skiplog.rs

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::warn;

use crate::normalize::SkipReason;

/// Append-only audit log of rejected rows, one ledger file per source file.
///
/// The ledger must always be available after a run and must never take the
/// run down: every I/O failure is logged and swallowed, and the skip count
/// keeps accumulating regardless.
pub struct SkipLedger {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    skipped: u64,
}

impl SkipLedger {
    /// Open the ledger for `table` under `dir`, truncating any ledger left
    /// over from a previous run. Infallible by contract.
    pub fn create(dir: &Path, table: &str) -> Self {
        let path = dir.join(format!("{table}.skips.log"));
        let writer = fs::create_dir_all(dir)
            .and_then(|_| File::create(&path))
            .map(BufWriter::new)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "cannot open skip ledger");
                e
            })
            .ok();

        let mut ledger = Self {
            path,
            writer,
            skipped: 0,
        };
        ledger.write_line(&format!(
            "# skip ledger for {table}, run started {}",
            Utc::now().to_rfc3339()
        ));
        ledger
    }

    /// Record one rejected row: 1-based source line number, reason, and a
    /// snapshot of the raw content for audit.
    pub fn record(&mut self, line: u64, reason: &SkipReason, raw: &str) {
        self.skipped += 1;
        self.write_line(&format!("line {line}: {reason} | {raw}"));
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and return the final skip count.
    pub fn finish(mut self) -> u64 {
        if let Some(w) = self.writer.as_mut() {
            if let Err(e) = w.flush() {
                warn!(path = %self.path.display(), error = %e, "skip ledger flush failed");
            }
        }
        self.skipped
    }

    fn write_line(&mut self, line: &str) {
        if let Some(w) = self.writer.as_mut() {
            if let Err(e) = writeln!(w, "{line}") {
                warn!(path = %self.path.display(), error = %e, "skip ledger write failed");
                self.writer = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn records_line_number_and_reason() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = SkipLedger::create(dir.path(), "sdwa_facilities");
        ledger.record(17, &SkipReason::MissingRequiredKey, ",F001,WELL");
        ledger.record(
            42,
            &SkipReason::ColumnCountMismatch {
                expected: 11,
                found: 13,
            },
            "GA0010000,F002,extra,extra",
        );
        let path = ledger.path().to_path_buf();
        assert_eq!(ledger.finish(), 2);

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("line 17: missing-required-key | ,F001,WELL"));
        assert!(text.contains("line 42: column-count-mismatch (expected 11, found 13)"));
    }

    #[test]
    fn unwritable_directory_never_panics() {
        let mut ledger = SkipLedger::create(Path::new("/dev/null/nope"), "t");
        ledger.record(1, &SkipReason::MissingRequiredKey, "x");
        assert_eq!(ledger.finish(), 1);
    }
}
