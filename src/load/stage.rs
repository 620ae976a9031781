// src/load/stage.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::{
    normalize::{normalize_record, SourceRecord},
    schema::TableSpec,
    skiplog::SkipLedger,
};

/// What the cleaning stage produced for one source file.
#[derive(Debug)]
pub struct StageResult {
    pub artifact: PathBuf,
    pub attempted: u64,
    pub accepted: u64,
    pub skipped: u64,
}

/// Stream the raw source file, normalize every row, and write accepted rows
/// to the clean artifact. Rejects go to the skip ledger and the file keeps
/// going; only structural failures (missing file, unreadable CSV, a header
/// too short for positional mapping) abort.
///
/// The artifact quotes every field, so residual delimiters or quote
/// characters inside a field can never make re-parsing ambiguous.
pub fn stage_table(
    spec: &TableSpec,
    source: &Path,
    staging_dir: &Path,
    skiplog_dir: &Path,
) -> Result<StageResult> {
    if !source.is_file() {
        bail!(
            "table {}: source file {} is missing",
            spec.table,
            source.display()
        );
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(source)
        .with_context(|| format!("opening {}", source.display()))?;

    // Mapping is positional against the configured column list; a header
    // with fewer fields than the contract cannot be mapped at all.
    let header_len = rdr
        .headers()
        .with_context(|| format!("reading header of {}", source.display()))?
        .len();
    if header_len < spec.columns.len() {
        bail!(
            "table {}: header has {} fields, schema contract needs {}",
            spec.table,
            header_len,
            spec.columns.len()
        );
    }

    fs::create_dir_all(staging_dir)
        .with_context(|| format!("creating staging directory {}", staging_dir.display()))?;
    let artifact = staging_dir.join(format!("{}.clean.csv", spec.table));
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(&artifact)
        .with_context(|| format!("creating clean artifact {}", artifact.display()))?;
    wtr.write_record(spec.columns)
        .context("writing artifact header")?;

    let mut ledger = SkipLedger::create(skiplog_dir, spec.table);
    let mut attempted = 0u64;
    let mut accepted = 0u64;

    for result in rdr.records() {
        let record =
            result.with_context(|| format!("CSV parse error in {}", source.display()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        attempted += 1;

        let source_record = SourceRecord {
            line,
            fields: record.iter().map(str::to_string).collect(),
        };
        match normalize_record(&source_record, spec) {
            Ok(clean) => {
                wtr.write_record(clean.to_artifact_fields())
                    .with_context(|| format!("writing clean row to {}", artifact.display()))?;
                accepted += 1;
            }
            Err(reason) => {
                ledger.record(line, &reason, &source_record.fields.join(","));
            }
        }
    }

    wtr.flush().context("flushing clean artifact")?;
    let skipped = ledger.finish();
    debug!(
        table = spec.table,
        attempted, accepted, skipped, "staging complete"
    );

    Ok(StageResult {
        artifact,
        attempted,
        accepted,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn widget_spec() -> TableSpec {
        TableSpec {
            table: "widgets",
            source_file: "WIDGETS.csv",
            columns: &["id", "name", "amount"],
            key_index: 0,
            depends_on: &[],
        }
    }

    fn write_source(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("WIDGETS.csv");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn stages_good_rows_and_ledgers_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(
            dir.path(),
            "id,name,amount\n\
             \"1\",\"Acme\",100,--->,,\n\
             ,Acme,100\n\
             1,Acme,100,200\n\
             2,Bobs,--->\n",
        );

        let spec = widget_spec();
        let result =
            stage_table(&spec, &source, &dir.path().join("staging"), dir.path()).unwrap();
        assert_eq!(result.attempted, 4);
        assert_eq!(result.accepted, 2);
        assert_eq!(result.skipped, 2);

        let artifact = fs::read_to_string(&result.artifact).unwrap();
        let mut lines = artifact.lines();
        assert_eq!(lines.next(), Some("\"id\",\"name\",\"amount\""));
        assert_eq!(lines.next(), Some("\"1\",\"Acme\",\"100\""));
        // filler-only amount staged as a true empty, not the literal token
        assert_eq!(lines.next(), Some("\"2\",\"Bobs\",\"\""));

        let ledger = fs::read_to_string(dir.path().join("widgets.skips.log")).unwrap();
        assert!(ledger.contains("line 3: missing-required-key"));
        assert!(ledger.contains("line 4: column-count-mismatch (expected 3, found 4)"));
    }

    #[test]
    fn missing_source_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let spec = widget_spec();
        let err = stage_table(
            &spec,
            &dir.path().join("WIDGETS.csv"),
            &dir.path().join("staging"),
            dir.path(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn short_header_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "id,name\n1,Acme\n");
        let spec = widget_spec();
        assert!(
            stage_table(&spec, &source, &dir.path().join("staging"), dir.path()).is_err()
        );
    }
}
