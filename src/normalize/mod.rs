// src/normalize/mod.rs

use std::fmt;

use crate::schema::TableSpec;

/// Literal marker the source system emits for redacted/withheld values.
/// Distinct from true emptiness; must be removed as a contiguous unit.
pub const FILLER_TOKEN: &str = "--->";

/// One raw row as parsed from an input line. Ephemeral, exists only while
/// the row is being normalized.
#[derive(Debug)]
pub struct SourceRecord {
    /// 1-based line number in the source file.
    pub line: u64,
    pub fields: Vec<String>,
}

/// A fixed-arity row matching the target table's column count and order.
/// `None` is a true absent value, ready for the NULL-sentinel insert
/// contract. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRecord {
    fields: Vec<Option<String>>,
}

impl CleanRecord {
    pub fn fields(&self) -> &[Option<String>] {
        &self.fields
    }

    /// Render each field the way the clean artifact stores it: absent
    /// values become empty strings.
    pub fn to_artifact_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|f| f.as_deref().unwrap_or(""))
            .collect()
    }
}

/// Why a row was dropped instead of cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ColumnCountMismatch { expected: usize, found: usize },
    MissingRequiredKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ColumnCountMismatch { expected, found } => {
                write!(f, "column-count-mismatch (expected {expected}, found {found})")
            }
            SkipReason::MissingRequiredKey => write!(f, "missing-required-key"),
        }
    }
}

/// Trim whitespace, strip one layer of wrapping quotes, remove every
/// occurrence of the filler token, and re-trim. A field that ends up empty
/// (or consisted solely of quote characters) becomes a true absent value.
pub fn clean_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unquoted = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let stripped = unquoted.replace(FILLER_TOKEN, "");
    let cleaned = stripped.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '"') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Normalize one raw row against its table spec: either a `CleanRecord` or
/// a `SkipReason`, never both, never neither.
///
/// Order is fixed as truncate-then-check: surplus trailing fields that clean
/// to nothing are discarded first, the column count is enforced second, and
/// the required key is checked third, so a row whose only defect is
/// structurally-introduced trailing emptiness survives.
pub fn normalize_record(record: &SourceRecord, spec: &TableSpec) -> Result<CleanRecord, SkipReason> {
    let expected = spec.columns.len();
    let mut fields: Vec<&str> = record.fields.iter().map(String::as_str).collect();

    // 1) drop trailing fields that clean to nothing, until the count fits
    while fields.len() > expected {
        match fields.last() {
            Some(last) if clean_field(last).is_none() => {
                fields.pop();
            }
            _ => break,
        }
    }

    // 2) enforce the column count
    if fields.len() != expected {
        return Err(SkipReason::ColumnCountMismatch {
            expected,
            found: fields.len(),
        });
    }

    // 3) the business key must survive cleaning
    if clean_field(fields[spec.key_index]).is_none() {
        return Err(SkipReason::MissingRequiredKey);
    }

    // 4) clean every field
    let fields = fields.into_iter().map(clean_field).collect();
    Ok(CleanRecord { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSpec;

    fn spec3() -> TableSpec {
        TableSpec {
            table: "widgets",
            source_file: "WIDGETS.csv",
            columns: &["id", "name", "amount"],
            key_index: 0,
            depends_on: &[],
        }
    }

    fn record(fields: &[&str]) -> SourceRecord {
        SourceRecord {
            line: 2,
            fields: fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn clean_field_trims_and_strips_quotes() {
        assert_eq!(clean_field("  hello "), Some("hello".to_string()));
        assert_eq!(clean_field("\"Acme\""), Some("Acme".to_string()));
        assert_eq!(clean_field(""), None);
        assert_eq!(clean_field("   "), None);
    }

    #[test]
    fn clean_field_removes_filler_as_a_unit() {
        assert_eq!(clean_field("--->"), None);
        assert_eq!(clean_field("100--->"), Some("100".to_string()));
        assert_eq!(clean_field("12--->34"), Some("1234".to_string()));
        // whitespace exposed by removal is re-trimmed
        assert_eq!(clean_field("ATLANTA ---> "), Some("ATLANTA".to_string()));
    }

    #[test]
    fn clean_field_quote_only_is_absent() {
        assert_eq!(clean_field("\"\""), None);
        assert_eq!(clean_field("\""), None);
    }

    #[test]
    fn exact_row_with_key_is_never_skipped() {
        let rec = record(&["1", "Acme", "100"]);
        let clean = normalize_record(&rec, &spec3()).unwrap();
        assert_eq!(
            clean.fields(),
            &[
                Some("1".to_string()),
                Some("Acme".to_string()),
                Some("100".to_string())
            ]
        );
    }

    #[test]
    fn trailing_empties_and_filler_are_truncated() {
        // header id,name,amount + row "1","Acme",100,--->,,
        let rec = record(&["1", "Acme", "100", "--->", "", ""]);
        let clean = normalize_record(&rec, &spec3()).unwrap();
        assert_eq!(
            clean.fields(),
            &[
                Some("1".to_string()),
                Some("Acme".to_string()),
                Some("100".to_string())
            ]
        );
    }

    #[test]
    fn surplus_non_empty_field_is_a_count_mismatch() {
        let rec = record(&["1", "Acme", "100", "200"]);
        let err = normalize_record(&rec, &spec3()).unwrap_err();
        assert_eq!(
            err,
            SkipReason::ColumnCountMismatch {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn short_row_is_a_count_mismatch() {
        let rec = record(&["1", "Acme"]);
        let err = normalize_record(&rec, &spec3()).unwrap_err();
        assert_eq!(
            err,
            SkipReason::ColumnCountMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn empty_key_is_skipped() {
        let rec = record(&["", "Acme", "100"]);
        let err = normalize_record(&rec, &spec3()).unwrap_err();
        assert_eq!(err, SkipReason::MissingRequiredKey);
    }

    #[test]
    fn filler_only_key_is_skipped() {
        let rec = record(&["--->", "Acme", "100"]);
        let err = normalize_record(&rec, &spec3()).unwrap_err();
        assert_eq!(err, SkipReason::MissingRequiredKey);
    }

    #[test]
    fn all_empty_row_is_skipped_not_coerced() {
        let rec = record(&["", "", ""]);
        assert!(normalize_record(&rec, &spec3()).is_err());
    }

    #[test]
    fn absent_values_are_not_filler_literals() {
        let rec = record(&["1", "--->", "100"]);
        let clean = normalize_record(&rec, &spec3()).unwrap();
        assert_eq!(clean.fields()[1], None);
    }

    #[test]
    fn normalizing_clean_output_is_a_no_op() {
        let rec = record(&["1", "Acme", "100"]);
        let first = normalize_record(&rec, &spec3()).unwrap();

        let rendered = record(&first.to_artifact_fields());
        let second = normalize_record(&rendered, &spec3());
        // the middle field stayed present, so the round trip is exact
        assert_eq!(second, Ok(first));
    }
}
