//! CSV ingestion of student records.
//!
//! The header row is searched for the `Department` and `Final_Score` columns;
//! the identifier is always the first column. Malformed rows never abort a
//! load: they are logged, recorded as [`RowIssue`]s, and either skipped or
//! kept with a substitute score.

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzers::aggregate::{department_averages, mean_score};
use crate::analyzers::types::{DepartmentAverages, StudentRecord};
use crate::error::{LoadError, RowIssue};

pub const DEPARTMENT_COLUMN: &str = "Department";
pub const FINAL_SCORE_COLUMN: &str = "Final_Score";
const IDENTIFIER_INDEX: usize = 0;

/// What to substitute for a missing or unparsable final score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingScorePolicy {
    /// Use 0.0.
    #[default]
    Zero,
    /// Use the mean of every valid score in the same file (0.0 if there are none).
    GlobalMean,
}

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub missing_score: MissingScorePolicy,
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub department: usize,
    pub final_score: usize,
}

impl ColumnLayout {
    /// Finds the required columns by exact, case-sensitive header name.
    /// When a name repeats, the last occurrence wins.
    ///
    /// Returns the name of the first missing column on failure.
    pub fn resolve(headers: &StringRecord) -> Result<Self, &'static str> {
        let find = |name: &str| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim() == name)
                .map(|(idx, _)| idx)
                .last()
        };

        let department = find(DEPARTMENT_COLUMN).ok_or(DEPARTMENT_COLUMN)?;
        let final_score = find(FINAL_SCORE_COLUMN).ok_or(FINAL_SCORE_COLUMN)?;

        Ok(Self {
            department,
            final_score,
        })
    }

    /// Minimum number of fields a row needs to reach both columns.
    pub fn required_fields(&self) -> usize {
        self.department.max(self.final_score) + 1
    }
}

/// The immutable result of one load.
#[derive(Debug, Clone)]
pub struct StudentDataset {
    source: String,
    loaded_at: DateTime<Utc>,
    records: Vec<StudentRecord>,
    issues: Vec<RowIssue>,
}

impl StudentDataset {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of data rows dropped entirely.
    pub fn skipped_rows(&self) -> usize {
        self.issues.iter().filter(|i| i.is_skip()).count()
    }

    pub fn averages(&self) -> DepartmentAverages {
        department_averages(&self.records)
    }
}

/// Loads student records from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened or read and
/// [`LoadError::MissingColumn`] if the header lacks a required column.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>, options: &IngestOptions) -> Result<StudentDataset, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_dataset(file, path, options)
}

/// Reads student records from any reader; `source` names it in errors and logs.
///
/// Rows are scoped to physical lines: a quote left open on one line never
/// swallows the lines after it.
pub fn read_dataset<R: Read>(
    reader: R,
    source: &Path,
    options: &IngestOptions,
) -> Result<StudentDataset, LoadError> {
    let io_error = |source_err: std::io::Error| LoadError::Io {
        path: source.to_path_buf(),
        source: source_err,
    };
    let mut lines = BufReader::new(reader).split(b'\n');

    let headers = match lines.next() {
        Some(line) => decode_line(&line.map_err(io_error)?)
            .map_err(|source_err| LoadError::Csv {
                path: source.to_path_buf(),
                source: source_err,
            })?
            .unwrap_or_else(StringRecord::new),
        None => StringRecord::new(),
    };

    let layout = ColumnLayout::resolve(&headers).map_err(|column| LoadError::MissingColumn {
        column: column.to_string(),
        path: source.to_path_buf(),
    })?;
    debug!(?layout, "Resolved CSV columns");

    let mut pending: Vec<(String, String, Option<f64>)> = Vec::new();
    let mut issues = Vec::new();

    for (idx, raw_line) in lines.enumerate() {
        let line = idx as u64 + 2;
        let raw_line = raw_line.map_err(io_error)?;

        let record = match decode_line(&raw_line) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(line, "Skipping blank line");
                continue;
            }
            Err(e) => {
                warn!(line, error = %e, "Skipping unreadable row");
                issues.push(RowIssue::Unreadable {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if record.len() < layout.required_fields() {
            warn!(
                line,
                fields = record.len(),
                row = ?record,
                "Skipping row with too few fields"
            );
            issues.push(RowIssue::TooShort {
                line,
                fields: record.len(),
                required: layout.required_fields(),
            });
            continue;
        }

        let identifier = record.get(IDENTIFIER_INDEX).unwrap_or_default();
        let department = record.get(layout.department).unwrap_or_default();
        let raw_score = record.get(layout.final_score).unwrap_or_default();

        let score = if raw_score.is_empty() {
            None
        } else {
            let parsed = parse_score(raw_score);
            if parsed.is_none() {
                warn!(line, raw = raw_score, "Invalid final score");
                issues.push(RowIssue::InvalidScore {
                    line,
                    raw: raw_score.to_string(),
                });
            }
            parsed
        };

        pending.push((identifier.to_string(), department.to_string(), score));
    }

    let fallback = match options.missing_score {
        MissingScorePolicy::Zero => 0.0,
        MissingScorePolicy::GlobalMean => {
            let valid: Vec<f64> = pending.iter().filter_map(|(_, _, s)| *s).collect();
            mean_score(&valid)
        }
    };

    let records: Vec<StudentRecord> = pending
        .into_iter()
        .map(|(identifier, department, score)| StudentRecord {
            identifier,
            department,
            final_score: score.unwrap_or(fallback),
        })
        .collect();

    let dataset = StudentDataset {
        source: source.display().to_string(),
        loaded_at: Utc::now(),
        records,
        issues,
    };

    info!(
        records = dataset.len(),
        skipped = dataset.skipped_rows(),
        issues = dataset.issues.len(),
        "Loaded student records"
    );

    Ok(dataset)
}

/// Splits one physical line into trimmed fields. `Ok(None)` for a blank line.
///
/// Commas inside a double-quoted field do not split it. An unclosed quote
/// runs to the end of this line only.
fn decode_line(bytes: &[u8]) -> csv::Result<Option<StringRecord>> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut record = StringRecord::new();
    if rdr.read_record(&mut record)? {
        Ok(Some(record))
    } else {
        Ok(None)
    }
}

/// Parses a final score. Non-finite values count as invalid.
fn parse_score(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
