//! Error types for loading student CSVs and exporting results.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures that abort a whole load. No partial dataset is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV header in {path} is missing the '{column}' column")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV header from {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failures while writing department averages out.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A non-fatal problem with a single data row.
///
/// `line` is the 1-based line number in the source file (the header is line 1).
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// Row skipped: not enough fields to reach both required columns.
    TooShort {
        line: u64,
        fields: usize,
        required: usize,
    },
    /// Row kept, score replaced per the missing-score policy.
    InvalidScore { line: u64, raw: String },
    /// Row skipped: the reader could not decode it.
    Unreadable { line: u64, message: String },
}

impl RowIssue {
    pub fn line(&self) -> u64 {
        match self {
            RowIssue::TooShort { line, .. }
            | RowIssue::InvalidScore { line, .. }
            | RowIssue::Unreadable { line, .. } => *line,
        }
    }

    /// Whether the row was dropped from the dataset.
    pub fn is_skip(&self) -> bool {
        !matches!(self, RowIssue::InvalidScore { .. })
    }
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowIssue::TooShort {
                line,
                fields,
                required,
            } => write!(
                f,
                "line {line}: not enough fields ({fields} found, {required} required)"
            ),
            RowIssue::InvalidScore { line, raw } => {
                write!(f, "line {line}: invalid final score {raw:?}")
            }
            RowIssue::Unreadable { line, message } => {
                write!(f, "line {line}: unreadable row: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_names_column() {
        let err = LoadError::MissingColumn {
            column: "Final_Score".to_string(),
            path: PathBuf::from("students.csv"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Final_Score"));
        assert!(msg.contains("students.csv"));
    }

    #[test]
    fn test_only_invalid_score_keeps_row() {
        let invalid = RowIssue::InvalidScore {
            line: 3,
            raw: "abc".to_string(),
        };
        let short = RowIssue::TooShort {
            line: 4,
            fields: 2,
            required: 9,
        };
        assert!(!invalid.is_skip());
        assert!(short.is_skip());
        assert_eq!(short.line(), 4);
    }
}
