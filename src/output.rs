//! Output formatting and persistence for department averages.
//!
//! Supports a plain-text summary, JSON reports, and CSV export.

use chrono::Utc;
use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::palette::legend;
use crate::analyzers::types::{AnalysisReport, DepartmentAverages};
use crate::error::ExportError;
use crate::ingest::StudentDataset;

pub const SUMMARY_HEADER: &str = "Summary of Average Final Scores by Department:";
pub const CSV_HEADER: [&str; 2] = ["Department", "Average Final Score"];

/// Renders the header, a blank line, then one `<department>: <average>` line
/// per department, two decimals, ordered by department name.
pub fn summary_text(averages: &DepartmentAverages) -> String {
    let mut out = String::from(SUMMARY_HEADER);
    out.push_str("\n\n");
    for (department, average) in averages.sorted() {
        out.push_str(&format!("{department}: {average:.2}\n"));
    }
    out
}

/// Builds the serializable report for a loaded dataset.
pub fn build_report(dataset: &StudentDataset) -> AnalysisReport {
    AnalysisReport {
        generated_at: Utc::now(),
        source: dataset.source().to_string(),
        loaded_at: dataset.loaded_at(),
        records: dataset.len(),
        skipped_rows: dataset.skipped_rows(),
        departments: legend(&dataset.averages()),
    }
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &AnalysisReport) -> Result<(), ExportError> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes averages as CSV: header `Department,Average Final Score`, then one
/// row per department sorted by name, scores to two decimals.
pub fn write_csv<W: Write>(writer: W, averages: &DepartmentAverages) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    writer.write_record(CSV_HEADER)?;
    for (department, average) in averages.sorted() {
        let average = format!("{average:.2}");
        writer.write_record([department, average.as_str()])?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Exports averages to a CSV file, replacing any existing file.
pub fn export_csv(path: impl AsRef<Path>, averages: &DepartmentAverages) -> Result<(), ExportError> {
    let path = path.as_ref();
    debug!(path = %path.display(), departments = averages.len(), "Exporting CSV");

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, averages)?;

    info!(path = %path.display(), "Data exported");
    Ok(())
}

/// Exports a report to a JSON file, replacing any existing file.
pub fn export_json(path: impl AsRef<Path>, report: &AnalysisReport) -> Result<(), ExportError> {
    let path = path.as_ref();
    let body = serde_json::to_vec_pretty(report)?;

    std::fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Report exported");
    Ok(())
}
