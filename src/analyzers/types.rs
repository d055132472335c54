//! Data types shared by the ingest and aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub identifier: String,
    pub department: String,
    pub final_score: f64,
}

impl StudentRecord {
    pub fn new(identifier: &str, department: &str, final_score: f64) -> Self {
        Self {
            identifier: identifier.to_string(),
            department: department.to_string(),
            final_score,
        }
    }
}

/// Mean final score per department.
///
/// Key order is unspecified. Use [`DepartmentAverages::sorted`] wherever a
/// stable order matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DepartmentAverages {
    pub(crate) inner: HashMap<String, f64>,
}

impl DepartmentAverages {
    pub fn get(&self, department: &str) -> Option<f64> {
        self.inner.get(department).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries ordered by department name.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(String, f64)> for DepartmentAverages {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// A department's legend swatch alongside its average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub department: String,
    pub color: &'static str,
    pub average: f64,
}

/// Full analysis result, written out as JSON.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub records: usize,
    pub skipped_rows: usize,
    pub departments: Vec<LegendEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_orders_by_department() {
        let averages: DepartmentAverages = [
            ("Mathematics".to_string(), 71.0),
            ("Business".to_string(), 64.5),
            ("CS".to_string(), 80.0),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = averages.sorted().into_iter().map(|(d, _)| d).collect();
        assert_eq!(names, vec!["Business", "CS", "Mathematics"]);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let averages: DepartmentAverages = [("CS".to_string(), 80.0)].into_iter().collect();
        let json = serde_json::to_string(&averages).unwrap();
        assert_eq!(json, r#"{"CS":80.0}"#);
    }
}
