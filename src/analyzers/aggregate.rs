use crate::analyzers::types::{DepartmentAverages, StudentRecord};
use std::collections::HashMap;
use tracing::debug;

/// Mean of a set of final scores; 0.0 when there are none.
pub fn mean_score(scores: &[f64]) -> f64 {
    match scores.len() {
        0 => 0.0,
        n => scores.iter().sum::<f64>() / n as f64,
    }
}

/// Groups records by department and averages their final scores.
///
/// Pure: the input is only read, and identical input always yields an
/// identical mapping. No rounding is applied here.
pub fn department_averages(records: &[StudentRecord]) -> DepartmentAverages {
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();

    for record in records {
        scores
            .entry(record.department.as_str())
            .or_default()
            .push(record.final_score);
    }

    debug!(
        records = records.len(),
        departments = scores.len(),
        "Computed department groups"
    );

    scores
        .into_iter()
        .map(|(department, series)| (department.to_string(), mean_score(&series)))
        .collect()
}
