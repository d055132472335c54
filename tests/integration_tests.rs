use dept_scores::analyzers::types::DepartmentAverages;
use dept_scores::error::{LoadError, RowIssue};
use dept_scores::ingest::{IngestOptions, MissingScorePolicy, load};
use dept_scores::output::{build_report, export_csv};
use dept_scores::session::AnalysisSession;
use std::collections::HashMap;
use std::env;
use std::fs;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/students.csv");

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

fn temp_path(name: &str) -> String {
    format!("{}/{}", env::temp_dir().display(), name)
}

/// Reads back the two columns written by `export_csv`.
fn read_exported(path: &str) -> HashMap<String, f64> {
    let mut rdr = csv::Reader::from_path(path).expect("Failed to open export");
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Department", "Average Final Score"]);

    rdr.records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].parse::<f64>().unwrap())
        })
        .collect()
}

#[test]
fn test_full_pipeline() {
    let dataset = load(FIXTURE, &IngestOptions::default()).expect("Failed to load fixture");

    // S1007 is too short; S1006 keeps a 0.0 score.
    assert_eq!(dataset.len(), 8);
    assert_eq!(dataset.skipped_rows(), 1);
    assert!(
        dataset
            .issues()
            .iter()
            .any(|i| matches!(i, RowIssue::InvalidScore { raw, .. } if raw == "abc"))
    );

    let averages = dataset.averages();
    assert_eq!(averages.len(), 4);
    assert!(close(averages.get("Engineering").unwrap(), (57.82 + 45.8) / 2.0, 1e-9));
    assert!(close(averages.get("Business").unwrap(), 93.68 / 2.0, 1e-9));
    assert!(close(averages.get("Mathematics").unwrap(), (80.63 + 69.37) / 2.0, 1e-9));
    assert!(close(averages.get("CS").unwrap(), (78.89 + 60.0) / 2.0, 1e-9));
}

#[test]
fn test_quoted_name_does_not_shift_columns() {
    let dataset = load(FIXTURE, &IngestOptions::default()).unwrap();
    let record = dataset
        .records()
        .iter()
        .find(|r| r.identifier == "S1005")
        .expect("S1005 should be loaded");

    assert_eq!(record.department, "CS");
    assert_eq!(record.final_score, 60.0);
}

#[test]
fn test_global_mean_policy_on_fixture() {
    let options = IngestOptions {
        missing_score: MissingScorePolicy::GlobalMean,
    };
    let dataset = load(FIXTURE, &options).unwrap();

    let valid = [57.82, 45.8, 93.68, 80.63, 78.89, 60.0, 69.37];
    let global = valid.iter().sum::<f64>() / valid.len() as f64;

    let business = dataset.averages().get("Business").unwrap();
    assert!(close(business, (93.68 + global) / 2.0, 1e-9));
}

#[test]
fn test_export_round_trip() {
    let dataset = load(FIXTURE, &IngestOptions::default()).unwrap();
    let averages = dataset.averages();

    let path = temp_path("dept_scores_round_trip.csv");
    let _ = fs::remove_file(&path);
    export_csv(&path, &averages).unwrap();

    let reread = read_exported(&path);
    assert_eq!(reread.len(), averages.len());
    for (department, average) in averages.iter() {
        let exported = reread[department];
        assert!(close(exported, average, 0.005 + 1e-9));
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_column_leaves_no_records() {
    let path = temp_path("dept_scores_missing_column.csv");
    fs::write(&path, "Student_ID,Department,Score\nS1,CS,90\n").unwrap();

    let mut session = AnalysisSession::default();
    let err = session.load(&path).unwrap_err();

    assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "Final_Score"));
    assert!(session.dataset().is_none());
    assert_eq!(session.averages(), DepartmentAverages::default());

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_report_lists_departments_with_colors() {
    let dataset = load(FIXTURE, &IngestOptions::default()).unwrap();
    let report = build_report(&dataset);

    assert_eq!(report.records, 8);
    assert_eq!(report.loaded_at, dataset.loaded_at());
    assert!(report.generated_at >= report.loaded_at);
    assert_eq!(report.skipped_rows, 1);
    let names: Vec<_> = report.departments.iter().map(|d| d.department.as_str()).collect();
    assert_eq!(names, vec!["Business", "CS", "Engineering", "Mathematics"]);
    assert_eq!(report.departments[1].color, "#ADD8E6");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["departments"][0]["department"], "Business");
}
