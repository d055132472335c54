use crate::analyzers::types::{DepartmentAverages, LegendEntry};

/// Colour used for any department without a dedicated swatch.
pub const DEFAULT_COLOR: &str = "#808080";

/// Maps a department name to its legend colour.
///
/// | Department  | Colour  |
/// |-------------|---------|
/// | CS          | #ADD8E6 |
/// | Mathematics | #FF0000 |
/// | Engineering | #008000 |
/// | Business    | #FFD700 |
/// | (other)     | #808080 |
pub fn department_color(department: &str) -> &'static str {
    match department.trim() {
        "CS" => "#ADD8E6",
        "Mathematics" => "#FF0000",
        "Engineering" => "#008000",
        "Business" => "#FFD700",
        _ => DEFAULT_COLOR,
    }
}

/// Builds legend entries for every department, ordered by name.
pub fn legend(averages: &DepartmentAverages) -> Vec<LegendEntry> {
    averages
        .sorted()
        .into_iter()
        .map(|(department, average)| LegendEntry {
            department: department.to_string(),
            color: department_color(department),
            average,
        })
        .collect()
}
