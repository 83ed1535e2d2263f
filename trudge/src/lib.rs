//! Workout log loading and one-rep-max estimation.

use std::path::PathBuf;

use thiserror::Error;

pub mod display;
pub mod orm;
pub mod record;
pub mod session;
pub mod summary;

pub use display::{prettify_name, Column, Labels};
pub use orm::{orm, orm_per_lift, orm_series, sort_summary, Formula, LiftMax, SortField};
pub use record::{load, load_from_reader, SetRecord, COLUMNS};
pub use session::{contiguous_runs, session_clusters};
pub use summary::{read_summary_csv, write_summary, write_summary_csv, write_summary_json};

#[derive(Error, Debug)]
pub enum TrudgeError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema mismatch{}: expected {expected} columns, found {found}", row_suffix(.row))]
    Schema {
        row: Option<usize>,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: cannot parse {field} from '{value}': {reason}")]
    FieldParse {
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("row {row}: invalid effort value '{value}' (expected 1-5)")]
    InvalidEffort { row: usize, value: String },
    #[error("row {row}: invalid {field} flag '{value}' (expected Y or N)")]
    InvalidFlag {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("unsupported formula: {0}")]
    UnsupportedFormula(String),
    #[error("shape mismatch: {sets} sets but {metrics} derived values")]
    ShapeMismatch { sets: usize, metrics: usize },
    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" at row {}", row),
        None => " in header".to_string(),
    }
}

/// Mask of rows whose lift name starts with `prefix`.
pub fn name_mask(sets: &[SetRecord], prefix: &str) -> Vec<bool> {
    sets.iter().map(|s| s.name.starts_with(prefix)).collect()
}

/// Indices of rows whose lift name starts with `prefix`, in file order.
pub fn filter_by_prefix(sets: &[SetRecord], prefix: &str) -> Vec<usize> {
    name_mask(sets, prefix)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, keep)| keep.then_some(idx))
        .collect()
}

/// Sorted, de-duplicated lift names.
pub fn lift_names(sets: &[SetRecord]) -> Vec<String> {
    let mut names: Vec<String> = sets.iter().map(|s| s.name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn set(name: &str) -> SetRecord {
        SetRecord {
            time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            name: name.to_string(),
            reps: 5,
            weight: 100.0,
            rest: 2.0,
            positive: 1,
            hold: 0,
            negative: 2,
            effort: 3,
            heart: None,
            trainer: false,
            unilateral: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_filter_by_prefix_matches_hierarchy() {
        let sets = vec![
            set("Press:Behind The Neck"),
            set("Squat:Front"),
            set("Press:Overhead"),
            set("Pressure"),
        ];
        assert_eq!(filter_by_prefix(&sets, "Press:"), vec![0, 2]);
        assert_eq!(name_mask(&sets, "Squat"), vec![false, true, false, false]);
    }

    #[test]
    fn test_lift_names_sorted_unique() {
        let sets = vec![set("Squat"), set("Bench"), set("Squat")];
        assert_eq!(lift_names(&sets), vec!["Bench", "Squat"]);
    }

    #[test]
    fn test_schema_error_message() {
        let err = TrudgeError::Schema {
            row: None,
            expected: 13,
            found: 12,
        };
        assert_eq!(
            err.to_string(),
            "schema mismatch in header: expected 13 columns, found 12"
        );
    }
}
