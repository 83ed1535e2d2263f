//! Human readable labels for log columns.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Time,
    Name,
    Reps,
    Weight,
    Rest,
    Positive,
    Hold,
    Negative,
    Effort,
    Heart,
    Trainer,
    Unilateral,
    Notes,
    Orm,
}

impl Column {
    /// Columns of a raw set row, in file order.
    pub const SET: [Column; 13] = [
        Column::Time,
        Column::Name,
        Column::Reps,
        Column::Weight,
        Column::Rest,
        Column::Positive,
        Column::Hold,
        Column::Negative,
        Column::Effort,
        Column::Heart,
        Column::Trainer,
        Column::Unilateral,
        Column::Notes,
    ];

    /// Columns of a per-lift summary row.
    pub const SUMMARY: [Column; 3] = [Column::Name, Column::Time, Column::Orm];

    pub fn description(&self) -> &'static str {
        match self {
            Column::Time => "Date",
            Column::Name => "Type",
            Column::Reps => "Reps",
            Column::Weight => "Weight",
            Column::Rest => "Rest",
            Column::Positive => "Concentric",
            Column::Hold => "Hold",
            Column::Negative => "Eccentric",
            Column::Effort => "Effort",
            Column::Heart => "Heart Rate",
            Column::Trainer => "Trainer",
            Column::Unilateral => "Unilateral",
            Column::Notes => "Notes",
            Column::Orm => "1 Rep Max",
        }
    }

    pub fn short_description(&self) -> &'static str {
        match self {
            Column::Positive => "Conc",
            Column::Negative => "Ecc",
            Column::Heart => "Heart",
            Column::Trainer => "Coach",
            Column::Unilateral => "Unil",
            Column::Orm => "1RM",
            other => other.description(),
        }
    }

    /// Maximum rendered width for free-text columns.
    pub fn max_width(&self) -> Option<usize> {
        match self {
            Column::Name => Some(24),
            Column::Notes => Some(30),
            _ => None,
        }
    }
}

/// Lookup table of column headers. Built once by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub weight_unit: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            weight_unit: "lb".to_string(),
        }
    }
}

impl Labels {
    pub fn new(weight_unit: impl Into<String>) -> Self {
        Self {
            weight_unit: weight_unit.into(),
        }
    }

    pub fn unit(&self, column: Column) -> Option<&str> {
        match column {
            Column::Weight | Column::Orm => Some(self.weight_unit.as_str()),
            Column::Rest => Some("min"),
            Column::Positive | Column::Hold | Column::Negative => Some("sec"),
            Column::Effort => Some("1-5"),
            Column::Heart => Some("bpm"),
            Column::Trainer | Column::Unilateral => Some("Y/N"),
            Column::Time | Column::Name | Column::Reps | Column::Notes => None,
        }
    }

    /// `"Weight [lb]"`, or the description alone for unitless columns.
    pub fn header(&self, column: Column, newline: bool, short: bool) -> String {
        let desc = if short {
            column.short_description()
        } else {
            column.description()
        };
        match self.unit(column) {
            Some(unit) => {
                let sep = if newline { "\n" } else { " " };
                format!("{}{}[{}]", desc, sep, unit)
            }
            None => desc.to_string(),
        }
    }

    pub fn headers(&self, columns: &[Column], newline: bool, short: bool) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.header(*c, newline, short))
            .collect()
    }
}

/// `"Press:Behind The Neck:Snatch Grip"` becomes
/// `"Snatch Grip Behind The Neck Press"`.
pub fn prettify_name(name: &str) -> String {
    name.split(':').rev().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prettify_name() {
        assert_eq!(
            prettify_name("Press:Behind The Neck:Snatch Grip"),
            "Snatch Grip Behind The Neck Press"
        );
        assert_eq!(prettify_name("Squat"), "Squat");
    }

    #[test]
    fn test_headers() {
        let labels = Labels::default();
        assert_eq!(labels.header(Column::Weight, false, false), "Weight [lb]");
        assert_eq!(labels.header(Column::Orm, true, true), "1RM\n[lb]");
        assert_eq!(labels.header(Column::Name, false, false), "Type");
        assert_eq!(labels.header(Column::Trainer, false, true), "Coach [Y/N]");

        let metric = Labels::new("kg");
        assert_eq!(
            metric.headers(&Column::SUMMARY, false, false),
            vec!["Type", "Date", "1 Rep Max [kg]"]
        );
    }
}
