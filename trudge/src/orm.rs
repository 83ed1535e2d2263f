//! One-rep-max estimation.
//!
//! Every formula is a closed-form transform of (reps, weight). Inputs are not
//! validated: a pole such as Brzycki at 37 reps yields an IEEE-754 infinity
//! (or NaN for zero weight) rather than an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{SetRecord, TrudgeError};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Formula {
    #[default]
    Brzycki,
    Epley,
    Lander,
    Lombardi,
    Mayhew,
    OConner,
    Wathan,
}

impl Formula {
    pub const ALL: [Formula; 7] = [
        Formula::Brzycki,
        Formula::Epley,
        Formula::Lander,
        Formula::Lombardi,
        Formula::Mayhew,
        Formula::OConner,
        Formula::Wathan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Formula::Brzycki => "Brzycki",
            Formula::Epley => "Epley",
            Formula::Lander => "Lander",
            Formula::Lombardi => "Lombardi",
            Formula::Mayhew => "Mayhew",
            Formula::OConner => "OConner",
            Formula::Wathan => "Wathan",
        }
    }

    /// Estimated one-rep max for `reps` repetitions at `weight`.
    pub fn evaluate(&self, reps: u32, weight: f64) -> f64 {
        let r = reps as f64;
        match self {
            Formula::Brzycki => weight * 36.0 / (37.0 - r),
            Formula::Epley => weight * (1.0 + 0.0333 * r),
            Formula::Lander => 100.0 * weight / (101.3 - 2.67123 * r),
            Formula::Lombardi => weight * r.powf(0.1),
            Formula::Mayhew => 100.0 * weight / (52.2 + 41.9 * (-0.055 * r).exp()),
            Formula::OConner => weight * (1.0 + 0.025 * r),
            Formula::Wathan => 100.0 * weight / (48.8 + 53.8 * (-0.075 * r).exp()),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Formula {
    type Err = TrudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '\'')
            .collect::<String>()
            .to_ascii_lowercase();
        Formula::ALL
            .into_iter()
            .find(|f| f.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| TrudgeError::UnsupportedFormula(s.to_string()))
    }
}

/// Estimated one-rep max for a single set.
pub fn orm(reps: u32, weight: f64, formula: Formula) -> f64 {
    formula.evaluate(reps, weight)
}

/// One derived 1RM value per set, in the same order as `sets`.
pub fn orm_series(sets: &[SetRecord], formula: Formula) -> Vec<f64> {
    sets.iter().map(|s| orm(s.reps, s.weight, formula)).collect()
}

/// Best 1RM observation for one lift name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiftMax {
    pub name: String,
    pub time: NaiveDateTime,
    pub orm: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    Name,
    Time,
    #[default]
    Orm,
}

/// Fail when set-level rows and derived values are not index aligned.
pub fn check_shape(sets: &[SetRecord], orms: &[f64]) -> Result<(), TrudgeError> {
    if sets.len() != orms.len() {
        return Err(TrudgeError::ShapeMismatch {
            sets: sets.len(),
            metrics: orms.len(),
        });
    }
    Ok(())
}

/// Reduce per-set 1RM values to the maximum per exact lift name.
///
/// The first row wins on ties. NaN never beats a number; a lift with only
/// NaN values reports its first row. Output is ordered by name.
pub fn orm_per_lift(sets: &[SetRecord], orms: &[f64]) -> Result<Vec<LiftMax>, TrudgeError> {
    check_shape(sets, orms)?;

    let mut best: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, set) in sets.iter().enumerate() {
        let current = best.entry(set.name.as_str()).or_insert(idx);
        let incumbent = orms[*current];
        let candidate = orms[idx];
        if !candidate.is_nan() && (incumbent.is_nan() || candidate > incumbent) {
            *current = idx;
        }
    }

    debug!("reduced {} sets to {} lifts", sets.len(), best.len());
    Ok(best
        .into_values()
        .map(|idx| LiftMax {
            name: sets[idx].name.clone(),
            time: sets[idx].time,
            orm: orms[idx],
        })
        .collect())
}

/// Stable sort of a per-lift summary.
pub fn sort_summary(rows: &mut [LiftMax], field: SortField, ascending: bool) {
    rows.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Time => a.time.cmp(&b.time),
            SortField::Orm => OrderedFloat(a.orm).cmp(&OrderedFloat(b.orm)),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}
