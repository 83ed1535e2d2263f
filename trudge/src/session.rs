//! Workout session grouping for presentation.
//!
//! A session is a maximal run of consecutive rows with the same timestamp.
//! Grouping is positional: a timestamp that reappears after a different one
//! starts a new session, so out-of-order logs yield more sessions than a
//! human reader might count.

use std::ops::Range;

use crate::SetRecord;

/// Maximal runs of equal consecutive keys, as index ranges.
pub fn contiguous_runs<T: PartialEq>(keys: &[T]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    for idx in 1..=keys.len() {
        if idx == keys.len() || keys[idx] != keys[start] {
            runs.push(start..idx);
            start = idx;
        }
    }
    runs
}

/// Session boundaries of `sets` in file order.
pub fn session_clusters(sets: &[SetRecord]) -> Vec<Range<usize>> {
    let times: Vec<_> = sets.iter().map(|s| s.time).collect();
    contiguous_runs(&times)
}
