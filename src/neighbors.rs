//! Comparable-listing retrieval over the fitted neighbor index.
//!
//! The index holds the scaled, one-hot encoded historical listings and
//! their sale prices. Lookups are exact k-nearest-neighbor queries by
//! Euclidean distance; the neighborhood size adapts to the predicted
//! price band because comparable listings are denser at lower price
//! points in the target market.

use crate::error::{NarxError, Result};
use serde::{Deserialize, Serialize};

/// Largest neighborhood size [`select_k`] can return; the historical set
/// must hold at least this many rows.
pub const MAX_NEIGHBORS: usize = 30;

/// Adaptive neighborhood size, a pure step function of the consensus
/// estimate (thresholds inclusive on the lower side).
///
/// # Examples
///
/// ```
/// use narx::neighbors::select_k;
///
/// assert_eq!(select_k(100_000.0), 30);
/// assert_eq!(select_k(100_001.0), 20);
/// assert_eq!(select_k(400_001.0), 5);
/// ```
#[must_use]
pub fn select_k(consensus_estimate: f32) -> usize {
    if consensus_estimate <= 100_000.0 {
        30
    } else if consensus_estimate <= 250_000.0 {
        20
    } else if consensus_estimate <= 400_000.0 {
        10
    } else {
        5
    }
}

/// Fitted exact nearest-neighbor index over encoded historical listings.
///
/// Stores the training-time column universe so single-row encodings can
/// be reindexed onto it before querying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborIndex {
    columns: Vec<String>,
    rows: Vec<Vec<f32>>,
    targets: Vec<f32>,
}

impl NeighborIndex {
    /// Wraps the fitted index data.
    ///
    /// # Errors
    ///
    /// Returns an error if rows/targets are empty or mismatched, or any
    /// row's width differs from the column universe.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f32>>, targets: Vec<f32>) -> Result<Self> {
        if columns.is_empty() {
            return Err(NarxError::artifact("neighbor_index", "empty column universe"));
        }
        if rows.is_empty() {
            return Err(NarxError::artifact("neighbor_index", "no historical rows"));
        }
        if rows.len() != targets.len() {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} targets", rows.len()),
                actual: format!("{}", targets.len()),
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} columns per row", columns.len()),
                actual: format!("{}", bad.len()),
            });
        }
        Ok(Self {
            columns,
            rows,
            targets,
        })
    }

    /// Training-time column universe, in fitted order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of historical rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Historical target prices, aligned with the rows.
    #[must_use]
    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    /// Indices of the `k` nearest rows to the query, closest first.
    /// Distance ties break on the lower row index.
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is zero or exceeds the row count, or the
    /// query width mismatches the column universe.
    pub fn kneighbors(&self, query: &[f32], k: usize) -> Result<Vec<usize>> {
        if k == 0 || k > self.rows.len() {
            return Err(NarxError::InvalidParameter {
                param: "k".to_string(),
                value: format!("{k}"),
                constraint: format!("1..={}", self.rows.len()),
            });
        }
        if query.len() != self.columns.len() {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} columns", self.columns.len()),
                actual: format!("{}", query.len()),
            });
        }

        let mut by_distance: Vec<(f32, usize)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let dist: f32 = row
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (dist, i)
            })
            .collect();

        by_distance.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .expect("distances should be comparable (not NaN)")
                .then(a.1.cmp(&b.1))
        });

        Ok(by_distance.into_iter().take(k).map(|(_, i)| i).collect())
    }

    /// Target prices of the given row indices, in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error on an out-of-range index.
    pub fn gather_targets(&self, indices: &[usize]) -> Result<Vec<f32>> {
        indices
            .iter()
            .map(|&i| {
                self.targets.get(i).copied().ok_or_else(|| {
                    NarxError::inference(
                        "neighbor_index",
                        format!("row index {i} out of range (n={})", self.targets.len()),
                    )
                })
            })
            .collect()
    }
}
