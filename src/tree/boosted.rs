//! Gradient-boosted oblivious trees over the raw feature vector.
//!
//! The boosted model predicts directly on the mixed-type
//! [`FeatureVector`]: categorical cells are handled inside the trees via
//! equality splits, so no external encoding step exists for this model.
//! Each tree is *oblivious* (symmetric): one split condition per level,
//! shared across the whole level, so a depth-d tree has d conditions and
//! 2^d leaves and a prediction is a d-bit leaf lookup.
//!
//! The same structure serves three artifacts: the point-estimate model
//! and the two auxiliary models fitted at the 2.5th and 97.5th
//! conditional quantiles.

use crate::error::{NarxError, Result};
use crate::features::{FeatureVector, FEATURE_COLUMNS};
use crate::traits::PointPredictor;
use serde::{Deserialize, Serialize};

/// Split condition of one oblivious-tree level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitRule {
    /// Numeric cell <= threshold
    LessEq(f32),
    /// Categorical cell equals this label
    Equals(String),
}

/// One level of an oblivious tree: a feature column plus its condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObliviousSplit {
    /// Feature column index into [`FEATURE_COLUMNS`]
    pub column: usize,
    /// Split condition applied to that column
    pub rule: SplitRule,
}

impl ObliviousSplit {
    /// Evaluates the condition on one feature vector.
    fn test(&self, x: &FeatureVector) -> Result<bool> {
        match &self.rule {
            SplitRule::LessEq(threshold) => {
                let v = x.numeric(self.column).ok_or_else(|| {
                    NarxError::inference(
                        "gradient_boosting",
                        format!(
                            "numeric split on non-numeric column `{}`",
                            FEATURE_COLUMNS.get(self.column).unwrap_or(&"?")
                        ),
                    )
                })?;
                Ok(v <= *threshold)
            }
            SplitRule::Equals(label) => {
                let v = x.categorical(self.column).ok_or_else(|| {
                    NarxError::inference(
                        "gradient_boosting",
                        format!(
                            "categorical split on non-categorical column `{}`",
                            FEATURE_COLUMNS.get(self.column).unwrap_or(&"?")
                        ),
                    )
                })?;
                Ok(v == label)
            }
        }
    }
}

/// One fitted oblivious tree: d splits and 2^d leaf values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObliviousTree {
    splits: Vec<ObliviousSplit>,
    leaf_values: Vec<f32>,
}

impl ObliviousTree {
    /// Wraps fitted splits and leaf values.
    ///
    /// # Errors
    ///
    /// Returns an error unless `leaf_values.len() == 2^splits.len()`,
    /// every split references a valid feature column and every leaf value
    /// is finite.
    pub fn new(splits: Vec<ObliviousSplit>, leaf_values: Vec<f32>) -> Result<Self> {
        let expected = 1usize << splits.len();
        if leaf_values.len() != expected {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{expected} leaf values for {} splits", splits.len()),
                actual: format!("{}", leaf_values.len()),
            });
        }
        if leaf_values.iter().any(|v| !v.is_finite()) {
            return Err(NarxError::artifact(
                "gradient_boosting",
                "non-finite leaf value",
            ));
        }
        if let Some(split) = splits.iter().find(|s| s.column >= FEATURE_COLUMNS.len()) {
            return Err(NarxError::artifact(
                "gradient_boosting",
                format!("split references unknown column {}", split.column),
            ));
        }
        Ok(Self {
            splits,
            leaf_values,
        })
    }

    /// Tree depth (number of split levels).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.splits.len()
    }

    /// Predicts the leaf value for one feature vector. Level i contributes
    /// bit i of the leaf index when its condition holds.
    pub fn predict_one(&self, x: &FeatureVector) -> Result<f32> {
        let mut leaf = 0usize;
        for (level, split) in self.splits.iter().enumerate() {
            if split.test(x)? {
                leaf |= 1 << level;
            }
        }
        Ok(self.leaf_values[leaf])
    }
}

/// Fitted gradient-boosted regressor: base score plus shrunken tree sum.
///
/// # Examples
///
/// ```
/// use narx::tree::boosted::{GradientBoostedRegressor, ObliviousSplit, ObliviousTree, SplitRule};
///
/// // A fitted one-tree model: base 50_000, +10_000 when total_area > 60.
/// let tree = ObliviousTree::new(
///     vec![ObliviousSplit { column: 7, rule: SplitRule::LessEq(60.0) }],
///     vec![10_000.0, 0.0],
/// )
/// .unwrap();
/// let model = GradientBoostedRegressor::new(50_000.0, 1.0, vec![tree]).unwrap();
/// assert_eq!(model.n_trees(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    /// Initial prediction before any tree contribution
    base_score: f32,
    /// Shrinkage applied to every tree's contribution
    learning_rate: f32,
    /// Fitted trees, applied in order
    trees: Vec<ObliviousTree>,
}

impl GradientBoostedRegressor {
    /// Wraps a fitted boosted ensemble.
    ///
    /// # Errors
    ///
    /// Returns an error if the ensemble is empty or parameters are not
    /// finite and positive.
    pub fn new(base_score: f32, learning_rate: f32, trees: Vec<ObliviousTree>) -> Result<Self> {
        if trees.is_empty() {
            return Err(NarxError::artifact(
                "gradient_boosting",
                "ensemble has zero trees",
            ));
        }
        if !base_score.is_finite() {
            return Err(NarxError::artifact(
                "gradient_boosting",
                "base_score must be finite",
            ));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NarxError::artifact(
                "gradient_boosting",
                format!("learning_rate must be > 0, got {learning_rate}"),
            ));
        }
        Ok(Self {
            base_score,
            learning_rate,
            trees,
        })
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Base score before tree contributions.
    #[must_use]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Shrinkage factor.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl PointPredictor for GradientBoostedRegressor {
    fn predict_one(&self, x: &FeatureVector) -> Result<f32> {
        let mut raw = self.base_score;
        for tree in &self.trees {
            raw += self.learning_rate * tree.predict_one(x)?;
        }
        Ok(raw)
    }
}
