//! Decision-tree regressors over the encoded feature representation.
//!
//! Trees are consumed as fitted artifacts: the node structure is supplied
//! at construction and never refitted here. [`RandomForestRegressor`]
//! keeps its members individually addressable so the interval estimator
//! can read the per-tree prediction spread.

pub mod boosted;

pub use boosted::{GradientBoostedRegressor, ObliviousSplit, ObliviousTree, SplitRule};

use crate::error::{NarxError, Result};
use serde::{Deserialize, Serialize};

/// Leaf node carrying the fitted value prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Mean target value of the training samples in this leaf
    pub value: f32,
}

/// Internal node with a split condition and two subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the encoded feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<RegressionTreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition
    Node(RegressionNode),
    /// Leaf node with value prediction
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Depth of the tree rooted at this node; leaves have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Whether every leaf in this subtree carries a finite value.
    fn leaves_finite(&self) -> bool {
        match self {
            RegressionTreeNode::Leaf(leaf) => leaf.value.is_finite(),
            RegressionTreeNode::Node(node) => {
                node.left.leaves_finite() && node.right.leaves_finite()
            }
        }
    }

    /// Largest feature index referenced anywhere in this subtree.
    fn max_feature_idx(&self) -> Option<usize> {
        match self {
            RegressionTreeNode::Leaf(_) => None,
            RegressionTreeNode::Node(node) => {
                let mut max = node.feature_idx;
                if let Some(left) = node.left.max_feature_idx() {
                    max = max.max(left);
                }
                if let Some(right) = node.right.max_feature_idx() {
                    max = max.max(right);
                }
                Some(max)
            }
        }
    }
}

/// Fitted CART regression tree over dense encoded rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: RegressionTreeNode,
}

impl RegressionTree {
    /// Wraps a fitted node structure.
    ///
    /// # Errors
    ///
    /// Returns an error if any leaf carries a non-finite value.
    pub fn from_root(root: RegressionTreeNode) -> Result<Self> {
        if !root.leaves_finite() {
            return Err(NarxError::artifact(
                "regression_tree",
                "non-finite leaf value",
            ));
        }
        Ok(Self { root })
    }

    /// Convenience constructor for a constant (single-leaf) tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is non-finite.
    pub fn constant(value: f32) -> Result<Self> {
        Self::from_root(RegressionTreeNode::Leaf(RegressionLeaf { value }))
    }

    /// Tree depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Largest encoded-feature index any split references, `None` for a
    /// constant tree.
    #[must_use]
    pub fn max_feature_idx(&self) -> Option<usize> {
        self.root.max_feature_idx()
    }

    /// Predicts the value for a single encoded row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is shorter than a referenced feature
    /// index.
    pub fn predict_one(&self, x: &[f32]) -> Result<f32> {
        let mut node = &self.root;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return Ok(leaf.value),
                RegressionTreeNode::Node(internal) => {
                    let value = x.get(internal.feature_idx).ok_or_else(|| {
                        NarxError::inference(
                            "regression_tree",
                            format!(
                                "encoded row has {} columns, split needs index {}",
                                x.len(),
                                internal.feature_idx
                            ),
                        )
                    })?;
                    if *value <= internal.threshold {
                        node = &internal.left;
                    } else {
                        node = &internal.right;
                    }
                }
            }
        }
    }
}

/// Fitted random-forest regressor with individually addressable trees.
///
/// The aggregate prediction is the mean over trees, which is also how the
/// interval estimator defines the forest's point estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Wraps a fitted ensemble of trees.
    ///
    /// # Errors
    ///
    /// Returns an error if the ensemble is empty.
    pub fn from_trees(trees: Vec<RegressionTree>) -> Result<Self> {
        if trees.is_empty() {
            return Err(NarxError::artifact("forest", "ensemble has zero trees"));
        }
        Ok(Self { trees })
    }

    /// Number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// The individual fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// One prediction per tree for a single encoded row.
    ///
    /// # Errors
    ///
    /// Returns an error if any tree rejects the row.
    pub fn tree_predictions(&self, x: &[f32]) -> Result<Vec<f32>> {
        self.trees.iter().map(|tree| tree.predict_one(x)).collect()
    }

    /// Mean prediction across trees for a single encoded row.
    ///
    /// # Errors
    ///
    /// Returns an error if any tree rejects the row.
    pub fn predict_one(&self, x: &[f32]) -> Result<f32> {
        let preds = self.tree_predictions(x)?;
        Ok(crate::stats::mean(&preds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature_idx: usize, threshold: f32, low: f32, high: f32) -> RegressionTree {
        RegressionTree::from_root(RegressionTreeNode::Node(RegressionNode {
            feature_idx,
            threshold,
            left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: low })),
            right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: high })),
        }))
        .expect("finite leaves")
    }

    #[test]
    fn test_leaf_tree_is_constant() {
        let tree = RegressionTree::constant(42.0).expect("finite leaf");
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.max_feature_idx(), None);
        assert_eq!(tree.predict_one(&[]).expect("constant tree"), 42.0);
    }

    #[test]
    fn test_rejects_non_finite_leaf() {
        assert!(RegressionTree::constant(f32::NAN).is_err());
        assert!(RegressionTree::constant(f32::INFINITY).is_err());

        // NaN buried in a subtree is caught too.
        let result = RegressionTree::from_root(RegressionTreeNode::Node(RegressionNode {
            feature_idx: 0,
            threshold: 0.5,
            left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 1.0 })),
            right: Box::new(RegressionTreeNode::Node(RegressionNode {
                feature_idx: 1,
                threshold: 1.0,
                left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: f32::NAN })),
                right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 2.0 })),
            })),
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_nan_leaf_cannot_reach_a_fitted_forest() {
        // A corrupt artifact must fail at wrapping time, before any
        // per-tree prediction sample is aggregated.
        let err = RegressionTree::constant(f32::NAN).unwrap_err();
        assert!(err.to_string().contains("regression_tree"));
        assert!(err.to_string().contains("non-finite"));

        let forest = RandomForestRegressor::from_trees(vec![
            RegressionTree::constant(50_000.0).expect("finite leaf"),
        ])
        .expect("non-empty forest");
        let preds = forest.tree_predictions(&[]).expect("constant trees");
        assert!(preds.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_stump_routes_by_threshold() {
        let tree = stump(1, 50.0, 10.0, 20.0);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_one(&[0.0, 50.0]).expect("valid row"), 10.0);
        assert_eq!(tree.predict_one(&[0.0, 50.1]).expect("valid row"), 20.0);
    }

    #[test]
    fn test_short_row_is_inference_error() {
        let tree = stump(3, 1.0, 0.0, 1.0);
        let err = tree.predict_one(&[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("index 3"));
    }

    #[test]
    fn test_forest_rejects_empty() {
        assert!(RandomForestRegressor::from_trees(vec![]).is_err());
    }

    #[test]
    fn test_forest_point_is_mean_of_trees() {
        let forest = RandomForestRegressor::from_trees(vec![
            RegressionTree::constant(10.0).expect("finite leaf"),
            RegressionTree::constant(20.0).expect("finite leaf"),
            RegressionTree::constant(30.0).expect("finite leaf"),
        ])
        .expect("non-empty forest");

        let preds = forest.tree_predictions(&[0.0]).expect("valid row");
        assert_eq!(preds, vec![10.0, 20.0, 30.0]);
        assert_eq!(forest.predict_one(&[0.0]).expect("valid row"), 20.0);
    }

    #[test]
    fn test_max_feature_idx_spans_subtrees() {
        let tree = RegressionTree::from_root(RegressionTreeNode::Node(RegressionNode {
            feature_idx: 2,
            threshold: 0.5,
            left: Box::new(RegressionTreeNode::Node(RegressionNode {
                feature_idx: 7,
                threshold: 1.0,
                left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 1.0 })),
                right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 2.0 })),
            })),
            right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 3.0 })),
        }))
        .expect("finite leaves");
        assert_eq!(tree.max_feature_idx(), Some(7));
        assert_eq!(tree.depth(), 2);
    }
}
