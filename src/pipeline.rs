//! Preprocessing-composed model pipelines.
//!
//! The forest and linear models were trained on the encoded
//! representation, so each ships as a pipeline: the fitted
//! [`TabularEncoder`] composed with the fitted model. Pipelines expose
//! their members individually (trees, bagging estimators) so the interval
//! estimator can read the per-member prediction spread on the
//! *preprocessed* row, exactly as the models saw it in training.

use crate::error::{NarxError, Result};
use crate::features::FeatureVector;
use crate::linear::LinearRegressor;
use crate::preprocessing::TabularEncoder;
use crate::traits::PointPredictor;
use crate::tree::RandomForestRegressor;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random-forest regressor composed with its preprocessing transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestPipeline {
    encoder: TabularEncoder,
    forest: RandomForestRegressor,
}

impl ForestPipeline {
    /// Composes a fitted encoder with a fitted forest.
    ///
    /// # Errors
    ///
    /// Returns an error if any tree references an encoded column the
    /// encoder does not produce.
    pub fn new(encoder: TabularEncoder, forest: RandomForestRegressor) -> Result<Self> {
        let width = encoder.n_output();
        for tree in forest.trees() {
            if let Some(max_idx) = tree.max_feature_idx() {
                if max_idx >= width {
                    return Err(NarxError::artifact(
                        "forest",
                        format!("tree splits on column {max_idx}, encoder emits {width}"),
                    ));
                }
            }
        }
        Ok(Self { encoder, forest })
    }

    /// The composed forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    /// The fitted preprocessing transform.
    #[must_use]
    pub fn encoder(&self) -> &TabularEncoder {
        &self.encoder
    }

    /// One prediction per tree on the preprocessed row.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any tree prediction fails.
    pub fn tree_predictions(&self, x: &FeatureVector) -> Result<Vec<f32>> {
        let encoded = self.encoder.encode(x)?;
        self.forest
            .trees()
            .par_iter()
            .map(|tree| tree.predict_one(&encoded))
            .collect()
    }
}

impl PointPredictor for ForestPipeline {
    fn predict_one(&self, x: &FeatureVector) -> Result<f32> {
        let encoded = self.encoder.encode(x)?;
        self.forest.predict_one(&encoded)
    }
}

/// Linear regressor composed with the same preprocessing transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPipeline {
    encoder: TabularEncoder,
    model: LinearRegressor,
}

impl LinearPipeline {
    /// Composes a fitted encoder with a fitted linear model.
    ///
    /// # Errors
    ///
    /// Returns an error on encoder/model width mismatch.
    pub fn new(encoder: TabularEncoder, model: LinearRegressor) -> Result<Self> {
        if model.n_features() != encoder.n_output() {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} encoded columns", encoder.n_output()),
                actual: format!("{} coefficients", model.n_features()),
            });
        }
        Ok(Self { encoder, model })
    }

    /// The composed linear model.
    #[must_use]
    pub fn model(&self) -> &LinearRegressor {
        &self.model
    }
}

impl PointPredictor for LinearPipeline {
    fn predict_one(&self, x: &FeatureVector) -> Result<f32> {
        let encoded = self.encoder.encode(x)?;
        self.model.predict_one(&encoded)
    }
}

/// Bagging ensemble of independently fitted linear models sharing one
/// preprocessing transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearBagging {
    encoder: TabularEncoder,
    members: Vec<LinearRegressor>,
}

impl LinearBagging {
    /// Composes a fitted encoder with the fitted bagging members.
    ///
    /// # Errors
    ///
    /// Returns an error if the ensemble is empty or any member's width
    /// mismatches the encoder.
    pub fn new(encoder: TabularEncoder, members: Vec<LinearRegressor>) -> Result<Self> {
        if members.is_empty() {
            return Err(NarxError::artifact(
                "linear_bagging",
                "ensemble has zero members",
            ));
        }
        let width = encoder.n_output();
        if let Some(bad) = members.iter().find(|m| m.n_features() != width) {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{width} encoded columns"),
                actual: format!("{} coefficients", bad.n_features()),
            });
        }
        Ok(Self { encoder, members })
    }

    /// Number of bagging members.
    #[must_use]
    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    /// The individual fitted members.
    #[must_use]
    pub fn members(&self) -> &[LinearRegressor] {
        &self.members
    }

    /// One prediction per member on the preprocessed row.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any member prediction fails.
    pub fn member_predictions(&self, x: &FeatureVector) -> Result<Vec<f32>> {
        let encoded = self.encoder.encode(x)?;
        self.members
            .par_iter()
            .map(|member| member.predict_one(&encoded))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterAssignment;
    use crate::features::ApartmentFeatures;
    use crate::tree::{RegressionLeaf, RegressionNode, RegressionTree, RegressionTreeNode};

    fn encoder() -> TabularEncoder {
        TabularEncoder::from_categories(vec![
            vec!["105-series".to_string()],
            vec!["panel".to_string(), "brick".to_string()],
            vec!["central".to_string()],
            vec!["good".to_string()],
            vec!["0".to_string(), "-1".to_string()],
        ])
        .expect("valid categories")
    }

    fn sample_vector() -> FeatureVector {
        let features = ApartmentFeatures {
            room_count: 2,
            total_area: 65.0,
            floor: 5,
            total_floors: 9,
            latitude: 42.8758,
            longitude: 74.6037,
            house_series: "105-series".to_string(),
            house_material: "panel".to_string(),
            heating_type: "central".to_string(),
            condition: "good".to_string(),
        };
        FeatureVector::from_parts(&features, ClusterAssignment::Cluster(0))
    }

    fn area_stump(threshold: f32, low: f32, high: f32) -> RegressionTree {
        // total_area is encoded column 5 (sixth numeric passthrough)
        RegressionTree::from_root(RegressionTreeNode::Node(RegressionNode {
            feature_idx: 5,
            threshold,
            left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: low })),
            right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: high })),
        }))
        .expect("finite leaves")
    }

    #[test]
    fn test_forest_pipeline_predicts_mean_over_trees() {
        let forest = RandomForestRegressor::from_trees(vec![
            area_stump(60.0, 40_000.0, 60_000.0),
            area_stump(70.0, 42_000.0, 66_000.0),
        ])
        .expect("non-empty forest");
        let pipeline = ForestPipeline::new(encoder(), forest).expect("consistent widths");

        let preds = pipeline
            .tree_predictions(&sample_vector())
            .expect("valid vector");
        // area = 65: first stump goes right, second goes left
        assert_eq!(preds, vec![60_000.0, 42_000.0]);
        assert_eq!(
            pipeline.predict_one(&sample_vector()).expect("valid vector"),
            51_000.0
        );
    }

    #[test]
    fn test_forest_pipeline_rejects_out_of_range_split() {
        let width = encoder().n_output();
        let tree = RegressionTree::from_root(RegressionTreeNode::Node(RegressionNode {
            feature_idx: width, // one past the end
            threshold: 0.0,
            left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 0.0 })),
            right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: 1.0 })),
        }))
        .expect("finite leaves");
        let forest = RandomForestRegressor::from_trees(vec![tree]).expect("non-empty");
        assert!(ForestPipeline::new(encoder(), forest).is_err());
    }

    #[test]
    fn test_linear_pipeline_width_checked() {
        let enc = encoder();
        let good = LinearRegressor::from_params(vec![1.0; enc.n_output()], 0.0).expect("valid");
        assert!(LinearPipeline::new(enc.clone(), good).is_ok());

        let bad = LinearRegressor::from_params(vec![1.0; 3], 0.0).expect("valid");
        assert!(LinearPipeline::new(enc, bad).is_err());
    }

    #[test]
    fn test_linear_pipeline_predicts_on_encoded_row() {
        let enc = encoder();
        let mut coefficients = vec![0.0; enc.n_output()];
        coefficients[5] = 1_000.0; // total_area
        let model = LinearRegressor::from_params(coefficients, 5_000.0).expect("valid");
        let pipeline = LinearPipeline::new(enc, model).expect("consistent widths");
        assert_eq!(
            pipeline.predict_one(&sample_vector()).expect("valid vector"),
            70_000.0
        );
    }

    #[test]
    fn test_bagging_member_spread() {
        let enc = encoder();
        let width = enc.n_output();
        let members: Vec<LinearRegressor> = [1_000.0, 1_100.0, 900.0]
            .iter()
            .map(|&w| {
                let mut coefficients = vec![0.0; width];
                coefficients[5] = w / 65.0; // scale so prediction == w at area 65
                LinearRegressor::from_params(coefficients, 0.0).expect("valid")
            })
            .collect();
        let bagging = LinearBagging::new(enc, members).expect("valid ensemble");

        let preds = bagging
            .member_predictions(&sample_vector())
            .expect("valid vector");
        assert_eq!(preds.len(), 3);
        assert!((preds[0] - 1_000.0).abs() < 1e-2);
        assert!((preds[1] - 1_100.0).abs() < 1e-2);
        assert!((preds[2] - 900.0).abs() < 1e-2);
    }

    #[test]
    fn test_bagging_rejects_empty_or_mismatched() {
        let enc = encoder();
        assert!(LinearBagging::new(enc.clone(), vec![]).is_err());
        let bad = LinearRegressor::from_params(vec![1.0], 0.0).expect("valid");
        assert!(LinearBagging::new(enc, vec![bad]).is_err());
    }
}
