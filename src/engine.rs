//! The ensemble prediction and uncertainty quantification engine.
//!
//! [`PriceEngine`] owns an immutable [`ModelBundle`] injected at
//! construction and turns one feature vector into a consensus price,
//! three per-model 95% empirical intervals and a comparable-listing
//! analysis. One request is one sequential pass; any model failure
//! aborts the whole request because a partially failed ensemble cannot
//! produce a meaningful uncertainty report.

use crate::cluster::{ClusterAssignment, GeoClusterModel};
use crate::error::{NarxError, Result};
use crate::features::{ApartmentFeatures, CategoryCatalog, FeatureVector};
use crate::neighbors::{select_k, NeighborIndex, MAX_NEIGHBORS};
use crate::pipeline::{ForestPipeline, LinearBagging, LinearPipeline};
use crate::preprocessing::{dummy_row, reindex, StandardScaler};
use crate::stats::{histogram, EmpiricalInterval, Histogram};
use crate::traits::PointPredictor;
use crate::tree::GradientBoostedRegressor;
use serde::{Deserialize, Serialize};

/// Model name of the boosted-tree ensemble member.
pub const GRADIENT_BOOSTING: &str = "gradient_boosting";
/// Model name of the forest-pipeline ensemble member.
pub const RANDOM_FOREST: &str = "random_forest";
/// Model name of the linear ensemble member.
pub const LINEAR_ENSEMBLE: &str = "linear_ensemble";

/// How the linear member's point estimate is defined.
///
/// The interval always comes from the bagging spread; the two strategies
/// differ only in the point value reported inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinearPointStrategy {
    /// Mean across the bagging members. Keeps lower <= point <= upper by
    /// construction.
    #[default]
    BaggedMean,
    /// The standalone linear pipeline's own prediction.
    SingleModel,
}

/// Point estimate and 95% empirical interval of one ensemble member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    /// Stable model name
    pub model_name: String,
    /// The member's point estimate
    pub point_estimate: f32,
    /// 2.5th-percentile bound
    pub lower_bound: f32,
    /// 97.5th-percentile bound
    pub upper_bound: f32,
}

/// Consensus estimate plus the three member estimates, in fixed order:
/// boosted trees, forest, linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    /// Unweighted mean of the three point estimates
    pub consensus_estimate: f32,
    /// The per-member estimates
    pub estimates: Vec<ModelEstimate>,
}

/// Summary of the k comparable listings nearest to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSet {
    /// Chosen neighborhood size
    pub k: usize,
    /// Historical prices of the k neighbors, closest first
    pub neighbor_values: Vec<f32>,
    /// Mean neighbor price
    pub mean: f32,
    /// 2.5th percentile of the neighbor prices
    pub lower_95: f32,
    /// 97.5th percentile of the neighbor prices
    pub upper_95: f32,
}

impl ComparableSet {
    /// Distribution of the neighbor prices, for the reporting adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_bins` is zero.
    pub fn histogram(&self, n_bins: usize) -> Result<Histogram> {
        histogram(&self.neighbor_values, n_bins)
    }
}

/// Full result of one appraisal request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    /// Cluster the apartment's coordinates were assigned to
    pub cluster: ClusterAssignment,
    /// Consensus estimate and per-model intervals
    pub ensemble: EnsembleResult,
    /// Comparable-listing analysis keyed off the consensus estimate
    pub comparables: ComparableSet,
}

/// The complete set of fitted artifacts the engine serves from.
///
/// Constructed once by an external loader and injected into
/// [`PriceEngine::new`]; immutable and shareable across concurrent
/// requests thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Boosted-tree point-estimate model
    pub boosted: GradientBoostedRegressor,
    /// Auxiliary boosted model fitted at the 2.5th conditional quantile
    pub boosted_lower: GradientBoostedRegressor,
    /// Auxiliary boosted model fitted at the 97.5th conditional quantile
    pub boosted_upper: GradientBoostedRegressor,
    /// Preprocessing + random forest pipeline
    pub forest: ForestPipeline,
    /// Preprocessing + standalone linear model pipeline
    pub linear: LinearPipeline,
    /// Bagging ensemble of independently fitted linear models
    pub linear_bagging: LinearBagging,
    /// Fitted geographic clustering
    pub geo_clusters: GeoClusterModel,
    /// Allowed values per categorical field
    pub catalog: CategoryCatalog,
    /// Scaler for the numeric subset of the neighbor encoding
    pub neighbor_scaler: StandardScaler,
    /// Fitted nearest-neighbor index with its column universe and targets
    pub neighbors: NeighborIndex,
}

/// The appraisal engine. See the module docs for the request data flow.
#[derive(Debug, Clone)]
pub struct PriceEngine {
    bundle: ModelBundle,
    linear_strategy: LinearPointStrategy,
}

impl PriceEngine {
    /// Builds an engine over a loaded artifact bundle.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the historical set is smaller
    /// than the largest adaptive neighborhood size; the engine must not
    /// start serving requests from such a bundle.
    pub fn new(bundle: ModelBundle) -> Result<Self> {
        if bundle.neighbors.n_rows() < MAX_NEIGHBORS {
            return Err(NarxError::artifact(
                "neighbor_index",
                format!(
                    "historical set has {} rows, adaptive k requires at least {MAX_NEIGHBORS}",
                    bundle.neighbors.n_rows()
                ),
            ));
        }
        Ok(Self {
            bundle,
            linear_strategy: LinearPointStrategy::default(),
        })
    }

    /// Selects how the linear member's point estimate is defined.
    #[must_use]
    pub fn with_linear_strategy(mut self, strategy: LinearPointStrategy) -> Self {
        self.linear_strategy = strategy;
        self
    }

    /// The loaded artifact bundle.
    #[must_use]
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Assigns the geographic cluster for a coordinate pair.
    #[must_use]
    pub fn assign_cluster(&self, latitude: f32, longitude: f32) -> ClusterAssignment {
        self.bundle.geo_clusters.approximate_predict(latitude, longitude)
    }

    /// Builds the canonical feature vector for validated attributes,
    /// resolving the cluster assignment from the coordinates.
    #[must_use]
    pub fn build_features(&self, features: &ApartmentFeatures) -> FeatureVector {
        let cluster = self.assign_cluster(features.latitude, features.longitude);
        FeatureVector::from_parts(features, cluster)
    }

    /// Runs all three models and their interval estimators on one
    /// feature vector.
    ///
    /// The forest and linear point estimates are the means of the same
    /// samples whose percentiles form their bounds, so those intervals
    /// bracket their point estimates by construction. The consensus is
    /// finalized only after all three points are.
    ///
    /// # Errors
    ///
    /// Any member failure aborts the request; no partial result is
    /// returned.
    pub fn predict_ensemble(&self, x: &FeatureVector) -> Result<EnsembleResult> {
        // Boosted trees: dedicated conditional-quantile models give the
        // bounds verbatim.
        let boosted_point = self.bundle.boosted.predict_one(x)?;
        let boosted_lower = self.bundle.boosted_lower.predict_one(x)?;
        let boosted_upper = self.bundle.boosted_upper.predict_one(x)?;

        // Forest: percentiles of the per-tree spread on the preprocessed
        // row; the point estimate is redefined as the same sample's mean.
        let tree_sample = self.bundle.forest.tree_predictions(x)?;
        let forest = EmpiricalInterval::from_sample(&tree_sample)?;

        // Linear: percentiles of the bagging spread; point per strategy.
        let member_sample = self.bundle.linear_bagging.member_predictions(x)?;
        let bagging = EmpiricalInterval::from_sample(&member_sample)?;
        let linear_point = match self.linear_strategy {
            LinearPointStrategy::BaggedMean => bagging.mean,
            LinearPointStrategy::SingleModel => self.bundle.linear.predict_one(x)?,
        };

        let consensus_estimate = (boosted_point + forest.mean + linear_point) / 3.0;
        if !consensus_estimate.is_finite() {
            return Err(NarxError::inference(
                "ensemble",
                format!("non-finite consensus estimate {consensus_estimate}"),
            ));
        }

        Ok(EnsembleResult {
            consensus_estimate,
            estimates: vec![
                ModelEstimate {
                    model_name: GRADIENT_BOOSTING.to_string(),
                    point_estimate: boosted_point,
                    lower_bound: boosted_lower,
                    upper_bound: boosted_upper,
                },
                ModelEstimate {
                    model_name: RANDOM_FOREST.to_string(),
                    point_estimate: forest.mean,
                    lower_bound: forest.lower,
                    upper_bound: forest.upper,
                },
                ModelEstimate {
                    model_name: LINEAR_ENSEMBLE.to_string(),
                    point_estimate: linear_point,
                    lower_bound: bagging.lower,
                    upper_bound: bagging.upper,
                },
            ],
        })
    }

    /// Retrieves and summarizes the comparable listings for one feature
    /// vector, with the neighborhood size keyed off the consensus
    /// estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the neighbor encoding or the index query
    /// fails.
    pub fn find_comparables(
        &self,
        x: &FeatureVector,
        consensus_estimate: f32,
    ) -> Result<ComparableSet> {
        let row = dummy_row(x, &self.bundle.neighbor_scaler)?;
        let query = reindex(&row, self.bundle.neighbors.columns());

        let k = select_k(consensus_estimate);
        let indices = self.bundle.neighbors.kneighbors(&query, k)?;
        let neighbor_values = self.bundle.neighbors.gather_targets(&indices)?;
        let summary = EmpiricalInterval::from_sample(&neighbor_values)?;

        Ok(ComparableSet {
            k,
            neighbor_values,
            mean: summary.mean,
            lower_95: summary.lower,
            upper_95: summary.upper,
        })
    }

    /// Full appraisal pass: cluster assignment, feature vector, ensemble
    /// with intervals, then comparables keyed off the consensus.
    ///
    /// Assumes the attributes already satisfy the inbound contract
    /// ([`crate::validate::check_features`]).
    ///
    /// # Errors
    ///
    /// Propagates the first failure of any stage; the request has no
    /// partial result.
    pub fn appraise(&self, features: &ApartmentFeatures) -> Result<Appraisal> {
        let cluster = self.assign_cluster(features.latitude, features.longitude);
        let x = FeatureVector::from_parts(features, cluster);
        let ensemble = self.predict_ensemble(&x)?;
        let comparables = self.find_comparables(&x, ensemble.consensus_estimate)?;
        Ok(Appraisal {
            cluster,
            ensemble,
            comparables,
        })
    }
}
