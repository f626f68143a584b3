//! Core capability traits for the appraisal engine.

use crate::error::Result;
use crate::features::FeatureVector;

/// Capability shared by every ensemble member: turn one feature vector
/// into one price estimate.
///
/// All three top-level models (boosted trees, forest pipeline, linear
/// pipeline) implement this, which is the only polymorphism the ensemble
/// combiner relies on. Implementations are fitted, read-only artifacts;
/// `predict_one` takes `&self` and is safe to call concurrently.
pub trait PointPredictor {
    /// Predicts the target value for a single feature vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the fitted model cannot score the vector
    /// (shape or type mismatch with its training contract). The engine
    /// treats any such failure as fatal for the whole request.
    fn predict_one(&self, x: &FeatureVector) -> Result<f32>;
}
