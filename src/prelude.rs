//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use narx::prelude::*;
//! ```

pub use crate::cluster::{ClusterAssignment, GeoClusterModel};
pub use crate::engine::{
    Appraisal, ComparableSet, EnsembleResult, LinearPointStrategy, ModelBundle, ModelEstimate,
    PriceEngine,
};
pub use crate::error::{NarxError, Result};
pub use crate::features::{ApartmentFeatures, CategoryCatalog, FeatureVector};
pub use crate::neighbors::{select_k, NeighborIndex};
pub use crate::stats::{histogram, mean, percentile, EmpiricalInterval, Histogram};
pub use crate::traits::PointPredictor;
pub use crate::validate::check_features;
