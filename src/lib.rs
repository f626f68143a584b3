//! Narx: ensemble price appraisal with uncertainty quantification.
//!
//! Narx turns one apartment listing into a consensus price estimate,
//! per-model 95% empirical intervals and a comparable-listing analysis.
//! Three fitted model families run side by side — gradient-boosted
//! oblivious trees, a random-forest pipeline and a bagging ensemble of
//! linear models — and the spread of each ensemble's members is the
//! uncertainty estimate.
//!
//! All artifacts are fitted offline; this crate serves inference over an
//! immutable [`engine::ModelBundle`] injected at engine construction.
//!
//! # Quick Start
//!
//! ```
//! use narx::prelude::*;
//! use narx::synthetic::demo_bundle;
//!
//! let engine = PriceEngine::new(demo_bundle(42)).unwrap();
//!
//! let features = ApartmentFeatures {
//!     room_count: 2,
//!     total_area: 65.0,
//!     floor: 5,
//!     total_floors: 9,
//!     latitude: 42.8758,
//!     longitude: 74.6037,
//!     house_series: "105-series".to_string(),
//!     house_material: "panel".to_string(),
//!     heating_type: "central".to_string(),
//!     condition: "good".to_string(),
//! };
//! check_features(&features, &engine.bundle().catalog).unwrap();
//!
//! let appraisal = engine.appraise(&features).unwrap();
//! assert_eq!(appraisal.ensemble.estimates.len(), 3);
//! assert!(appraisal.ensemble.consensus_estimate.is_finite());
//! ```
//!
//! # Modules
//!
//! - [`features`]: Apartment attributes and the canonical feature vector
//! - [`validate`]: Inbound precondition contract (ranges, bounding box, catalogs)
//! - [`cluster`]: Geographic cluster assignment over fitted exemplars
//! - [`preprocessing`]: Standard scaling, one-hot encoding, column reindexing
//! - [`tree`]: Regression trees, random forests and boosted oblivious trees
//! - [`linear`]: Fitted linear regressor
//! - [`pipeline`]: Preprocessing-composed model pipelines
//! - [`stats`]: Means, percentiles, empirical intervals and histograms
//! - [`neighbors`]: Comparable-listing retrieval with adaptive neighborhood size
//! - [`engine`]: The appraisal engine tying everything together
//! - [`synthetic`]: Deterministic demo artifacts for tests and examples

pub mod cluster;
pub mod engine;
pub mod error;
pub mod features;
pub mod linear;
pub mod neighbors;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod stats;
pub mod synthetic;
pub mod traits;
pub mod tree;
pub mod validate;

pub use error::{NarxError, Result};
