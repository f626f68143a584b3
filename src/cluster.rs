//! Geographic cluster assignment for coordinate pairs.
//!
//! A pre-fitted density-based clustering of the city's listings is
//! consumed through its exemplar points: assignment for a new coordinate
//! pair measures the distance to the nearest exemplar and adopts its
//! cluster label when inside the membership threshold, otherwise the
//! point is labeled noise. This mirrors the approximate-predict operation
//! of density clustering libraries and works for points that were not in
//! the original fit.

use crate::error::{NarxError, Result};
use serde::{Deserialize, Serialize};

/// Cluster label produced for one coordinate pair.
///
/// `Noise` is the reserved label for points outside all learned density
/// regions; it renders as the conventional `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterAssignment {
    /// Member of the learned cluster with this id (0, 1, 2, ...)
    Cluster(i32),
    /// Outside all learned density regions
    Noise,
}

impl ClusterAssignment {
    /// Integer label, -1 for noise.
    #[must_use]
    pub fn label(&self) -> i32 {
        match self {
            ClusterAssignment::Cluster(id) => *id,
            ClusterAssignment::Noise => -1,
        }
    }

    /// Label string used as the `cluster_id` categorical feature column.
    #[must_use]
    pub fn as_category(&self) -> String {
        self.label().to_string()
    }
}

/// One exemplar point of the fitted clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoExemplar {
    /// Exemplar latitude
    pub latitude: f32,
    /// Exemplar longitude
    pub longitude: f32,
    /// Cluster label of this exemplar (never the noise label)
    pub label: i32,
}

/// Pre-fitted density-based geographic clustering, consumed read-only.
///
/// # Examples
///
/// ```
/// use narx::cluster::{ClusterAssignment, GeoClusterModel, GeoExemplar};
///
/// let model = GeoClusterModel::new(
///     vec![
///         GeoExemplar { latitude: 42.87, longitude: 74.60, label: 0 },
///         GeoExemplar { latitude: 42.84, longitude: 74.62, label: 1 },
///     ],
///     0.02,
/// )
/// .unwrap();
///
/// assert_eq!(
///     model.approximate_predict(42.871, 74.601),
///     ClusterAssignment::Cluster(0)
/// );
/// assert_eq!(
///     model.approximate_predict(42.95, 74.75),
///     ClusterAssignment::Noise
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoClusterModel {
    exemplars: Vec<GeoExemplar>,
    max_distance: f32,
}

impl GeoClusterModel {
    /// Wraps fitted exemplars and a membership distance threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the exemplar set is empty, contains a noise
    /// label, or the threshold is not strictly positive. The engine
    /// treats this as a configuration error and fails fast.
    pub fn new(exemplars: Vec<GeoExemplar>, max_distance: f32) -> Result<Self> {
        if exemplars.is_empty() {
            return Err(NarxError::artifact("geo_clusters", "no exemplar points"));
        }
        if exemplars.iter().any(|e| e.label < 0) {
            return Err(NarxError::artifact(
                "geo_clusters",
                "exemplar carries the reserved noise label",
            ));
        }
        if max_distance <= 0.0 || max_distance.is_nan() {
            return Err(NarxError::artifact(
                "geo_clusters",
                format!("max_distance must be > 0, got {max_distance}"),
            ));
        }
        Ok(Self {
            exemplars,
            max_distance,
        })
    }

    /// Number of exemplar points.
    #[must_use]
    pub fn n_exemplars(&self) -> usize {
        self.exemplars.len()
    }

    /// Membership distance threshold.
    #[must_use]
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Assigns a cluster to a coordinate pair not necessarily present in
    /// the original fit.
    ///
    /// The nearest exemplar's label is adopted when its Euclidean
    /// distance is within the threshold; otherwise the point is noise.
    #[must_use]
    pub fn approximate_predict(&self, latitude: f32, longitude: f32) -> ClusterAssignment {
        let mut best_label = -1;
        let mut best_dist = f32::INFINITY;

        for exemplar in &self.exemplars {
            let dlat = latitude - exemplar.latitude;
            let dlon = longitude - exemplar.longitude;
            let dist = (dlat * dlat + dlon * dlon).sqrt();
            if dist < best_dist {
                best_dist = dist;
                best_label = exemplar.label;
            }
        }

        if best_dist <= self.max_distance {
            ClusterAssignment::Cluster(best_label)
        } else {
            ClusterAssignment::Noise
        }
    }
}
