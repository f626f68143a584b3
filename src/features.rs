//! Apartment attributes and the canonical feature vector.
//!
//! The feature vector's column order and naming are a contract with every
//! fitted model artifact: all three point predictors and the neighbor
//! encoding were trained against exactly this sequence. It must stay
//! stable once established.

use crate::cluster::ClusterAssignment;
use serde::{Deserialize, Serialize};

/// Canonical feature column order shared by all fitted predictors.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "room_count",
    "latitude",
    "longitude",
    "house_series",
    "house_material",
    "floor",
    "total_floors",
    "total_area",
    "heating_type",
    "condition",
    "cluster_id",
];

/// Indices of the numeric columns within [`FEATURE_COLUMNS`].
pub const NUMERIC_COLUMNS: [usize; 6] = [0, 1, 2, 5, 6, 7];

/// Indices of the categorical columns within [`FEATURE_COLUMNS`].
pub const CATEGORICAL_COLUMNS: [usize; 5] = [3, 4, 8, 9, 10];

/// Structural and geographic attributes of one apartment listing.
///
/// Immutable value object created per request from validated user input.
/// Range and catalog constraints are enforced by [`crate::validate`], not
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentFeatures {
    /// Number of rooms (1–20)
    pub room_count: u32,
    /// Total area in square meters (1–1500)
    pub total_area: f32,
    /// Floor of the apartment (0–40)
    pub floor: u32,
    /// Total floors in the building (1–40, `floor <= total_floors`)
    pub total_floors: u32,
    /// Latitude, inside the city bounding box
    pub latitude: f32,
    /// Longitude, inside the city bounding box
    pub longitude: f32,
    /// Building series (e.g. "105-series")
    pub house_series: String,
    /// Wall material (e.g. "brick")
    pub house_material: String,
    /// Heating type (e.g. "central")
    pub heating_type: String,
    /// Renovation condition (e.g. "good")
    pub condition: String,
}

/// Catalog of allowed values for each categorical field.
///
/// Supplied as a fitted artifact alongside the models; the engine treats
/// it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    /// Allowed `house_series` values
    pub house_series: Vec<String>,
    /// Allowed `house_material` values
    pub house_material: Vec<String>,
    /// Allowed `heating_type` values
    pub heating_type: Vec<String>,
    /// Allowed `condition` values
    pub condition: Vec<String>,
}

/// A single cell of the feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    /// Numeric cell, coerced to f32
    Numeric(f32),
    /// Categorical cell, kept as its label string
    Categorical(String),
}

/// The ordered attribute record consumed by every point predictor.
///
/// Combines the apartment attributes with the geo-cluster assignment in
/// the fixed [`FEATURE_COLUMNS`] order. Consumed, never mutated, by all
/// downstream components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<FeatureValue>,
}

impl FeatureVector {
    /// Assembles the feature vector from validated attributes and a
    /// cluster assignment. Numeric fields are coerced to `f32`; no other
    /// transformation occurs here.
    #[must_use]
    pub fn from_parts(features: &ApartmentFeatures, cluster: ClusterAssignment) -> Self {
        let values = vec![
            FeatureValue::Numeric(features.room_count as f32),
            FeatureValue::Numeric(features.latitude),
            FeatureValue::Numeric(features.longitude),
            FeatureValue::Categorical(features.house_series.clone()),
            FeatureValue::Categorical(features.house_material.clone()),
            FeatureValue::Numeric(features.floor as f32),
            FeatureValue::Numeric(features.total_floors as f32),
            FeatureValue::Numeric(features.total_area),
            FeatureValue::Categorical(features.heating_type.clone()),
            FeatureValue::Categorical(features.condition.clone()),
            FeatureValue::Categorical(cluster.as_category()),
        ];
        Self { values }
    }

    /// Number of columns (always `FEATURE_COLUMNS.len()`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; the record has a fixed column set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell at a column index.
    #[must_use]
    pub fn value(&self, idx: usize) -> Option<&FeatureValue> {
        self.values.get(idx)
    }

    /// Numeric cell at a column index, `None` if absent or categorical.
    #[must_use]
    pub fn numeric(&self, idx: usize) -> Option<f32> {
        match self.values.get(idx) {
            Some(FeatureValue::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    /// Categorical cell at a column index, `None` if absent or numeric.
    #[must_use]
    pub fn categorical(&self, idx: usize) -> Option<&str> {
        match self.values.get(idx) {
            Some(FeatureValue::Categorical(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Column names in feature order.
    #[must_use]
    pub fn columns() -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }
}
