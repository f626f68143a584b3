//! Fitted data transformers for the encoded feature representations.
//!
//! Two encodings are derived from the same feature vector:
//!
//! - the *pipeline* representation ([`TabularEncoder`]): numeric columns
//!   passed through unscaled, categorical columns one-hot expanded against
//!   the encoder's fitted category lists. The forest and linear models
//!   were trained on this layout.
//! - the *neighbor* representation ([`dummy_row`] + [`reindex`]): numeric
//!   columns standardized by a fitted [`StandardScaler`], categoricals
//!   expanded into `column_value` dummy columns, then reindexed onto the
//!   neighbor index's training-time column universe with zero fill.
//!
//! One-hot encoding a single row can only emit dummy columns for the
//! categories present in that row; the zero-fill reindex is what
//! reconciles the row with the full training-time universe. That silent
//! fill is deliberate and downstream results depend on it.

use crate::error::{NarxError, Result};
use crate::features::{FeatureVector, CATEGORICAL_COLUMNS, FEATURE_COLUMNS, NUMERIC_COLUMNS};
use serde::{Deserialize, Serialize};

/// Standardizes the numeric feature subset with fitted mean/std.
///
/// Fitted state is supplied at construction; one entry per numeric column
/// in [`NUMERIC_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl StandardScaler {
    /// Wraps fitted per-column mean and standard deviation.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter lengths differ from the numeric
    /// column count or any standard deviation is non-finite.
    pub fn from_params(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if mean.len() != NUMERIC_COLUMNS.len() || std.len() != NUMERIC_COLUMNS.len() {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} numeric columns", NUMERIC_COLUMNS.len()),
                actual: format!("mean={}, std={}", mean.len(), std.len()),
            });
        }
        if std.iter().any(|s| !s.is_finite()) || mean.iter().any(|m| !m.is_finite()) {
            return Err(NarxError::artifact(
                "neighbor_scaler",
                "non-finite fitted parameter",
            ));
        }
        Ok(Self { mean, std })
    }

    /// Fitted per-column means.
    #[must_use]
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Fitted per-column standard deviations.
    #[must_use]
    pub fn std(&self) -> &[f32] {
        &self.std
    }

    /// Standardizes one value of the numeric column at position `pos`
    /// within [`NUMERIC_COLUMNS`]. Columns with near-zero spread pass
    /// through centered only.
    #[must_use]
    pub fn transform_one(&self, pos: usize, value: f32) -> f32 {
        let centered = value - self.mean[pos];
        if self.std[pos] > 1e-10 {
            centered / self.std[pos]
        } else {
            centered
        }
    }
}

/// One-hot encoder with numeric passthrough, fitted on the training data.
///
/// Output layout: numeric columns first in [`NUMERIC_COLUMNS`] order, then
/// for each categorical column its fitted categories in order. Unknown
/// categories encode as all zeros for that block, mirroring the training
/// pipeline's ignore behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularEncoder {
    /// Fitted category lists, one per entry of [`CATEGORICAL_COLUMNS`].
    categories: Vec<Vec<String>>,
}

impl TabularEncoder {
    /// Wraps fitted category lists, one per categorical column in
    /// [`CATEGORICAL_COLUMNS`] order.
    ///
    /// # Errors
    ///
    /// Returns an error if the list count mismatches or any list is empty.
    pub fn from_categories(categories: Vec<Vec<String>>) -> Result<Self> {
        if categories.len() != CATEGORICAL_COLUMNS.len() {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} categorical columns", CATEGORICAL_COLUMNS.len()),
                actual: format!("{} category lists", categories.len()),
            });
        }
        if categories.iter().any(Vec::is_empty) {
            return Err(NarxError::artifact(
                "tabular_encoder",
                "empty category list",
            ));
        }
        Ok(Self { categories })
    }

    /// Width of the encoded representation.
    #[must_use]
    pub fn n_output(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.categories.iter().map(Vec::len).sum::<usize>()
    }

    /// Fitted category lists.
    #[must_use]
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Encodes one feature vector into the fitted dense layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector is missing a column or a cell has
    /// the wrong kind.
    pub fn encode(&self, x: &FeatureVector) -> Result<Vec<f32>> {
        let mut out = Vec::with_capacity(self.n_output());

        for &idx in &NUMERIC_COLUMNS {
            let v = x.numeric(idx).ok_or_else(|| {
                NarxError::inference(
                    "tabular_encoder",
                    format!("expected numeric cell `{}`", FEATURE_COLUMNS[idx]),
                )
            })?;
            out.push(v);
        }

        for (pos, &idx) in CATEGORICAL_COLUMNS.iter().enumerate() {
            let label = x.categorical(idx).ok_or_else(|| {
                NarxError::inference(
                    "tabular_encoder",
                    format!("expected categorical cell `{}`", FEATURE_COLUMNS[idx]),
                )
            })?;
            for category in &self.categories[pos] {
                out.push(if category == label { 1.0 } else { 0.0 });
            }
        }

        Ok(out)
    }
}

/// A single-row encoding with named columns, prior to reindexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRow {
    /// Column names present in this row
    pub columns: Vec<String>,
    /// Values aligned with `columns`
    pub values: Vec<f32>,
}

impl EncodedRow {
    /// Value of a named column, if present in this row.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f32> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

/// Encodes one feature vector into the neighbor-lookup row: numeric
/// columns standardized by the fitted scaler, categorical columns
/// expanded into `column_value` dummy columns for the values present in
/// this row only.
///
/// # Errors
///
/// Returns an error if the vector is missing a column or a cell has the
/// wrong kind.
pub fn dummy_row(x: &FeatureVector, scaler: &StandardScaler) -> Result<EncodedRow> {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for (pos, &idx) in NUMERIC_COLUMNS.iter().enumerate() {
        let v = x.numeric(idx).ok_or_else(|| {
            NarxError::inference(
                "neighbor_encoding",
                format!("expected numeric cell `{}`", FEATURE_COLUMNS[idx]),
            )
        })?;
        columns.push(FEATURE_COLUMNS[idx].to_string());
        values.push(scaler.transform_one(pos, v));
    }

    for &idx in &CATEGORICAL_COLUMNS {
        let label = x.categorical(idx).ok_or_else(|| {
            NarxError::inference(
                "neighbor_encoding",
                format!("expected categorical cell `{}`", FEATURE_COLUMNS[idx]),
            )
        })?;
        columns.push(format!("{}_{}", FEATURE_COLUMNS[idx], label));
        values.push(1.0);
    }

    Ok(EncodedRow { columns, values })
}

/// Reindexes a single-row encoding onto a training-time column universe.
///
/// Every universe column keeps its position; columns absent from the row
/// are zero-filled. Columns of the row that are not in the universe are
/// dropped silently. This is the exact semantic the neighbor index was
/// fitted against.
#[must_use]
pub fn reindex(row: &EncodedRow, universe: &[String]) -> Vec<f32> {
    universe
        .iter()
        .map(|column| row.get(column).unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterAssignment;
    use crate::features::ApartmentFeatures;

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
        FeatureVector::from_parts(&features, ClusterAssignment::Cluster(3))
    }

    fn identity_scaler() -> StandardScaler {
        StandardScaler::from_params(vec![0.0; 6], vec![1.0; 6]).expect("valid params")
    }

    fn fitted_encoder() -> TabularEncoder {
        TabularEncoder::from_categories(vec![
            vec!["104-series".to_string(), "105-series".to_string()],
            vec!["brick".to_string(), "panel".to_string()],
            vec!["central".to_string(), "electric".to_string()],
            vec!["good".to_string(), "average".to_string()],
            vec!["0".to_string(), "3".to_string(), "-1".to_string()],
        ])
        .expect("valid categories")
    }

    #[test]
    fn test_scaler_rejects_wrong_len() {
        assert!(StandardScaler::from_params(vec![0.0; 5], vec![1.0; 6]).is_err());
        assert!(StandardScaler::from_params(vec![0.0; 6], vec![f32::NAN; 6]).is_err());
    }

    #[test]
    fn test_scaler_standardizes() {
        let scaler =
            StandardScaler::from_params(vec![10.0, 0.0, 0.0, 0.0, 0.0, 50.0], vec![2.0; 6])
                .expect("valid params");
        assert_eq!(scaler.transform_one(0, 14.0), 2.0);
        assert_eq!(scaler.transform_one(5, 50.0), 0.0);
    }

    #[test]
    fn test_scaler_zero_spread_passes_centered() {
        let mut std = vec![1.0; 6];
        std[2] = 0.0;
        let scaler = StandardScaler::from_params(vec![1.0; 6], std).expect("valid params");
        assert_eq!(scaler.transform_one(2, 3.0), 2.0);
    }

    #[test]
    fn test_encoder_width_and_layout() {
        let encoder = fitted_encoder();
        assert_eq!(encoder.n_output(), 6 + 2 + 2 + 2 + 2 + 3);

        let encoded = encoder.encode(&sample_vector()).expect("valid vector");
        assert_eq!(encoded.len(), encoder.n_output());
        // Numerics first, unscaled.
        assert_eq!(encoded[0], 2.0);
        assert_eq!(encoded[5], 65.0);
        // house_series block: ["104-series", "105-series"] -> [0, 1]
        assert_eq!(&encoded[6..8], &[0.0, 1.0]);
        // cluster block: ["0", "3", "-1"] -> [0, 1, 0]
        assert_eq!(&encoded[14..17], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_encoder_unknown_category_is_all_zeros() {
        let encoder = fitted_encoder();
        let features = ApartmentFeatures {
            room_count: 1,
            total_area: 30.0,
            floor: 1,
            total_floors: 5,
            latitude: 42.85,
            longitude: 74.6,
            house_series: "never-seen".to_string(),
            house_material: "brick".to_string(),
            heating_type: "central".to_string(),
            condition: "good".to_string(),
        };
        let fv = FeatureVector::from_parts(&features, ClusterAssignment::Cluster(0));
        let encoded = encoder.encode(&fv).expect("valid vector");
        assert_eq!(&encoded[6..8], &[0.0, 0.0]);
    }

    #[test]
    fn test_encoder_rejects_wrong_list_count() {
        assert!(TabularEncoder::from_categories(vec![vec!["a".to_string()]; 4]).is_err());
        let mut lists = vec![vec!["a".to_string()]; 5];
        lists[2] = vec![];
        assert!(TabularEncoder::from_categories(lists).is_err());
    }

    #[test]
    fn test_dummy_row_names_and_scaling() {
        let scaler = identity_scaler();
        let row = dummy_row(&sample_vector(), &scaler).expect("valid vector");
        assert_eq!(row.columns.len(), 6 + 5);
        assert_eq!(row.get("room_count"), Some(2.0));
        assert_eq!(row.get("total_area"), Some(65.0));
        assert_eq!(row.get("house_series_105-series"), Some(1.0));
        assert_eq!(row.get("cluster_id_3"), Some(1.0));
        assert_eq!(row.get("cluster_id_-1"), None);
    }

    #[test]
    fn test_reindex_zero_fills_and_keeps_order() {
        let row = EncodedRow {
            columns: vec!["b".to_string(), "d".to_string()],
            values: vec![2.0, 4.0],
        };
        let universe = vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ];
        assert_eq!(reindex(&row, &universe), vec![0.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn test_reindex_drops_columns_outside_universe() {
        let row = EncodedRow {
            columns: vec!["extra".to_string(), "a".to_string()],
            values: vec![9.0, 1.0],
        };
        let universe = vec!["a".to_string()];
        assert_eq!(reindex(&row, &universe), vec![1.0]);
    }

    #[test]
    fn test_reindex_never_reorders_universe() {
        let row = EncodedRow {
            columns: vec!["x".to_string(), "y".to_string()],
            values: vec![1.0, 2.0],
        };
        let universe = vec!["y".to_string(), "x".to_string()];
        assert_eq!(reindex(&row, &universe), vec![2.0, 1.0]);
    }
}
