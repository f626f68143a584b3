//! Deterministic synthetic model bundle for tests and examples.
//!
//! Real deployments load fitted artifacts from an external store; this
//! module fabricates a small but fully consistent bundle around a simple
//! synthetic price surface so the engine can be exercised end to end
//! without any artifact files. Everything is seeded, so the same seed
//! always yields the same bundle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cluster::{GeoClusterModel, GeoExemplar};
use crate::engine::ModelBundle;
use crate::features::{
    ApartmentFeatures, CategoryCatalog, FeatureVector, CATEGORICAL_COLUMNS, FEATURE_COLUMNS,
    NUMERIC_COLUMNS,
};
use crate::linear::LinearRegressor;
use crate::neighbors::NeighborIndex;
use crate::pipeline::{ForestPipeline, LinearBagging, LinearPipeline};
use crate::preprocessing::{dummy_row, reindex, StandardScaler, TabularEncoder};
use crate::tree::{
    GradientBoostedRegressor, ObliviousSplit, ObliviousTree, RandomForestRegressor,
    RegressionLeaf, RegressionNode, RegressionTree, RegressionTreeNode, SplitRule,
};

const N_HISTORICAL: usize = 200;
const N_FOREST_TREES: usize = 50;
const N_BAGGING_MEMBERS: usize = 40;

/// Cluster labels the synthetic geography can produce, noise included.
const CLUSTER_LABELS: [&str; 6] = ["-1", "0", "1", "2", "3", "4"];

/// Synthetic price surface the artifacts are built around.
fn price_surface(area: f32, rooms: f32) -> f32 {
    15_000.0 + 900.0 * area + 6_000.0 * rooms
}

/// Catalog of the categorical values the synthetic market uses.
#[must_use]
pub fn demo_catalog() -> CategoryCatalog {
    CategoryCatalog {
        house_series: vec![
            "104-series".to_string(),
            "105-series".to_string(),
            "106-series".to_string(),
            "individual".to_string(),
        ],
        house_material: vec![
            "panel".to_string(),
            "brick".to_string(),
            "monolith".to_string(),
        ],
        heating_type: vec![
            "central".to_string(),
            "gas".to_string(),
            "electric".to_string(),
        ],
        condition: vec!["euro".to_string(), "good".to_string(), "average".to_string()],
    }
}

fn demo_geo_clusters() -> GeoClusterModel {
    let exemplars = vec![
        GeoExemplar {
            latitude: 42.8758,
            longitude: 74.6037,
            label: 0,
        },
        GeoExemplar {
            latitude: 42.8400,
            longitude: 74.6200,
            label: 1,
        },
        GeoExemplar {
            latitude: 42.9000,
            longitude: 74.5500,
            label: 2,
        },
        GeoExemplar {
            latitude: 42.8600,
            longitude: 74.7000,
            label: 3,
        },
        GeoExemplar {
            latitude: 42.9200,
            longitude: 74.5800,
            label: 4,
        },
    ];
    GeoClusterModel::new(exemplars, 0.02).expect("static exemplars are valid")
}

fn demo_encoder(catalog: &CategoryCatalog) -> TabularEncoder {
    let cluster_categories: Vec<String> =
        CLUSTER_LABELS.iter().map(|s| (*s).to_string()).collect();
    TabularEncoder::from_categories(vec![
        catalog.house_series.clone(),
        catalog.house_material.clone(),
        catalog.heating_type.clone(),
        catalog.condition.clone(),
        cluster_categories,
    ])
    .expect("catalog category lists are non-empty")
}

/// Boosted model approximating the price surface with an area staircase
/// plus room/condition/material adjustments. `scale` shifts the whole
/// response, which is how the synthetic conditional-quantile variants
/// are derived.
fn demo_boosted(scale: f32) -> GradientBoostedRegressor {
    let area_col = 7;
    let mut trees = Vec::new();

    // +step whenever area exceeds each threshold (leaf 0 is the
    // condition-false side).
    for threshold in [30.0, 50.0, 70.0, 90.0, 110.0, 140.0, 180.0] {
        let tree = ObliviousTree::new(
            vec![ObliviousSplit {
                column: area_col,
                rule: SplitRule::LessEq(threshold),
            }],
            vec![18_000.0 * scale, 0.0],
        )
        .expect("leaf count matches depth");
        trees.push(tree);
    }

    // More than two rooms adds a premium.
    trees.push(
        ObliviousTree::new(
            vec![ObliviousSplit {
                column: 0,
                rule: SplitRule::LessEq(2.0),
            }],
            vec![11_000.0 * scale, 0.0],
        )
        .expect("leaf count matches depth"),
    );

    // Euro renovation and brick walls each add a premium.
    trees.push(
        ObliviousTree::new(
            vec![ObliviousSplit {
                column: 9,
                rule: SplitRule::Equals("euro".to_string()),
            }],
            vec![0.0, 8_000.0 * scale],
        )
        .expect("leaf count matches depth"),
    );
    trees.push(
        ObliviousTree::new(
            vec![ObliviousSplit {
                column: 4,
                rule: SplitRule::Equals("brick".to_string()),
            }],
            vec![0.0, 4_000.0 * scale],
        )
        .expect("leaf count matches depth"),
    );

    GradientBoostedRegressor::new(42_000.0 * scale, 1.0, trees)
        .expect("static configuration is valid")
}

/// Forest of area stumps with jittered thresholds and leaf values spread
/// around the price surface.
fn demo_forest(encoder: &TabularEncoder, rng: &mut StdRng) -> ForestPipeline {
    // total_area sits at encoded column 5 (last numeric passthrough).
    let area_col = 5;
    let mut trees = Vec::with_capacity(N_FOREST_TREES);
    for _ in 0..N_FOREST_TREES {
        let threshold = rng.gen_range(40.0..90.0);
        let jitter = rng.gen_range(0.94..1.06);
        let left = price_surface(threshold - 10.0, 2.0) * jitter;
        let right = price_surface(threshold + 15.0, 2.0) * jitter;
        trees.push(
            RegressionTree::from_root(RegressionTreeNode::Node(RegressionNode {
                feature_idx: area_col,
                threshold,
                left: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: left })),
                right: Box::new(RegressionTreeNode::Leaf(RegressionLeaf { value: right })),
            }))
            .expect("finite leaves"),
        );
    }
    let forest = RandomForestRegressor::from_trees(trees).expect("forest is non-empty");
    ForestPipeline::new(encoder.clone(), forest).expect("splits stay inside encoder width")
}

/// Base coefficients of the synthetic linear member.
fn linear_coefficients(encoder: &TabularEncoder, rng: &mut StdRng) -> Vec<f32> {
    let mut coefficients = vec![0.0; encoder.n_output()];
    coefficients[0] = 5_500.0; // room_count
    coefficients[3] = 300.0; // floor
    coefficients[4] = 100.0; // total_floors
    coefficients[5] = 850.0; // total_area
    for c in coefficients.iter_mut().skip(NUMERIC_COLUMNS.len()) {
        *c = rng.gen_range(-2_500.0..2_500.0);
    }
    coefficients
}

fn demo_linear(
    encoder: &TabularEncoder,
    rng: &mut StdRng,
) -> (LinearPipeline, LinearBagging) {
    let base = linear_coefficients(encoder, rng);
    let intercept = 20_000.0;

    let model = LinearRegressor::from_params(base.clone(), intercept)
        .expect("static coefficients are valid");
    let pipeline =
        LinearPipeline::new(encoder.clone(), model).expect("widths match by construction");

    let mut members = Vec::with_capacity(N_BAGGING_MEMBERS);
    for _ in 0..N_BAGGING_MEMBERS {
        let scale: f32 = rng.gen_range(0.93..1.07);
        let coefficients: Vec<f32> = base.iter().map(|c| c * scale).collect();
        members.push(
            LinearRegressor::from_params(coefficients, intercept * scale)
                .expect("jittered coefficients stay finite"),
        );
    }
    let bagging =
        LinearBagging::new(encoder.clone(), members).expect("widths match by construction");

    (pipeline, bagging)
}

/// Column universe of the neighbor index: scaled numerics first, then one
/// dummy column per catalog category and cluster label.
fn neighbor_columns(catalog: &CategoryCatalog) -> Vec<String> {
    let mut columns: Vec<String> = NUMERIC_COLUMNS
        .iter()
        .map(|&idx| FEATURE_COLUMNS[idx].to_string())
        .collect();
    let categorical_values: [&[String]; 4] = [
        &catalog.house_series,
        &catalog.house_material,
        &catalog.heating_type,
        &catalog.condition,
    ];
    for (pos, values) in categorical_values.iter().enumerate() {
        let column = FEATURE_COLUMNS[CATEGORICAL_COLUMNS[pos]];
        for value in *values {
            columns.push(format!("{column}_{value}"));
        }
    }
    let cluster_column = FEATURE_COLUMNS[CATEGORICAL_COLUMNS[4]];
    for label in CLUSTER_LABELS {
        columns.push(format!("{cluster_column}_{label}"));
    }
    columns
}

fn pick<'a>(values: &'a [String], rng: &mut StdRng) -> &'a str {
    &values[rng.gen_range(0..values.len())]
}

/// Synthetic historical listings encoded exactly the way a live query
/// is: scaled dummy row reindexed onto the column universe.
fn demo_neighbors(
    catalog: &CategoryCatalog,
    geo: &GeoClusterModel,
    scaler: &StandardScaler,
    rng: &mut StdRng,
) -> NeighborIndex {
    let columns = neighbor_columns(catalog);
    let mut rows = Vec::with_capacity(N_HISTORICAL);
    let mut targets = Vec::with_capacity(N_HISTORICAL);

    for _ in 0..N_HISTORICAL {
        let rooms = rng.gen_range(1..=5u32);
        let area = 18.0 * rooms as f32 + rng.gen_range(5.0..30.0);
        let total_floors = rng.gen_range(2..=16u32);
        let floor = rng.gen_range(1..=total_floors);
        let latitude = rng.gen_range(42.81..42.94);
        let longitude = rng.gen_range(74.51..74.74);

        let features = ApartmentFeatures {
            room_count: rooms,
            total_area: area,
            floor,
            total_floors,
            latitude,
            longitude,
            house_series: pick(&catalog.house_series, rng).to_string(),
            house_material: pick(&catalog.house_material, rng).to_string(),
            heating_type: pick(&catalog.heating_type, rng).to_string(),
            condition: pick(&catalog.condition, rng).to_string(),
        };
        let cluster = geo.approximate_predict(latitude, longitude);
        let vector = FeatureVector::from_parts(&features, cluster);
        let row = dummy_row(&vector, scaler).expect("synthetic vector is well-formed");
        rows.push(reindex(&row, &columns));

        let noise = rng.gen_range(0.85..1.15);
        targets.push(price_surface(area, rooms as f32) * noise);
    }

    NeighborIndex::new(columns, rows, targets).expect("synthetic index is consistent")
}

/// Builds the full deterministic demo bundle for a seed.
///
/// # Examples
///
/// ```
/// use narx::engine::PriceEngine;
/// use narx::synthetic::demo_bundle;
///
/// let engine = PriceEngine::new(demo_bundle(7)).unwrap();
/// assert_eq!(engine.bundle().neighbors.n_rows(), 200);
/// ```
#[must_use]
pub fn demo_bundle(seed: u64) -> ModelBundle {
    let mut rng = StdRng::seed_from_u64(seed);

    let catalog = demo_catalog();
    let geo_clusters = demo_geo_clusters();
    let encoder = demo_encoder(&catalog);

    let boosted = demo_boosted(1.0);
    let boosted_lower = demo_boosted(0.82);
    let boosted_upper = demo_boosted(1.22);

    let forest = demo_forest(&encoder, &mut rng);
    let (linear, linear_bagging) = demo_linear(&encoder, &mut rng);

    let neighbor_scaler = StandardScaler::from_params(
        vec![2.2, 42.875, 74.62, 4.5, 8.0, 62.0],
        vec![1.1, 0.03, 0.06, 2.8, 3.5, 25.0],
    )
    .expect("static scaler parameters are valid");
    let neighbors = demo_neighbors(&catalog, &geo_clusters, &neighbor_scaler, &mut rng);

    ModelBundle {
        boosted,
        boosted_lower,
        boosted_upper,
        forest,
        linear,
        linear_bagging,
        geo_clusters,
        catalog,
        neighbor_scaler,
        neighbors,
    }
}
