//! System constants and configuration defaults.
//!
//! Defaults mirror the options recognised by the training harness; the
//! generator ranges live with the generator in [`crate::dataset::generator`].

use crate::core::types::DataSize;

/// Number of numeric fields in a traffic sample and therefore in every
/// feature vector.
pub const NUM_FEATURES: usize = 7;

/// Feature names in feature-vector order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "packet_count",
    "avg_packet_size",
    "packet_duration",
    "interval_between_packets",
    "packet_frequency",
    "total_data_sent",
    "source_destination_ratio",
];

/// Default number of boosting rounds (trees in the ensemble).
pub const DEFAULT_NUM_TREES: usize = 100;

/// Default leaf budget for each tree.
pub const DEFAULT_NUM_LEAVES: usize = 20;

/// Default learning rate (shrinkage) for gradient boosting.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default minimum number of samples required in a leaf.
pub const DEFAULT_MIN_LEAF_SAMPLES: DataSize = 10;

/// Default maximum tree depth.
/// Negative value means no limit.
pub const DEFAULT_MAX_DEPTH: i32 = -1;

/// Default L2 damping added to the hessian sum of every leaf and split side.
pub const DEFAULT_LAMBDA_L2: f64 = 1e-6;

/// Default minimum sum of hessian values required in a leaf.
pub const DEFAULT_MIN_SUM_HESSIAN_IN_LEAF: f64 = 1e-3;

/// Default minimum gain required to make a split.
pub const DEFAULT_MIN_GAIN_TO_SPLIT: f64 = 0.0;

/// Default probability that a generated sample is an anomaly.
pub const DEFAULT_ANOMALY_PROBABILITY: f64 = 0.2;

/// Default number of samples drawn by the driver.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Default number of threads (0 = rayon's global pool).
pub const DEFAULT_NUM_THREADS: usize = 0;

/// Probabilities are clamped to `[PROBABILITY_EPSILON, 1 - PROBABILITY_EPSILON]`
/// before taking logarithms.
pub const PROBABILITY_EPSILON: f64 = 1e-15;

/// A sample is classified as normal when its probability reaches this value.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// AUC reported when only one class is present.
pub const DEGENERATE_AUC: f64 = 0.5;

/// Version tag written into persisted models.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Crate version string.
pub const TRAFFIC_GBDT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "TRAFFIC_GBDT_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_are_unique() {
        let mut names = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NUM_FEATURES);
    }

    #[test]
    fn test_defaults_are_sane() {
        assert!(DEFAULT_NUM_TREES > 0);
        assert!(DEFAULT_NUM_LEAVES > 0);
        assert!(DEFAULT_LEARNING_RATE > 0.0 && DEFAULT_LEARNING_RATE <= 1.0);
        assert!(DEFAULT_MIN_LEAF_SAMPLES >= 1);
        assert!((0.0..=1.0).contains(&DEFAULT_ANOMALY_PROBABILITY));
        assert!(PROBABILITY_EPSILON > 0.0 && PROBABILITY_EPSILON < 1e-6);
    }
}
