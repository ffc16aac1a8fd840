//! # Traffic GBDT
//!
//! Gradient-boosted decision trees for telling normal network flows apart
//! from anomalous ones.
//!
//! The crate is an offline training and evaluation harness. Labelled flow
//! samples are generated (or loaded from CSV), assembled into normalized
//! feature vectors, used to fit a logistic GBDT ensemble and finally scored
//! for accuracy, AUC and F1.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use traffic_gbdt::{generate, Config, Predictor, TrafficSample, TrainingPipeline};
//!
//! # fn main() -> traffic_gbdt::Result<()> {
//! traffic_gbdt::init();
//!
//! let samples = generate(100, 0.2, Some(42))?;
//! let config = Config {
//!     num_trees: 100,
//!     num_leaves: 20,
//!     learning_rate: 0.1,
//!     ..Config::default()
//! };
//!
//! let pipeline = TrainingPipeline::fit(&samples, &config)?;
//! println!("{}", pipeline.evaluate(&samples)?);
//!
//! let flow = TrafficSample {
//!     packet_count: 150,
//!     avg_packet_size: 500,
//!     ..TrafficSample::default()
//! };
//! println!("{}", Predictor::default().predict(&pipeline, &flow)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`]: Error type, shared types, constants and trait seams
//! - [`config`]: Training configuration with file and environment loading
//! - [`dataset`]: Traffic samples, the synthetic generator, CSV loading and
//!   feature assembly
//! - [`tree`]: Regression trees, exact split search and tree growers
//! - [`boosting`]: Logistic objective, boosting loop and the trained ensemble
//! - [`metrics_eval`]: Accuracy, AUC, F1 and related metrics
//! - [`pipeline`]: Normalization plus ensemble as one fitted unit
//! - [`prediction`]: Scoring of individual samples
//! - [`io`]: JSON and bincode persistence of fitted pipelines
//!
//! Normal traffic is the positive class (label `true`) everywhere.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Samples, generation and feature assembly
pub mod dataset;

// Decision trees
pub mod tree;

// Boosting module
pub mod boosting;

// Metrics evaluation module
pub mod metrics_eval;

// Fitted pipeline
pub mod pipeline;

// Prediction module
pub mod prediction;

// Model persistence
pub mod io;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{Result, TrafficGbdtError},
    traits::*,
    types::*,
};

// Re-export configuration functionality
pub use config::{resolve_config, Config, ConfigBuilder};

// Re-export dataset functionality
pub use dataset::{
    generate, load_samples_csv, save_samples_csv, FeatureAssembler, FeatureVector,
    GeneratorConfig, NormalizationModel, SampleGenerator, TrafficSample,
};

// Re-export tree functionality
pub use tree::{DepthWiseGrower, LeafWiseGrower, Tree};

// Re-export boosting functionality
pub use boosting::{BinaryLogloss, Ensemble, GBDTTrainer, TrainingHistory};

// Re-export metrics evaluation functionality
pub use metrics_eval::{EvaluationMetrics, Evaluator};

// Re-export pipeline, prediction and persistence functionality
pub use io::{load_pipeline, save_pipeline, PersistedModel, SerializationFormat};
pub use pipeline::{FittedPipeline, TrainingPipeline};
pub use prediction::{Prediction, PredictionConfig, Predictor};

// Version information
pub use self::core::constants::TRAFFIC_GBDT_VERSION as VERSION;

/// Install the `env_logger` backend for the `log` facade.
///
/// Defaults `RUST_LOG` to `info` when unset. Calling it more than once is
/// harmless.
pub fn init() {
    core::initialize_logging()
}

/// Check if [`init`] has run.
pub fn is_initialized() -> bool {
    core::is_logging_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_initialization() {
        init();
        assert!(is_initialized());
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .learning_rate(0.05)
            .num_trees(50)
            .num_leaves(16)
            .build()
            .unwrap();

        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.num_trees, 50);
        assert_eq!(config.num_leaves, 16);
    }
}
