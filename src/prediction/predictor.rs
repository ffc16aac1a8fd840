//! Single-sample and batch scoring with a fitted pipeline.

use crate::boosting::sigmoid;
use crate::core::constants::DECISION_THRESHOLD;
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::{NodeIndex, Score, TrafficClass};
use crate::dataset::TrafficSample;
use crate::pipeline::FittedPipeline;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for prediction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Number of leading trees to use (None = use all)
    pub num_iterations: Option<usize>,
    /// Probability at or above which a sample is labelled normal
    pub threshold: f64,
}

impl PredictionConfig {
    /// Create a new prediction configuration with defaults
    pub fn new() -> Self {
        Self {
            num_iterations: None,
            threshold: DECISION_THRESHOLD,
        }
    }

    /// Set number of iterations to use for prediction
    pub fn with_num_iterations(mut self, num_iterations: Option<usize>) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    /// Set the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(TrafficGbdtError::invalid_parameter(
                "threshold",
                self.threshold.to_string(),
                "must be within [0, 1]",
            ));
        }
        if self.num_iterations == Some(0) {
            return Err(TrafficGbdtError::invalid_parameter(
                "num_iterations",
                "0",
                "must use at least one tree",
            ));
        }
        Ok(())
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of scoring one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// `true` when the sample is predicted to be normal traffic
    pub label: bool,
    /// Raw margin before the sigmoid
    pub score: Score,
    /// Probability of normal traffic
    pub probability: f64,
}

impl Prediction {
    /// Predicted class.
    pub fn class(&self) -> TrafficClass {
        TrafficClass::from_label(self.label)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prediction: {}, Score: {:.4}, Probability: {:.2}%",
            self.class(),
            self.score,
            self.probability * 100.0
        )
    }
}

/// Scores samples against a [`FittedPipeline`].
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: PredictionConfig,
}

impl Predictor {
    /// Create a predictor, rejecting unusable settings.
    pub fn new(config: PredictionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Predictor { config })
    }

    /// Get prediction configuration
    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Score one sample. Its label, if any, is ignored.
    pub fn predict(&self, pipeline: &FittedPipeline, sample: &TrafficSample) -> Result<Prediction> {
        let features = pipeline.transform(sample)?;
        let ensemble = pipeline.ensemble();
        let num_trees = self.tree_limit(ensemble.num_trees());

        let mut sum = 0.0;
        for tree in &ensemble.trees()[..num_trees] {
            sum += tree.predict(&features.view())?;
        }
        let score = ensemble.base_prediction() + ensemble.learning_rate() * sum;
        let probability = sigmoid(score);

        Ok(Prediction {
            label: probability >= self.config.threshold,
            score,
            probability,
        })
    }

    /// Score every sample in order.
    pub fn predict_batch(
        &self,
        pipeline: &FittedPipeline,
        samples: &[TrafficSample],
    ) -> Result<Vec<Prediction>> {
        samples
            .iter()
            .map(|sample| self.predict(pipeline, sample))
            .collect()
    }

    /// Index of the leaf each tree routes the sample to.
    pub fn predict_leaf_indices(
        &self,
        pipeline: &FittedPipeline,
        sample: &TrafficSample,
    ) -> Result<Vec<NodeIndex>> {
        let features = pipeline.transform(sample)?;
        let ensemble = pipeline.ensemble();
        let num_trees = self.tree_limit(ensemble.num_trees());
        ensemble.trees()[..num_trees]
            .iter()
            .map(|tree| tree.predict_leaf_index(&features.view()))
            .collect()
    }

    fn tree_limit(&self, available: usize) -> usize {
        self.config
            .num_iterations
            .map_or(available, |limit| limit.min(available))
    }
}
