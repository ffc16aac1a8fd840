//! End-to-end training pipeline.
//!
//! [`TrainingPipeline::fit`] learns the normalization ranges, normalizes the
//! training samples and boosts an ensemble on them. The resulting
//! [`FittedPipeline`] applies the same normalization to every sample it
//! evaluates or scores afterwards.

use crate::boosting::{Ensemble, GBDTTrainer, TrainingHistory};
use crate::config::Config;
use crate::core::constants::NUM_FEATURES;
use crate::core::error::Result;
use crate::dataset::{FeatureAssembler, FeatureVector, NormalizationModel, TrafficSample};
use crate::metrics_eval::{EvaluationMetrics, Evaluator};
use serde::{Deserialize, Serialize};

/// Stateless entry point that fits a [`FittedPipeline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingPipeline;

impl TrainingPipeline {
    /// Fit normalization and train the ensemble on labelled samples.
    pub fn fit(samples: &[TrafficSample], config: &Config) -> Result<FittedPipeline> {
        Self::fit_with_history(samples, config).map(|(pipeline, _)| pipeline)
    }

    /// Like [`fit`](Self::fit), also returning per-round training loss.
    pub fn fit_with_history(
        samples: &[TrafficSample],
        config: &Config,
    ) -> Result<(FittedPipeline, TrainingHistory)> {
        let trainer = GBDTTrainer::new(config.clone())?;
        let assembler = FeatureAssembler::new();

        log::info!("Fitting pipeline on {} samples", samples.len());
        let labels = assembler.labels(samples)?;
        let (normalization, features) = assembler.fit_transform(samples)?;
        let (ensemble, history) = trainer.fit_with_history(&features.view(), &labels)?;

        let pipeline = FittedPipeline::new(normalization, ensemble)?;
        Ok((pipeline, history))
    }
}

/// Normalization ranges plus the ensemble trained on normalized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    normalization: NormalizationModel,
    ensemble: Ensemble,
}

impl FittedPipeline {
    /// Pair a normalization model with an ensemble, checking they agree.
    pub fn new(normalization: NormalizationModel, ensemble: Ensemble) -> Result<Self> {
        let pipeline = FittedPipeline {
            normalization,
            ensemble,
        };
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Returns the normalization model.
    pub fn normalization(&self) -> &NormalizationModel {
        &self.normalization
    }

    /// Returns the ensemble.
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Check that both halves are usable and agree on the feature count.
    pub fn validate(&self) -> Result<()> {
        self.normalization.validate()?;
        self.ensemble.validate()?;
        crate::ensure!(
            self.ensemble.num_features() == NUM_FEATURES,
            crate::model_state_error!(
                "ensemble expects {} features, normalization produces {}",
                self.ensemble.num_features(),
                self.normalization.num_features()
            )
        );
        Ok(())
    }

    /// Normalized feature vector of one sample.
    pub fn transform(&self, sample: &TrafficSample) -> Result<FeatureVector> {
        FeatureAssembler::new().transform_one(sample, &self.normalization)
    }

    /// Normalize labelled samples and compute classification metrics.
    pub fn evaluate(&self, samples: &[TrafficSample]) -> Result<EvaluationMetrics> {
        let assembler = FeatureAssembler::new();
        let labels = assembler.labels(samples)?;
        let features = assembler.transform_matrix(samples, &self.normalization)?;
        Evaluator::new().evaluate(&self.ensemble, &features.view(), &labels)
    }
}
