//! Gradient boosting trainer.
//!
//! Starting from the log-odds of the training positive rate, each round
//! computes logistic gradients and hessians at the current scores, grows one
//! tree against them, and adds the shrunken tree output to every score.

use crate::boosting::ensemble::Ensemble;
use crate::boosting::history::TrainingHistory;
use crate::boosting::objective::BinaryLogloss;
use crate::config::Config;
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::traits::{ObjectiveFunction, TreeGrower};
use crate::core::types::{label_to_target, FeatureValue, Score};
use crate::tree::create_grower;
use ndarray::{Array1, ArrayView2, Zip};

/// Fits an additive ensemble of regression trees against the logistic loss.
#[derive(Debug)]
pub struct GBDTTrainer {
    config: Config,
    objective: BinaryLogloss,
    grower: Box<dyn TreeGrower>,
}

impl GBDTTrainer {
    /// Create a trainer after validating the configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let grower = create_grower(&config);
        Ok(GBDTTrainer {
            config,
            objective: BinaryLogloss::new(),
            grower,
        })
    }

    /// Replace the tree growth strategy.
    pub fn with_grower(mut self, grower: Box<dyn TreeGrower>) -> Self {
        self.grower = grower;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the active growth strategy.
    pub fn grower_name(&self) -> &'static str {
        self.grower.name()
    }

    /// Train on a row-major feature matrix with one label per row
    /// (`true` = normal).
    pub fn fit(&self, features: &ArrayView2<'_, FeatureValue>, labels: &[bool]) -> Result<Ensemble> {
        self.fit_with_history(features, labels)
            .map(|(ensemble, _)| ensemble)
    }

    /// Train and also return the per-round training loss.
    pub fn fit_with_history(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        labels: &[bool],
    ) -> Result<(Ensemble, TrainingHistory)> {
        self.validate_training_data(features, labels)?;

        if self.config.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build()
                .map_err(|e| {
                    TrafficGbdtError::internal(format!("failed to build thread pool: {}", e))
                })?;
            pool.install(|| self.boost(features, labels))
        } else {
            self.boost(features, labels)
        }
    }

    fn validate_training_data(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        labels: &[bool],
    ) -> Result<()> {
        if features.nrows() == 0 {
            return Err(TrafficGbdtError::data("training set is empty"));
        }
        if features.ncols() == 0 {
            return Err(TrafficGbdtError::data("training set has no features"));
        }
        if labels.len() != features.nrows() {
            return Err(TrafficGbdtError::length_mismatch(
                "labels",
                features.nrows(),
                labels.len(),
            ));
        }
        if let Some(value) = features.iter().find(|v| !v.is_finite()) {
            return Err(TrafficGbdtError::data(format!(
                "training features contain a non-finite value ({})",
                value
            )));
        }

        let positives = labels.iter().filter(|&&label| label).count();
        if positives == 0 || positives == labels.len() {
            let class = if positives == 0 { "anomalous" } else { "normal" };
            if self.config.reject_degenerate_labels {
                return Err(TrafficGbdtError::data(format!(
                    "every training label is {}",
                    class
                )));
            }
            log::warn!(
                "Every training label is {}; the model will predict a constant",
                class
            );
        }
        Ok(())
    }

    fn boost(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        labels: &[bool],
    ) -> Result<(Ensemble, TrainingHistory)> {
        let num_data = features.nrows();
        let learning_rate = self.config.learning_rate;
        let targets: Array1<f64> = labels.iter().map(|&label| label_to_target(label)).collect();

        let base_prediction = self.objective.init_score(&targets.view());
        let mut ensemble = Ensemble::new(base_prediction, learning_rate, features.ncols());
        let mut scores: Array1<Score> = Array1::from_elem(num_data, base_prediction);
        let mut gradients: Array1<Score> = Array1::zeros(num_data);
        let mut hessians: Array1<Score> = Array1::zeros(num_data);
        let mut history = TrainingHistory::default();

        let initial_loss = self.objective.loss(&scores.view(), &targets.view());
        history.record_initial(initial_loss);

        log::info!(
            "Training {} trees ({} grower, {} leaves, lr {}) on {} samples with {} features, {} threads",
            self.config.num_trees,
            self.grower.name(),
            self.config.num_leaves,
            learning_rate,
            num_data,
            features.ncols(),
            self.config.effective_num_threads()
        );
        log::debug!("Base prediction {:.6}, initial loss {:.6}", base_prediction, initial_loss);

        for round in 0..self.config.num_trees {
            self.objective.compute_gradients(
                &scores.view(),
                &targets.view(),
                &mut gradients.view_mut(),
                &mut hessians.view_mut(),
            )?;

            let tree = self
                .grower
                .grow(features, &gradients.view(), &hessians.view())?;

            let outputs = tree.predict_batch(features)?;
            Zip::from(&mut scores)
                .and(&outputs)
                .for_each(|score, &output| *score += learning_rate * output);

            let num_leaves = tree.num_leaves();
            ensemble.add_tree(tree)?;

            let loss = self.objective.loss(&scores.view(), &targets.view());
            history.record_round(loss, num_leaves);
            log::debug!(
                "Round {}: {} leaves, training {} {:.6}",
                round + 1,
                num_leaves,
                self.objective.name(),
                loss
            );
        }

        log::info!(
            "Training finished: {} trees, final training loss {:.6}",
            ensemble.num_trees(),
            history.final_loss().unwrap_or(initial_loss)
        );

        Ok((ensemble, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GrowthStrategy;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn separable(n: usize) -> (Array2<f64>, Vec<bool>) {
        let features = Array2::from_shape_fn((n, 2), |(i, j)| {
            let x = i as f64 / n as f64;
            if j == 0 {
                x
            } else {
                ((i * 7) % 5) as f64
            }
        });
        let labels = (0..n).map(|i| i < n / 2).collect();
        (features, labels)
    }

    fn config(num_trees: usize) -> Config {
        Config {
            num_trees,
            num_leaves: 4,
            min_leaf_samples: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_fit_separable_data() {
        let (features, labels) = separable(40);
        let trainer = GBDTTrainer::new(config(20)).unwrap();
        let ensemble = trainer.fit(&features.view(), &labels).unwrap();

        assert_eq!(ensemble.num_trees(), 20);
        let probabilities = ensemble.predict_probabilities(&features.view()).unwrap();
        for (p, &label) in probabilities.iter().zip(&labels) {
            assert_eq!(*p >= 0.5, label);
        }
    }

    #[test]
    fn test_base_prediction_is_log_odds() {
        let (features, _) = separable(10);
        let labels = vec![true, true, true, false, true, true, true, false, true, true];
        let ensemble = GBDTTrainer::new(config(1))
            .unwrap()
            .fit(&features.view(), &labels)
            .unwrap();

        assert_abs_diff_eq!(ensemble.base_prediction(), (0.8f64 / 0.2).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_history_loss_decreases() {
        let (features, labels) = separable(60);
        let trainer = GBDTTrainer::new(config(15)).unwrap();
        let (ensemble, history) = trainer.fit_with_history(&features.view(), &labels).unwrap();

        assert_eq!(history.rounds(), 15);
        assert_eq!(history.train_loss.len(), 16);
        assert_abs_diff_eq!(history.initial_loss().unwrap(), 2f64.ln(), epsilon = 1e-12);
        assert!(history.is_non_increasing(1e-9));
        assert!(history.final_loss().unwrap() < history.initial_loss().unwrap());

        // Replaying the ensemble reproduces the final training loss
        let scores = ensemble.raw_scores(&features.view()).unwrap();
        let targets: Array1<f64> = labels.iter().map(|&l| label_to_target(l)).collect();
        let replayed = BinaryLogloss::new().loss(&scores.view(), &targets.view());
        assert_abs_diff_eq!(replayed, history.final_loss().unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_labels() {
        let (features, _) = separable(12);
        let labels = vec![true; 12];

        let ensemble = GBDTTrainer::new(config(5))
            .unwrap()
            .fit(&features.view(), &labels)
            .unwrap();
        let probabilities = ensemble.predict_probabilities(&features.view()).unwrap();
        assert!(probabilities.iter().all(|&p| p > 0.99));
        assert!(ensemble.trees().iter().all(|t| t.num_leaves() == 1));

        let strict = Config {
            reject_degenerate_labels: true,
            ..config(5)
        };
        let err = GBDTTrainer::new(strict)
            .unwrap()
            .fit(&features.view(), &labels)
            .unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_invalid_training_data() {
        let trainer = GBDTTrainer::new(config(3)).unwrap();

        let empty = Array2::<f64>::zeros((0, 7));
        assert!(trainer.fit(&empty.view(), &[]).unwrap_err().is_data_error());

        let (features, labels) = separable(10);
        assert!(trainer.fit(&features.view(), &labels[..9]).is_err());

        let mut with_nan = features.clone();
        with_nan[[3, 1]] = f64::NAN;
        assert!(trainer.fit(&with_nan.view(), &labels).unwrap_err().is_data_error());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = GBDTTrainer::new(Config {
            num_leaves: 0,
            ..Config::default()
        })
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_dedicated_thread_pool_matches_default() {
        let (features, labels) = separable(50);
        let pooled = GBDTTrainer::new(Config {
            num_threads: 2,
            ..config(10)
        })
        .unwrap()
        .fit(&features.view(), &labels)
        .unwrap();
        let default = GBDTTrainer::new(config(10))
            .unwrap()
            .fit(&features.view(), &labels)
            .unwrap();
        assert_eq!(pooled, default);
    }

    #[test]
    fn test_with_grower_swaps_strategy() {
        let depth_wise = Config {
            growth_strategy: GrowthStrategy::DepthWise,
            ..config(5)
        };
        let trainer = GBDTTrainer::new(config(5))
            .unwrap()
            .with_grower(create_grower(&depth_wise));
        assert_eq!(trainer.grower_name(), "depth_wise");

        let (features, labels) = separable(30);
        assert_eq!(trainer.fit(&features.view(), &labels).unwrap().num_trees(), 5);
    }
}
