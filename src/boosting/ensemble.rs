//! Additive tree ensemble.
//!
//! The raw score of a feature vector is
//! `base_prediction + learning_rate * Σ tree(x)` and its probability of being
//! normal traffic is the sigmoid of that score.

use crate::boosting::objective::sigmoid;
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::{FeatureValue, Score};
use crate::tree::Tree;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trained model: a bias plus shrunken tree outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    /// Trees in the order they were grown
    trees: Vec<Tree>,
    /// Shrinkage applied to every tree output
    learning_rate: f64,
    /// Log-odds of the training positive rate
    base_prediction: Score,
    /// Dimension of the feature vectors the trees were grown on
    num_features: usize,
}

impl Ensemble {
    /// Creates an ensemble with no trees.
    pub fn new(base_prediction: Score, learning_rate: f64, num_features: usize) -> Self {
        Ensemble {
            trees: Vec::new(),
            learning_rate,
            base_prediction,
            num_features,
        }
    }

    /// Appends a tree grown on `num_features`-dimensional input.
    pub fn add_tree(&mut self, tree: Tree) -> Result<()> {
        tree.validate(self.num_features)?;
        self.trees.push(tree);
        Ok(())
    }

    /// Returns the trees.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Returns the number of trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Returns the shrinkage factor.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Returns the bias term.
    pub fn base_prediction(&self) -> Score {
        self.base_prediction
    }

    /// Returns the expected feature vector length.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Raw margin of one feature vector.
    pub fn raw_score(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<Score> {
        if features.len() != self.num_features {
            return Err(TrafficGbdtError::length_mismatch(
                "feature vector",
                self.num_features,
                features.len(),
            ));
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict(features)?;
        }
        Ok(self.base_prediction + self.learning_rate * sum)
    }

    /// Probability that the feature vector is normal traffic.
    pub fn predict_probability(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<f64> {
        Ok(sigmoid(self.raw_score(features)?))
    }

    /// Raw margins for every row.
    pub fn raw_scores(&self, features: &ArrayView2<'_, FeatureValue>) -> Result<Array1<Score>> {
        let mut scores = Array1::zeros(features.nrows());
        for (score, row) in scores.iter_mut().zip(features.axis_iter(Axis(0))) {
            *score = self.raw_score(&row)?;
        }
        Ok(scores)
    }

    /// Probabilities for every row.
    pub fn predict_probabilities(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
    ) -> Result<Array1<f64>> {
        Ok(self.raw_scores(features)?.mapv(sigmoid))
    }

    /// Total split gain per feature over all trees.
    pub fn feature_importance(&self) -> Array1<f64> {
        self.trees
            .iter()
            .fold(Array1::zeros(self.num_features), |acc, tree| {
                acc + tree.feature_importance(self.num_features)
            })
    }

    /// Checks that the model can score feature vectors.
    ///
    /// An ensemble without trees is a valid constant model.
    pub fn validate(&self) -> Result<()> {
        if self.num_features == 0 {
            return Err(TrafficGbdtError::model_state("ensemble has zero features"));
        }
        if !self.base_prediction.is_finite() {
            return Err(TrafficGbdtError::model_state(format!(
                "base prediction {} is not finite",
                self.base_prediction
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrafficGbdtError::model_state(format!(
                "learning rate {} is not usable",
                self.learning_rate
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.num_features).map_err(|e| {
                TrafficGbdtError::model_state(format!("tree {} is invalid: {}", i, e))
            })?;
        }
        Ok(())
    }

    /// Calculates ensemble statistics.
    pub fn statistics(&self) -> EnsembleStatistics {
        let total_trees = self.trees.len();
        let mean = |f: fn(&Tree) -> usize| {
            if total_trees > 0 {
                self.trees.iter().map(f).sum::<usize>() as f64 / total_trees as f64
            } else {
                0.0
            }
        };
        let importance = self.feature_importance();

        EnsembleStatistics {
            total_trees,
            avg_tree_depth: mean(Tree::depth),
            avg_tree_leaves: mean(Tree::num_leaves),
            num_features_used: importance.iter().filter(|&&v| v > 0.0).count(),
            learning_rate: self.learning_rate,
            base_prediction: self.base_prediction,
        }
    }

    /// Exports the ensemble to a JSON representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Imports an ensemble from a JSON representation and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let ensemble: Ensemble = serde_json::from_str(json)?;
        ensemble.validate()?;
        Ok(ensemble)
    }
}

/// Statistics about the ensemble.
#[derive(Debug, Clone)]
pub struct EnsembleStatistics {
    /// Total number of trees
    pub total_trees: usize,
    /// Average tree depth
    pub avg_tree_depth: f64,
    /// Average number of leaves per tree
    pub avg_tree_leaves: f64,
    /// Number of features used by at least one split
    pub num_features_used: usize,
    /// Ensemble learning rate
    pub learning_rate: f64,
    /// Bias term
    pub base_prediction: Score,
}

impl fmt::Display for EnsembleStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EnsembleStats(trees={}, avg_depth={:.1}, avg_leaves={:.1}, features_used={}, lr={:.3}, bias={:.4})",
            self.total_trees,
            self.avg_tree_depth,
            self.avg_tree_leaves,
            self.num_features_used,
            self.learning_rate,
            self.base_prediction
        )
    }
}
