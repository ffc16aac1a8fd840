//! Evaluation metrics for the traffic classifier.
//!
//! Normal traffic is the positive class for every metric. A sample is
//! predicted normal when its probability is at least
//! [`DECISION_THRESHOLD`](crate::core::constants::DECISION_THRESHOLD).

use crate::boosting::{sigmoid, Ensemble};
use crate::core::constants::{DECISION_THRESHOLD, DEGENERATE_AUC, PROBABILITY_EPSILON};
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::{FeatureValue, Score};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Binary classification metrics computed over one labelled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Fraction of correctly classified samples
    pub accuracy: f64,
    /// Area under the ROC curve
    pub auc: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Precision for the normal class
    pub precision: f64,
    /// Recall for the normal class
    pub recall: f64,
    /// Mean binary cross-entropy
    pub log_loss: f64,
    /// Normal samples predicted normal
    pub true_positives: usize,
    /// Anomalous samples predicted normal
    pub false_positives: usize,
    /// Anomalous samples predicted anomalous
    pub true_negatives: usize,
    /// Normal samples predicted anomalous
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    /// Number of evaluated samples.
    pub fn num_samples(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model accuracy: {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "AUC: {:.2}%", self.auc * 100.0)?;
        write!(f, "F1 Score: {:.2}%", self.f1 * 100.0)
    }
}

/// Scores a fitted ensemble against labelled feature vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    /// Create an evaluator.
    pub fn new() -> Self {
        Evaluator
    }

    /// Score every row of `features` and compare against `labels`
    /// (`true` = normal).
    ///
    /// AUC is ranked on the raw margins, which stay distinct where the
    /// sigmoid saturates.
    pub fn evaluate(
        &self,
        ensemble: &Ensemble,
        features: &ArrayView2<'_, FeatureValue>,
        labels: &[bool],
    ) -> Result<EvaluationMetrics> {
        if labels.len() != features.nrows() {
            return Err(TrafficGbdtError::length_mismatch(
                "labels",
                features.nrows(),
                labels.len(),
            ));
        }
        let margins = ensemble.raw_scores(features)?;
        let probabilities = margins.mapv(sigmoid);
        let metrics = self.compute(&probabilities.view(), &margins.view(), labels)?;
        log::info!(
            "Evaluated {} samples: accuracy {:.4}, AUC {:.4}, F1 {:.4}",
            labels.len(),
            metrics.accuracy,
            metrics.auc,
            metrics.f1
        );
        Ok(metrics)
    }

    /// Compute metrics from already predicted probabilities.
    pub fn evaluate_probabilities(
        &self,
        probabilities: &ArrayView1<'_, f64>,
        labels: &[bool],
    ) -> Result<EvaluationMetrics> {
        self.compute(probabilities, probabilities, labels)
    }

    fn compute(
        &self,
        probabilities: &ArrayView1<'_, f64>,
        ranking: &ArrayView1<'_, Score>,
        labels: &[bool],
    ) -> Result<EvaluationMetrics> {
        if labels.is_empty() {
            return Err(TrafficGbdtError::data("cannot evaluate an empty dataset"));
        }
        if probabilities.len() != labels.len() {
            return Err(TrafficGbdtError::length_mismatch(
                "probabilities",
                labels.len(),
                probabilities.len(),
            ));
        }
        if let Some(p) = probabilities.iter().chain(ranking.iter()).find(|p| !p.is_finite()) {
            return Err(TrafficGbdtError::data(format!(
                "predicted score {} is not finite",
                p
            )));
        }

        let mut tp = 0;
        let mut fp = 0;
        let mut tn = 0;
        let mut fn_ = 0;
        for (&probability, &label) in probabilities.iter().zip(labels) {
            match (probability >= DECISION_THRESHOLD, label) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, false) => tn += 1,
                (false, true) => fn_ += 1,
            }
        }

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(EvaluationMetrics {
            accuracy: ratio(tp + tn, labels.len()),
            auc: auc(ranking, labels),
            f1,
            precision,
            recall,
            log_loss: log_loss(probabilities, labels),
            true_positives: tp,
            false_positives: fp,
            true_negatives: tn,
            false_negatives: fn_,
        })
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

/// Rank-based area under the ROC curve.
///
/// Counts (normal, anomalous) pairs where the normal sample scores strictly
/// higher, with tied pairs counting one half. With only one class present
/// the AUC is undefined and [`DEGENERATE_AUC`] is returned. Scores are
/// ordered by [`f64::total_cmp`], so a NaN score ranks above every number.
pub fn auc(scores: &ArrayView1<'_, f64>, labels: &[bool]) -> f64 {
    let positives = labels.iter().filter(|&&label| label).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        log::warn!(
            "AUC is undefined with a single class ({} normal, {} anomalous); reporting {}",
            positives,
            negatives,
            DEGENERATE_AUC
        );
        return DEGENERATE_AUC;
    }

    let mut ranked: Vec<(f64, bool)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Walk groups of equal score in ascending order
    let mut concordant = 0.0;
    let mut negatives_below = 0usize;
    let mut start = 0;
    while start < ranked.len() {
        let score = ranked[start].0;
        let mut end = start;
        let mut group_pos = 0usize;
        let mut group_neg = 0usize;
        while end < ranked.len() && ranked[end].0.total_cmp(&score) == Ordering::Equal {
            if ranked[end].1 {
                group_pos += 1;
            } else {
                group_neg += 1;
            }
            end += 1;
        }
        concordant += group_pos as f64 * negatives_below as f64;
        concordant += 0.5 * group_pos as f64 * group_neg as f64;
        negatives_below += group_neg;
        start = end;
    }

    concordant / (positives as f64 * negatives as f64)
}

/// Mean binary cross-entropy of probabilities against labels.
pub fn log_loss(probabilities: &ArrayView1<'_, f64>, labels: &[bool]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = probabilities
        .iter()
        .zip(labels)
        .map(|(&p, &label)| {
            let p = p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            if label {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / labels.len() as f64
}
