//! Binary logistic objective.

use crate::core::constants::PROBABILITY_EPSILON;
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::traits::ObjectiveFunction;
use crate::core::types::Score;
use ndarray::{ArrayView1, ArrayViewMut1, Zip};

/// Logistic function, evaluated without overflow for large `|score|`.
pub fn sigmoid(score: Score) -> f64 {
    if score >= 0.0 {
        1.0 / (1.0 + (-score).exp())
    } else {
        let e = score.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^x)` without overflow.
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Logistic loss for labels in {0, 1}, where 1 is normal traffic.
///
/// Gradients are taken with respect to the raw margin: `g = p - y` and
/// `h = p (1 - p)` with `p = sigmoid(score)`.
#[derive(Debug, Clone, Copy)]
pub struct BinaryLogloss {
    epsilon: f64,
}

impl Default for BinaryLogloss {
    fn default() -> Self {
        BinaryLogloss {
            epsilon: PROBABILITY_EPSILON,
        }
    }
}

impl BinaryLogloss {
    /// Create the objective with the default probability clamp.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probability clamp used by the initial score.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl ObjectiveFunction for BinaryLogloss {
    fn compute_gradients(
        &self,
        scores: &ArrayView1<'_, Score>,
        targets: &ArrayView1<'_, f64>,
        gradients: &mut ArrayViewMut1<'_, Score>,
        hessians: &mut ArrayViewMut1<'_, Score>,
    ) -> Result<()> {
        let n = scores.len();
        for (what, len) in [
            ("targets", targets.len()),
            ("gradients", gradients.len()),
            ("hessians", hessians.len()),
        ] {
            if len != n {
                return Err(TrafficGbdtError::length_mismatch(what, n, len));
            }
        }

        Zip::from(gradients)
            .and(hessians)
            .and(scores)
            .and(targets)
            .for_each(|gradient, hessian, &score, &target| {
                let probability = sigmoid(score);
                *gradient = probability - target;
                *hessian = probability * (1.0 - probability);
            });
        Ok(())
    }

    fn init_score(&self, targets: &ArrayView1<'_, f64>) -> Score {
        if targets.is_empty() {
            return 0.0;
        }
        let positive_rate = targets.mean().unwrap_or(0.5);
        let p = positive_rate.clamp(self.epsilon, 1.0 - self.epsilon);
        (p / (1.0 - p)).ln()
    }

    fn transform(&self, score: Score) -> f64 {
        sigmoid(score)
    }

    fn loss(&self, scores: &ArrayView1<'_, Score>, targets: &ArrayView1<'_, f64>) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        // -[y ln p + (1 - y) ln(1 - p)] == softplus(s) - y s
        let total: f64 = scores
            .iter()
            .zip(targets.iter())
            .map(|(&score, &target)| softplus(score) - target * score)
            .sum();
        total / scores.len() as f64
    }

    fn name(&self) -> &'static str {
        "binary_logloss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_sigmoid() {
        assert_abs_diff_eq!(sigmoid(0.0), 0.5);
        assert_abs_diff_eq!(sigmoid(2.0) + sigmoid(-2.0), 1.0, epsilon = 1e-12);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn test_gradients_point_toward_label() {
        let objective = BinaryLogloss::new();
        let scores = array![0.0, 0.0];
        let targets = array![1.0, 0.0];
        let mut gradients = Array1::zeros(2);
        let mut hessians = Array1::zeros(2);

        objective
            .compute_gradients(
                &scores.view(),
                &targets.view(),
                &mut gradients.view_mut(),
                &mut hessians.view_mut(),
            )
            .unwrap();

        assert_abs_diff_eq!(gradients[0], -0.5);
        assert_abs_diff_eq!(gradients[1], 0.5);
        assert_abs_diff_eq!(hessians[0], 0.25);
        assert_abs_diff_eq!(hessians[1], 0.25);
    }

    #[test]
    fn test_gradient_length_mismatch() {
        let objective = BinaryLogloss::new();
        let scores = array![0.0, 0.0];
        let targets = array![1.0];
        let mut gradients = Array1::zeros(2);
        let mut hessians = Array1::zeros(2);

        let err = objective
            .compute_gradients(
                &scores.view(),
                &targets.view(),
                &mut gradients.view_mut(),
                &mut hessians.view_mut(),
            )
            .unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_init_score_is_log_odds() {
        let objective = BinaryLogloss::new();
        let targets = array![1.0, 1.0, 1.0, 0.0];
        assert_abs_diff_eq!(objective.init_score(&targets.view()), 3.0f64.ln(), epsilon = 1e-12);

        let balanced = array![1.0, 0.0];
        assert_abs_diff_eq!(objective.init_score(&balanced.view()), 0.0);
    }

    #[test]
    fn test_init_score_clamped_for_single_class() {
        let objective = BinaryLogloss::new();
        let all_normal = Array1::from_elem(10, 1.0);
        let score = objective.init_score(&all_normal.view());
        assert!(score.is_finite());
        assert!(score > 30.0);

        let all_anomalous = Array1::from_elem(10, 0.0);
        let score = objective.init_score(&all_anomalous.view());
        assert!(score.is_finite());
        assert!(score < -30.0);
    }

    #[test]
    fn test_loss_matches_cross_entropy() {
        let objective = BinaryLogloss::new();
        let scores = array![0.3, -1.2, 2.0];
        let targets = array![1.0, 0.0, 0.0];

        let expected = scores
            .iter()
            .zip(targets.iter())
            .map(|(&s, &y)| {
                let p = sigmoid(s);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum::<f64>()
            / 3.0;
        assert_abs_diff_eq!(objective.loss(&scores.view(), &targets.view()), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_loss_is_finite_for_extreme_scores() {
        let objective = BinaryLogloss::new();
        let scores = array![800.0, -800.0];
        let targets = array![0.0, 1.0];
        let loss = objective.loss(&scores.view(), &targets.view());
        assert!(loss.is_finite());
        assert_abs_diff_eq!(loss, 800.0, epsilon = 1e-9);
    }
}
