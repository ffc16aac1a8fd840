//! Per-round training record.

use serde::{Deserialize, Serialize};

/// Training loss and tree size per boosting round.
///
/// Index 0 of `train_loss` is the loss of the bias-only model; entry `i`
/// is the loss after `i` trees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Mean logistic loss on the training set
    pub train_loss: Vec<f64>,
    /// Leaves in the tree grown at each round
    pub num_leaves: Vec<usize>,
}

impl TrainingHistory {
    /// Number of completed boosting rounds.
    pub fn rounds(&self) -> usize {
        self.num_leaves.len()
    }

    /// Loss of the bias-only model.
    pub fn initial_loss(&self) -> Option<f64> {
        self.train_loss.first().copied()
    }

    /// Loss after the last round.
    pub fn final_loss(&self) -> Option<f64> {
        self.train_loss.last().copied()
    }

    /// True when no round increased the loss by more than `tolerance`.
    pub fn is_non_increasing(&self, tolerance: f64) -> bool {
        self.train_loss
            .windows(2)
            .all(|pair| pair[1] <= pair[0] + tolerance)
    }

    pub(crate) fn record_initial(&mut self, loss: f64) {
        self.train_loss.push(loss);
    }

    pub(crate) fn record_round(&mut self, loss: f64, num_leaves: usize) {
        self.train_loss.push(loss);
        self.num_leaves.push(num_leaves);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_accessors() {
        let mut history = TrainingHistory::default();
        assert_eq!(history.initial_loss(), None);

        history.record_initial(0.69);
        history.record_round(0.5, 4);
        history.record_round(0.4, 3);

        assert_eq!(history.rounds(), 2);
        assert_eq!(history.initial_loss(), Some(0.69));
        assert_eq!(history.final_loss(), Some(0.4));
        assert!(history.is_non_increasing(0.0));

        history.record_round(0.45, 2);
        assert!(!history.is_non_increasing(1e-3));
        assert!(history.is_non_increasing(0.1));
    }
}
