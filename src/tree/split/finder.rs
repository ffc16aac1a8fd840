//! Exact split finding.
//!
//! Every feature is searched over the sorted unique values observed in the
//! node. Features are evaluated in parallel with rayon; the per-feature
//! results are then reduced in feature order, so the chosen split does not
//! depend on thread scheduling.

use crate::config::Config;
use crate::core::types::{DataSize, FeatureIndex, FeatureValue, Score};
use crate::tree::split::{leaf_output, split_gain};
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Information about a candidate split point.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Feature index for the split
    pub feature: FeatureIndex,
    /// Samples with `value <= threshold` go left
    pub threshold: FeatureValue,
    /// Split gain
    pub gain: f64,
    /// Sum of gradients in the left child
    pub left_sum_gradient: f64,
    /// Sum of hessians in the left child
    pub left_sum_hessian: f64,
    /// Samples in the left child
    pub left_count: DataSize,
    /// Sum of gradients in the right child
    pub right_sum_gradient: f64,
    /// Sum of hessians in the right child
    pub right_sum_hessian: f64,
    /// Samples in the right child
    pub right_count: DataSize,
}

impl SplitInfo {
    /// Returns true if this split separates samples and improves the loss.
    pub fn is_valid(&self) -> bool {
        self.gain > 0.0 && self.left_count > 0 && self.right_count > 0
    }

    /// Newton output of the left child.
    pub fn left_output(&self, lambda_l2: f64) -> Score {
        leaf_output(self.left_sum_gradient, self.left_sum_hessian, lambda_l2)
    }

    /// Newton output of the right child.
    pub fn right_output(&self, lambda_l2: f64) -> Score {
        leaf_output(self.right_sum_gradient, self.right_sum_hessian, lambda_l2)
    }

    /// Ordering used by the reducer: higher gain first, then lower feature
    /// index, then smaller threshold.
    pub fn is_better_than(&self, other: &SplitInfo) -> bool {
        match self.gain.partial_cmp(&other.gain) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) | None => false,
            Some(Ordering::Equal) => match self.feature.cmp(&other.feature) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => self.threshold < other.threshold,
            },
        }
    }
}

/// Configuration for split finding operations.
#[derive(Debug, Clone)]
pub struct SplitFinderConfig {
    /// Minimum number of samples required in each child
    pub min_leaf_samples: DataSize,
    /// Minimum sum of hessians required in each child
    pub min_sum_hessian_in_leaf: f64,
    /// L2 damping added to hessian sums
    pub lambda_l2: f64,
    /// A split must gain strictly more than this
    pub min_gain_to_split: f64,
}

impl Default for SplitFinderConfig {
    fn default() -> Self {
        SplitFinderConfig::from(&Config::default())
    }
}

impl From<&Config> for SplitFinderConfig {
    fn from(config: &Config) -> Self {
        SplitFinderConfig {
            min_leaf_samples: config.min_leaf_samples,
            min_sum_hessian_in_leaf: config.min_sum_hessian_in_leaf,
            lambda_l2: config.lambda_l2,
            min_gain_to_split: config.min_gain_to_split,
        }
    }
}

/// Exact split finder over raw feature values.
#[derive(Debug, Clone)]
pub struct SplitFinder {
    config: SplitFinderConfig,
}

impl SplitFinder {
    /// Creates a new split finder with the given configuration.
    pub fn new(config: SplitFinderConfig) -> Self {
        SplitFinder { config }
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &SplitFinderConfig {
        &self.config
    }

    /// Finds the best split for one feature among the samples in `indices`.
    ///
    /// `sum_gradient` and `sum_hessian` are the totals over `indices`.
    pub fn find_best_split_for_feature(
        &self,
        feature: FeatureIndex,
        values: &ArrayView1<'_, FeatureValue>,
        gradients: &ArrayView1<'_, Score>,
        hessians: &ArrayView1<'_, Score>,
        indices: &[usize],
        sum_gradient: f64,
        sum_hessian: f64,
    ) -> Option<SplitInfo> {
        let total_count = indices.len();
        if total_count < 2 * self.config.min_leaf_samples.max(1) {
            return None;
        }

        let mut sorted: Vec<(FeatureValue, Score, Score)> = indices
            .iter()
            .map(|&i| (values[i], gradients[i], hessians[i]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut best: Option<SplitInfo> = None;
        let mut left_sum_gradient = 0.0;
        let mut left_sum_hessian = 0.0;

        // A threshold can only sit between two distinct values
        for position in 0..total_count - 1 {
            let (value, gradient, hessian) = sorted[position];
            left_sum_gradient += gradient;
            left_sum_hessian += hessian;

            if sorted[position + 1].0 <= value {
                continue;
            }

            let left_count = position + 1;
            let right_count = total_count - left_count;
            if left_count < self.config.min_leaf_samples {
                continue;
            }
            if right_count < self.config.min_leaf_samples {
                break;
            }

            let right_sum_gradient = sum_gradient - left_sum_gradient;
            let right_sum_hessian = sum_hessian - left_sum_hessian;
            if left_sum_hessian < self.config.min_sum_hessian_in_leaf
                || right_sum_hessian < self.config.min_sum_hessian_in_leaf
            {
                continue;
            }

            let gain = split_gain(
                left_sum_gradient,
                left_sum_hessian,
                right_sum_gradient,
                right_sum_hessian,
                self.config.lambda_l2,
            );
            if gain <= self.config.min_gain_to_split {
                continue;
            }

            // Strict comparison keeps the smallest threshold on ties
            if best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitInfo {
                    feature,
                    threshold: value,
                    gain,
                    left_sum_gradient,
                    left_sum_hessian,
                    left_count,
                    right_sum_gradient,
                    right_sum_hessian,
                    right_count,
                });
            }
        }

        best.filter(SplitInfo::is_valid)
    }

    /// Finds the best split across every feature.
    pub fn find_best_split(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        gradients: &ArrayView1<'_, Score>,
        hessians: &ArrayView1<'_, Score>,
        indices: &[usize],
        sum_gradient: f64,
        sum_hessian: f64,
    ) -> Option<SplitInfo> {
        let candidates: Vec<Option<SplitInfo>> = (0..features.ncols())
            .into_par_iter()
            .map(|feature| {
                self.find_best_split_for_feature(
                    feature,
                    &features.column(feature),
                    gradients,
                    hessians,
                    indices,
                    sum_gradient,
                    sum_hessian,
                )
            })
            .collect();

        candidates
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitInfo>, candidate| match best {
                Some(current) if !candidate.is_better_than(&current) => Some(current),
                _ => Some(candidate),
            })
    }
}
