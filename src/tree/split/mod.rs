//! Split finding for regression trees.
//!
//! The gain of a split is the reduction of the second-order loss
//! approximation:
//!
//! ```text
//! gain = G_L² / (H_L + λ) + G_R² / (H_R + λ) - G² / (H + λ)
//! ```
//!
//! and a leaf outputs the Newton step `-G / (H + λ)`, where `λ` is the
//! `lambda_l2` damping term.

pub mod finder;

pub use finder::{SplitFinder, SplitFinderConfig, SplitInfo};

use crate::core::types::Score;

/// Score of a leaf holding gradient sum `sum_gradient` and hessian sum
/// `sum_hessian`. Zero when the damped hessian is not positive.
pub fn leaf_gain(sum_gradient: f64, sum_hessian: f64, lambda_l2: f64) -> f64 {
    let denominator = sum_hessian + lambda_l2;
    if denominator <= 0.0 {
        return 0.0;
    }
    sum_gradient * sum_gradient / denominator
}

/// Gain of splitting a parent into the given left and right children.
pub fn split_gain(
    left_sum_gradient: f64,
    left_sum_hessian: f64,
    right_sum_gradient: f64,
    right_sum_hessian: f64,
    lambda_l2: f64,
) -> f64 {
    let parent_gradient = left_sum_gradient + right_sum_gradient;
    let parent_hessian = left_sum_hessian + right_sum_hessian;
    leaf_gain(left_sum_gradient, left_sum_hessian, lambda_l2)
        + leaf_gain(right_sum_gradient, right_sum_hessian, lambda_l2)
        - leaf_gain(parent_gradient, parent_hessian, lambda_l2)
}

/// Newton leaf value. Zero when the damped hessian is not positive.
pub fn leaf_output(sum_gradient: f64, sum_hessian: f64, lambda_l2: f64) -> Score {
    let denominator = sum_hessian + lambda_l2;
    if denominator <= 0.0 {
        return 0.0;
    }
    -sum_gradient / denominator
}
