//! Core trait definitions.
//!
//! The boosting loop talks to its collaborators only through these traits:
//! an [`ObjectiveFunction`] supplies gradients and hessians, and a
//! [`TreeGrower`] turns them into one regression tree. Neither side knows the
//! concrete type of the other.

use crate::core::error::Result;
use crate::core::types::*;
use crate::tree::Tree;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1};

use std::fmt::Debug;

/// Trait for objective functions that compute gradients and hessians.
pub trait ObjectiveFunction: Send + Sync + Debug {
    /// Compute per-sample gradients and hessians of the loss with respect to
    /// the current raw scores.
    fn compute_gradients(
        &self,
        scores: &ArrayView1<'_, Score>,
        targets: &ArrayView1<'_, f64>,
        gradients: &mut ArrayViewMut1<'_, Score>,
        hessians: &mut ArrayViewMut1<'_, Score>,
    ) -> Result<()>;

    /// Initial raw score (bias) for the given targets.
    fn init_score(&self, targets: &ArrayView1<'_, f64>) -> Score;

    /// Transform a raw score into the output space (e.g. a probability).
    fn transform(&self, score: Score) -> f64;

    /// Mean loss of the raw scores against the targets.
    fn loss(&self, scores: &ArrayView1<'_, Score>, targets: &ArrayView1<'_, f64>) -> f64;

    /// Get the objective function name.
    fn name(&self) -> &'static str;
}

/// Capability interface for growing one regression tree from first and
/// second order statistics.
///
/// `features` is row-major with one row per sample; `gradients` and
/// `hessians` are aligned with its rows.
pub trait TreeGrower: Send + Sync + Debug {
    /// Grow a tree whose leaves hold Newton-step outputs.
    fn grow(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        gradients: &ArrayView1<'_, Score>,
        hessians: &ArrayView1<'_, Score>,
    ) -> Result<Tree>;

    /// Name of the growth strategy for logging.
    fn name(&self) -> &'static str;
}
