//! Best-first (leaf-wise) tree growth.
//!
//! Every open leaf keeps its best candidate split. Each step expands the
//! candidate with the highest gain, ties going to the lower node index, until
//! the leaf budget is spent or no leaf has a valid split left.

use crate::core::error::Result;
use crate::core::traits::TreeGrower;
use crate::core::types::{FeatureValue, Score};
use crate::tree::learner::{
    apply_split, finalize_tree_outputs, find_node_split, init_root, validate_inputs,
    GrowerConfig, NodeInfo,
};
use crate::tree::split::{SplitFinder, SplitInfo};
use crate::tree::tree::Tree;
use ndarray::{ArrayView1, ArrayView2};

/// Leaf-wise tree grower bounded by a leaf budget.
#[derive(Debug, Clone)]
pub struct LeafWiseGrower {
    config: GrowerConfig,
    split_finder: SplitFinder,
}

impl LeafWiseGrower {
    /// Creates a new grower with the given configuration.
    pub fn new(config: GrowerConfig) -> Self {
        let split_finder = SplitFinder::new(config.split.clone());
        LeafWiseGrower {
            config,
            split_finder,
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &GrowerConfig {
        &self.config
    }

    fn best_candidate(candidates: &[(NodeInfo, SplitInfo)]) -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .reduce(|best, current| {
                let (_, (best_node, best_split)) = best;
                let (_, (node, split)) = current;
                if split.gain > best_split.gain
                    || (split.gain == best_split.gain && node.node_index < best_node.node_index)
                {
                    current
                } else {
                    best
                }
            })
            .map(|(position, _)| position)
    }
}

impl TreeGrower for LeafWiseGrower {
    fn grow(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        gradients: &ArrayView1<'_, Score>,
        hessians: &ArrayView1<'_, Score>,
    ) -> Result<Tree> {
        validate_inputs(features, gradients, hessians)?;

        let (mut tree, root) = init_root(self.config.max_leaves, gradients, hessians);
        let mut candidates: Vec<(NodeInfo, SplitInfo)> = Vec::new();

        let evaluate = |node: &NodeInfo| {
            find_node_split(
                &self.config,
                &self.split_finder,
                features,
                gradients,
                hessians,
                node,
            )
        };

        if let Some(split) = evaluate(&root) {
            candidates.push((root, split));
        }

        while tree.num_leaves() < self.config.max_leaves {
            let Some(position) = Self::best_candidate(&candidates) else {
                break;
            };
            let (node, split) = candidates.swap_remove(position);
            let (left, right) = apply_split(&mut tree, features, &node, &split)?;

            for child in [left, right] {
                if let Some(split) = evaluate(&child) {
                    candidates.push((child, split));
                }
            }
        }

        finalize_tree_outputs(&mut tree, self.config.split.lambda_l2)?;
        log::trace!(
            "Leaf-wise grower built {} leaves (depth {})",
            tree.num_leaves(),
            tree.depth()
        );
        Ok(tree)
    }

    fn name(&self) -> &'static str {
        "leaf_wise"
    }
}
