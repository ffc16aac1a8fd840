//! Breadth-first (depth-wise) tree growth.
//!
//! Nodes are expanded level by level from a FIFO queue. The same leaf budget
//! as the leaf-wise grower applies, so the last level may be partially
//! expanded.

use crate::core::error::Result;
use crate::core::traits::TreeGrower;
use crate::core::types::{FeatureValue, Score};
use crate::tree::learner::{
    apply_split, finalize_tree_outputs, find_node_split, init_root, validate_inputs,
    GrowerConfig,
};
use crate::tree::split::SplitFinder;
use crate::tree::tree::Tree;
use ndarray::{ArrayView1, ArrayView2};
use std::collections::VecDeque;

/// Depth-wise tree grower.
#[derive(Debug, Clone)]
pub struct DepthWiseGrower {
    config: GrowerConfig,
    split_finder: SplitFinder,
}

impl DepthWiseGrower {
    /// Creates a new grower with the given configuration.
    pub fn new(config: GrowerConfig) -> Self {
        let split_finder = SplitFinder::new(config.split.clone());
        DepthWiseGrower {
            config,
            split_finder,
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &GrowerConfig {
        &self.config
    }
}

impl TreeGrower for DepthWiseGrower {
    fn grow(
        &self,
        features: &ArrayView2<'_, FeatureValue>,
        gradients: &ArrayView1<'_, Score>,
        hessians: &ArrayView1<'_, Score>,
    ) -> Result<Tree> {
        validate_inputs(features, gradients, hessians)?;

        let (mut tree, root) = init_root(self.config.max_leaves, gradients, hessians);

        let mut node_queue = VecDeque::new();
        node_queue.push_back(root);

        while let Some(node_info) = node_queue.pop_front() {
            if tree.num_leaves() >= self.config.max_leaves {
                break;
            }

            let split = find_node_split(
                &self.config,
                &self.split_finder,
                features,
                gradients,
                hessians,
                &node_info,
            );

            if let Some(split) = split {
                let (left, right) = apply_split(&mut tree, features, &node_info, &split)?;
                node_queue.push_back(left);
                node_queue.push_back(right);
            }
        }

        finalize_tree_outputs(&mut tree, self.config.split.lambda_l2)?;
        log::trace!(
            "Depth-wise grower built {} leaves (depth {})",
            tree.num_leaves(),
            tree.depth()
        );
        Ok(tree)
    }

    fn name(&self) -> &'static str {
        "depth_wise"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::split::SplitFinderConfig;
    use ndarray::{array, Array1, Array2};

    fn grower(max_leaves: usize, max_depth: Option<usize>) -> DepthWiseGrower {
        DepthWiseGrower::new(GrowerConfig {
            max_leaves,
            max_depth,
            split: SplitFinderConfig {
                min_leaf_samples: 1,
                min_sum_hessian_in_leaf: 0.0,
                lambda_l2: 0.0,
                min_gain_to_split: 0.0,
            },
        })
    }

    #[test]
    fn test_levels_fill_before_going_deeper() {
        let n = 16;
        let features = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let gradients = Array1::from_shape_fn(n, |i| if (i / 2) % 2 == 0 { -1.0 } else { 1.0 });
        let hessians = Array1::from_elem(n, 0.25);

        let tree = grower(3, None)
            .grow(&features.view(), &gradients.view(), &hessians.view())
            .unwrap();

        // Root's two children are queued before any grandchild, so the third
        // leaf comes from splitting a depth-1 node
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert!(tree.validate(1).is_ok());
    }

    #[test]
    fn test_matches_leaf_budget_and_depth() {
        let n = 40;
        let features = Array2::from_shape_fn((n, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f64);
        let gradients = Array1::from_shape_fn(n, |i| if i % 4 < 2 { 0.5 } else { -0.5 });
        let hessians = Array1::from_elem(n, 0.25);

        let tree = grower(6, Some(2))
            .grow(&features.view(), &gradients.view(), &hessians.view())
            .unwrap();
        assert!(tree.num_leaves() <= 4);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_pure_node_is_not_split() {
        let features = array![[0.0], [1.0], [2.0], [3.0]];
        let gradients = array![-0.5, -0.5, -0.5, -0.5];
        let hessians = Array1::from_elem(4, 0.25);

        let tree = grower(8, None)
            .grow(&features.view(), &gradients.view(), &hessians.view())
            .unwrap();
        assert_eq!(tree.num_leaves(), 1);
    }
}
