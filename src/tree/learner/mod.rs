//! Tree growth strategies.
//!
//! Both growers share the same node bookkeeping and split finder and differ
//! only in the order in which leaves are expanded:
//!
//! - [`LeafWiseGrower`]: always split the leaf with the highest gain
//! - [`DepthWiseGrower`]: expand leaves breadth-first
//!
//! Growth of either stops when the leaf budget is exhausted.

pub mod depth_wise;
pub mod leaf_wise;

pub use depth_wise::DepthWiseGrower;
pub use leaf_wise::LeafWiseGrower;

use crate::config::Config;
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::traits::TreeGrower;
use crate::core::types::{DataSize, FeatureValue, GrowthStrategy, NodeIndex, Score};
use crate::tree::split::{SplitFinder, SplitFinderConfig, SplitInfo};
use crate::tree::tree::{ChildStats, Tree};
use ndarray::{ArrayView1, ArrayView2};

/// Configuration shared by the tree growers.
#[derive(Debug, Clone)]
pub struct GrowerConfig {
    /// Maximum number of leaves in the tree
    pub max_leaves: usize,
    /// Maximum tree depth (None means unbounded)
    pub max_depth: Option<usize>,
    /// Split finding constraints
    pub split: SplitFinderConfig,
}

impl Default for GrowerConfig {
    fn default() -> Self {
        GrowerConfig::from(&Config::default())
    }
}

impl From<&Config> for GrowerConfig {
    fn from(config: &Config) -> Self {
        GrowerConfig {
            max_leaves: config.num_leaves,
            max_depth: config.depth_limit(),
            split: SplitFinderConfig::from(config),
        }
    }
}

/// Creates the grower selected by the configuration.
pub fn create_grower(config: &Config) -> Box<dyn TreeGrower> {
    let grower_config = GrowerConfig::from(config);
    match config.growth_strategy {
        GrowthStrategy::LeafWise => Box::new(LeafWiseGrower::new(grower_config)),
        GrowthStrategy::DepthWise => Box::new(DepthWiseGrower::new(grower_config)),
    }
}

/// Information about a tree node being processed.
#[derive(Debug, Clone)]
pub(crate) struct NodeInfo {
    /// Node index in the tree
    pub(crate) node_index: NodeIndex,
    /// Sample indices belonging to this node
    pub(crate) data_indices: Vec<usize>,
    /// Node depth
    pub(crate) depth: usize,
    /// Sum of gradients in this node
    pub(crate) sum_gradients: f64,
    /// Sum of hessians in this node
    pub(crate) sum_hessians: f64,
}

/// Check that gradients and hessians line up with the feature rows.
pub(crate) fn validate_inputs(
    features: &ArrayView2<'_, FeatureValue>,
    gradients: &ArrayView1<'_, Score>,
    hessians: &ArrayView1<'_, Score>,
) -> Result<()> {
    if features.nrows() == 0 {
        return Err(TrafficGbdtError::data("cannot grow a tree on zero samples"));
    }
    if gradients.len() != features.nrows() {
        return Err(TrafficGbdtError::length_mismatch(
            "gradients",
            features.nrows(),
            gradients.len(),
        ));
    }
    if hessians.len() != features.nrows() {
        return Err(TrafficGbdtError::length_mismatch(
            "hessians",
            features.nrows(),
            hessians.len(),
        ));
    }
    Ok(())
}

/// Create a tree whose root covers every sample.
pub(crate) fn init_root(
    max_leaves: usize,
    gradients: &ArrayView1<'_, Score>,
    hessians: &ArrayView1<'_, Score>,
) -> (Tree, NodeInfo) {
    let sum_gradients = gradients.sum();
    let sum_hessians = hessians.sum();
    let data_indices: Vec<usize> = (0..gradients.len()).collect();
    let tree = Tree::with_root(max_leaves, sum_gradients, sum_hessians, data_indices.len());
    let root = NodeInfo {
        node_index: 0,
        data_indices,
        depth: 0,
        sum_gradients,
        sum_hessians,
    };
    (tree, root)
}

/// Search for the best split of `node`, honouring depth and size limits.
pub(crate) fn find_node_split(
    config: &GrowerConfig,
    finder: &SplitFinder,
    features: &ArrayView2<'_, FeatureValue>,
    gradients: &ArrayView1<'_, Score>,
    hessians: &ArrayView1<'_, Score>,
    node: &NodeInfo,
) -> Option<SplitInfo> {
    if config.max_depth.is_some_and(|limit| node.depth >= limit) {
        return None;
    }
    if node.data_indices.len() < 2 * config.split.min_leaf_samples
        || node.sum_hessians < 2.0 * config.split.min_sum_hessian_in_leaf
    {
        return None;
    }
    finder.find_best_split(
        features,
        gradients,
        hessians,
        &node.data_indices,
        node.sum_gradients,
        node.sum_hessians,
    )
}

/// Applies a split to the tree and returns information about the child nodes.
pub(crate) fn apply_split(
    tree: &mut Tree,
    features: &ArrayView2<'_, FeatureValue>,
    parent: &NodeInfo,
    split: &SplitInfo,
) -> Result<(NodeInfo, NodeInfo)> {
    let (left_indices, right_indices) =
        partition_data(features, &parent.data_indices, split.feature, split.threshold);

    if left_indices.len() != split.left_count || right_indices.len() != split.right_count {
        return Err(TrafficGbdtError::internal(format!(
            "partition of node {} disagrees with split counts",
            parent.node_index
        )));
    }

    let left = ChildStats {
        sum_gradients: split.left_sum_gradient,
        sum_hessians: split.left_sum_hessian,
        data_count: left_indices.len() as DataSize,
    };
    let right = ChildStats {
        sum_gradients: split.right_sum_gradient,
        sum_hessians: split.right_sum_hessian,
        data_count: right_indices.len() as DataSize,
    };

    let (left_index, right_index) = tree.split_node(
        parent.node_index,
        split.feature,
        split.threshold,
        split.gain,
        left,
        right,
    )?;

    let left_info = NodeInfo {
        node_index: left_index,
        data_indices: left_indices,
        depth: parent.depth + 1,
        sum_gradients: left.sum_gradients,
        sum_hessians: left.sum_hessians,
    };
    let right_info = NodeInfo {
        node_index: right_index,
        data_indices: right_indices,
        depth: parent.depth + 1,
        sum_gradients: right.sum_gradients,
        sum_hessians: right.sum_hessians,
    };

    Ok((left_info, right_info))
}

/// Partitions sample indices on `feature <= threshold`.
pub(crate) fn partition_data(
    features: &ArrayView2<'_, FeatureValue>,
    data_indices: &[usize],
    feature: usize,
    threshold: FeatureValue,
) -> (Vec<usize>, Vec<usize>) {
    data_indices
        .iter()
        .copied()
        .partition(|&index| features[[index, feature]] <= threshold)
}

/// Sets the Newton output of every leaf.
pub(crate) fn finalize_tree_outputs(tree: &mut Tree, lambda_l2: f64) -> Result<()> {
    for leaf in tree.leaf_indices() {
        let output = match tree.node(leaf) {
            Some(node) => node.calculate_leaf_output(lambda_l2),
            None => continue,
        };
        tree.set_leaf_output(leaf, output)?;
    }
    Ok(())
}
