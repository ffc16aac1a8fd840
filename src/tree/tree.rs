//! Decision tree implementation.
//!
//! Nodes are stored in a contiguous vector with the root at index 0. A tree
//! is grown by repeatedly splitting leaves and is immutable once it has been
//! added to an ensemble.

use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::{DataSize, FeatureIndex, FeatureValue, NodeIndex, Score};
use crate::tree::node::TreeNode;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics of one child produced by a split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    /// Sum of gradients
    pub sum_gradients: f64,
    /// Sum of hessians
    pub sum_hessians: f64,
    /// Number of samples
    pub data_count: DataSize,
}

/// Decision tree structure representing a single tree in the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Vector of tree nodes (index 0 is always the root)
    nodes: Vec<TreeNode>,
    /// Maximum number of leaves allowed in the tree
    max_leaves: usize,
    /// Current number of leaf nodes
    num_leaves: usize,
    /// Maximum depth of any node
    max_depth: usize,
}

impl Tree {
    /// Creates a new tree with a single root leaf.
    pub fn new(max_leaves: usize) -> Self {
        Self::with_root(max_leaves, 0.0, 0.0, 0)
    }

    /// Creates a tree whose root carries the given statistics.
    pub fn with_root(
        max_leaves: usize,
        sum_gradients: f64,
        sum_hessians: f64,
        data_count: DataSize,
    ) -> Self {
        Tree {
            nodes: vec![TreeNode::new_leaf(sum_gradients, sum_hessians, data_count, 0, None)],
            max_leaves: max_leaves.max(1),
            num_leaves: 1,
            max_depth: 0,
        }
    }

    /// Returns the number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Returns the maximum number of leaves allowed.
    pub fn max_leaves(&self) -> usize {
        self.max_leaves
    }

    /// Returns the tree depth (maximum depth of any node).
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Returns a reference to the node at the given index.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Returns all nodes in storage order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Returns the root node of the tree.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Walks from the root to a leaf and returns the leaf index.
    pub fn predict_leaf_index(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<NodeIndex> {
        let mut node_index = 0;

        loop {
            let node = self.nodes.get(node_index).ok_or_else(|| {
                TrafficGbdtError::model_state(format!("node {} out of bounds", node_index))
            })?;

            let (feature, threshold) = match (node.split_feature(), node.split_threshold()) {
                (Some(feature), Some(threshold)) => (feature, threshold),
                _ => return Ok(node_index),
            };

            let value = features.get(feature).copied().ok_or_else(|| {
                TrafficGbdtError::length_mismatch("feature vector", feature + 1, features.len())
            })?;

            let next = if value <= threshold {
                node.left_child()
            } else {
                node.right_child()
            };
            node_index = next.ok_or_else(|| {
                TrafficGbdtError::model_state(format!("internal node {} missing child", node_index))
            })?;
        }
    }

    /// Predicts the raw output for a single feature vector.
    pub fn predict(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<Score> {
        let leaf = self.predict_leaf_index(features)?;
        Ok(self.nodes[leaf].leaf_output().unwrap_or(0.0))
    }

    /// Predicts the raw output for every row of `features`.
    pub fn predict_batch(&self, features: &ArrayView2<'_, FeatureValue>) -> Result<Array1<Score>> {
        let mut predictions = Array1::zeros(features.nrows());
        for (prediction, row) in predictions.iter_mut().zip(features.axis_iter(Axis(0))) {
            *prediction = self.predict(&row)?;
        }
        Ok(predictions)
    }

    /// Sets the leaf output for the node at the given index.
    pub fn set_leaf_output(&mut self, node_index: NodeIndex, output: Score) -> Result<()> {
        let node = self.nodes.get_mut(node_index).ok_or_else(|| {
            TrafficGbdtError::internal(format!("node index {} out of bounds", node_index))
        })?;
        if !node.is_leaf() {
            return Err(TrafficGbdtError::internal(format!(
                "cannot set output for internal node {}",
                node_index
            )));
        }
        node.set_leaf_output(output);
        Ok(())
    }

    /// Splits a leaf node into an internal node with two children.
    pub fn split_node(
        &mut self,
        node_index: NodeIndex,
        split_feature: FeatureIndex,
        split_threshold: FeatureValue,
        split_gain: f64,
        left: ChildStats,
        right: ChildStats,
    ) -> Result<(NodeIndex, NodeIndex)> {
        let node = self.nodes.get(node_index).ok_or_else(|| {
            TrafficGbdtError::internal(format!("node index {} out of bounds", node_index))
        })?;
        if !node.is_leaf() {
            return Err(TrafficGbdtError::internal(format!(
                "cannot split internal node {}",
                node_index
            )));
        }
        if self.num_leaves >= self.max_leaves {
            return Err(TrafficGbdtError::internal("maximum number of leaves reached"));
        }

        let child_depth = node.depth() + 1;
        self.max_depth = self.max_depth.max(child_depth);

        let left_index = self.nodes.len();
        let right_index = left_index + 1;

        self.nodes.push(TreeNode::new_leaf(
            left.sum_gradients,
            left.sum_hessians,
            left.data_count,
            child_depth,
            Some(node_index),
        ));
        self.nodes.push(TreeNode::new_leaf(
            right.sum_gradients,
            right.sum_hessians,
            right.data_count,
            child_depth,
            Some(node_index),
        ));

        self.nodes[node_index].set_split(
            left_index,
            right_index,
            split_feature,
            split_threshold,
            split_gain,
        );

        // Added 2 leaves, removed 1
        self.num_leaves += 1;

        Ok((left_index, right_index))
    }

    /// Returns all leaf node indices.
    pub fn leaf_indices(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| if node.is_leaf() { Some(i) } else { None })
            .collect()
    }

    /// Calculates feature importance based on split gains.
    pub fn feature_importance(&self, num_features: usize) -> Array1<f64> {
        let mut importance = Array1::zeros(num_features);

        for node in &self.nodes {
            if let Some(feature) = node.split_feature() {
                if feature < num_features {
                    importance[feature] += node.split_gain();
                }
            }
        }

        importance
    }

    /// Number of times each feature is used for a split.
    pub fn split_counts(&self, num_features: usize) -> Array1<usize> {
        let mut counts = Array1::zeros(num_features);
        for feature in self.nodes.iter().filter_map(TreeNode::split_feature) {
            if feature < num_features {
                counts[feature] += 1;
            }
        }
        counts
    }

    /// Returns a textual representation of the tree structure.
    pub fn to_string_representation(&self) -> String {
        let mut result = String::new();
        self.tree_to_string_recursive(0, "", true, &mut result);
        result
    }

    fn tree_to_string_recursive(
        &self,
        node_index: NodeIndex,
        prefix: &str,
        is_last: bool,
        result: &mut String,
    ) {
        let Some(node) = self.nodes.get(node_index) else {
            return;
        };

        let current_prefix = if is_last { "└── " } else { "├── " };
        result.push_str(&format!("{}{}{}\n", prefix, current_prefix, node));

        if !node.is_leaf() {
            let new_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

            if let Some(left_child) = node.left_child() {
                self.tree_to_string_recursive(left_child, &new_prefix, false, result);
            }
            if let Some(right_child) = node.right_child() {
                self.tree_to_string_recursive(right_child, &new_prefix, true, result);
            }
        }
    }

    /// Validates the tree structure against a feature dimension.
    pub fn validate(&self, num_features: usize) -> Result<()> {
        self.check_structure(Some(num_features))
    }

    fn check_structure(&self, num_features: Option<usize>) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(TrafficGbdtError::model_state("tree has no nodes"));
        }
        if self.nodes[0].parent().is_some() {
            return Err(TrafficGbdtError::model_state("root node has a parent"));
        }

        let mut leaf_count = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            match (node.split_feature(), node.left_child(), node.right_child()) {
                (None, None, None) => {
                    leaf_count += 1;
                    if let Some(output) = node.leaf_output() {
                        if !output.is_finite() {
                            return Err(TrafficGbdtError::model_state(format!(
                                "leaf {} has non-finite output",
                                i
                            )));
                        }
                    }
                }
                (Some(feature), Some(left), Some(right)) => {
                    if let Some(num_features) = num_features.filter(|&n| feature >= n) {
                        return Err(TrafficGbdtError::model_state(format!(
                            "node {} splits on feature {} but the model has {} features",
                            i, feature, num_features
                        )));
                    }
                    if !node.split_threshold().is_some_and(f64::is_finite) {
                        return Err(TrafficGbdtError::model_state(format!(
                            "node {} has an invalid threshold",
                            i
                        )));
                    }
                    // Children are always appended after their parent, which
                    // also rules out cycles
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(TrafficGbdtError::model_state(format!(
                                "node {} has invalid child index {}",
                                i, child
                            )));
                        }
                        if self.nodes[child].parent() != Some(i) {
                            return Err(TrafficGbdtError::model_state(format!(
                                "child {} parent mismatch",
                                child
                            )));
                        }
                    }
                }
                _ => {
                    return Err(TrafficGbdtError::model_state(format!(
                        "node {} is neither a leaf nor a complete split",
                        i
                    )));
                }
            }
        }

        if leaf_count != self.num_leaves {
            return Err(TrafficGbdtError::model_state(format!(
                "leaf count mismatch: expected {}, found {}",
                self.num_leaves, leaf_count
            )));
        }

        Ok(())
    }

    /// Converts the tree to a JSON representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Creates a tree from a JSON representation.
    ///
    /// The structure is validated; feature indices are checked only when the
    /// tree is validated against a model dimension.
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: Tree = serde_json::from_str(json)?;
        tree.check_structure(None)?;
        Ok(tree)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree(nodes={}, leaves={}, depth={})",
            self.num_nodes(),
            self.num_leaves(),
            self.depth()
        )
    }
}
