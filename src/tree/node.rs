//! Tree node implementation.
//!
//! A node is either internal (feature index, threshold, two children) or a
//! leaf holding the Newton output for the samples that reached it.

use crate::core::types::{DataSize, FeatureIndex, FeatureValue, NodeIndex, Score};
use crate::tree::split::leaf_output;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tree node representation supporting both internal and leaf nodes.
///
/// Internal nodes send a sample left when `feature <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Left child node index (for internal nodes only)
    left_child: Option<NodeIndex>,
    /// Right child node index (for internal nodes only)
    right_child: Option<NodeIndex>,
    /// Parent node index (None for root node)
    parent: Option<NodeIndex>,
    /// Split feature index (for internal nodes only)
    split_feature: Option<FeatureIndex>,
    /// Split threshold value (for internal nodes only)
    split_threshold: Option<FeatureValue>,
    /// Prediction value (for leaf nodes only)
    leaf_output: Option<Score>,
    /// Sum of gradients in this node
    sum_gradients: f64,
    /// Sum of hessians in this node
    sum_hessians: f64,
    /// Number of samples in this node
    data_count: DataSize,
    /// Split gain (improvement in the quadratic loss approximation)
    split_gain: f64,
    /// Node depth in the tree
    depth: usize,
}

impl TreeNode {
    /// Creates a new leaf node with the given statistics.
    pub fn new_leaf(
        sum_gradients: f64,
        sum_hessians: f64,
        data_count: DataSize,
        depth: usize,
        parent: Option<NodeIndex>,
    ) -> Self {
        TreeNode {
            left_child: None,
            right_child: None,
            parent,
            split_feature: None,
            split_threshold: None,
            leaf_output: None,
            sum_gradients,
            sum_hessians,
            data_count,
            split_gain: 0.0,
            depth,
        }
    }

    /// Returns true if this node is a leaf node.
    pub fn is_leaf(&self) -> bool {
        self.split_feature.is_none()
    }

    /// Returns the left child node index (for internal nodes).
    pub fn left_child(&self) -> Option<NodeIndex> {
        self.left_child
    }

    /// Returns the right child node index (for internal nodes).
    pub fn right_child(&self) -> Option<NodeIndex> {
        self.right_child
    }

    /// Returns the parent node index.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns the split feature index (for internal nodes).
    pub fn split_feature(&self) -> Option<FeatureIndex> {
        self.split_feature
    }

    /// Returns the split threshold value (for internal nodes).
    pub fn split_threshold(&self) -> Option<FeatureValue> {
        self.split_threshold
    }

    /// Returns the leaf output value (for leaf nodes).
    pub fn leaf_output(&self) -> Option<Score> {
        self.leaf_output
    }

    /// Sets the leaf output value.
    pub fn set_leaf_output(&mut self, output: Score) {
        self.leaf_output = Some(output);
    }

    /// Returns the sum of gradients in this node.
    pub fn sum_gradients(&self) -> f64 {
        self.sum_gradients
    }

    /// Returns the sum of hessians in this node.
    pub fn sum_hessians(&self) -> f64 {
        self.sum_hessians
    }

    /// Returns the number of samples in this node.
    pub fn data_count(&self) -> DataSize {
        self.data_count
    }

    /// Returns the split gain value.
    pub fn split_gain(&self) -> f64 {
        self.split_gain
    }

    /// Returns the node depth in the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Converts this node from leaf to internal node with the given split.
    pub fn set_split(
        &mut self,
        left_child: NodeIndex,
        right_child: NodeIndex,
        split_feature: FeatureIndex,
        split_threshold: FeatureValue,
        split_gain: f64,
    ) {
        self.left_child = Some(left_child);
        self.right_child = Some(right_child);
        self.split_feature = Some(split_feature);
        self.split_threshold = Some(split_threshold);
        self.split_gain = split_gain;
        self.leaf_output = None;
    }

    /// Newton output `-G / (H + lambda_l2)` for this node's statistics.
    pub fn calculate_leaf_output(&self, lambda_l2: f64) -> Score {
        leaf_output(self.sum_gradients, self.sum_hessians, lambda_l2)
    }

    /// Returns true if this node holds enough samples and hessian mass to
    /// produce two children that each satisfy the per-leaf minimums.
    pub fn can_split(&self, min_leaf_samples: DataSize, min_sum_hessian_in_leaf: f64) -> bool {
        self.is_leaf()
            && self.data_count >= min_leaf_samples * 2
            && self.sum_hessians >= min_sum_hessian_in_leaf * 2.0
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.split_feature, self.split_threshold) {
            (Some(feature), Some(threshold)) => write!(
                f,
                "Internal(feature={}, threshold={:.4}, gain={:.4}, data_count={})",
                feature, threshold, self.split_gain, self.data_count
            ),
            _ => write!(
                f,
                "Leaf(output={:.4}, data_count={}, sum_gradients={:.4}, sum_hessians={:.4})",
                self.leaf_output.unwrap_or(0.0),
                self.data_count,
                self.sum_gradients,
                self.sum_hessians
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_leaf_node() {
        let node = TreeNode::new_leaf(10.0, 5.0, 100, 2, Some(0));

        assert!(node.is_leaf());
        assert_eq!(node.sum_gradients(), 10.0);
        assert_eq!(node.sum_hessians(), 5.0);
        assert_eq!(node.data_count(), 100);
        assert_eq!(node.depth(), 2);
        assert_eq!(node.parent(), Some(0));
        assert!(node.left_child().is_none());
        assert!(node.right_child().is_none());
    }

    #[test]
    fn test_calculate_leaf_output() {
        let node = TreeNode::new_leaf(-10.0, 5.0, 100, 0, None);
        let output = node.calculate_leaf_output(0.0);
        assert!((output - 2.0).abs() < 1e-12);

        let damped = node.calculate_leaf_output(5.0);
        assert!((damped - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_leaf_output_without_hessian_mass() {
        let node = TreeNode::new_leaf(3.0, 0.0, 10, 0, None);
        assert_eq!(node.calculate_leaf_output(0.0), 0.0);
    }

    #[test]
    fn test_set_split() {
        let mut node = TreeNode::new_leaf(10.0, 5.0, 100, 1, Some(0));
        node.set_leaf_output(0.3);

        node.set_split(1, 2, 3, 2.5, 1.2);

        assert!(!node.is_leaf());
        assert_eq!(node.left_child(), Some(1));
        assert_eq!(node.right_child(), Some(2));
        assert_eq!(node.split_feature(), Some(3));
        assert_eq!(node.split_threshold(), Some(2.5));
        assert_eq!(node.split_gain(), 1.2);
        assert!(node.leaf_output().is_none());
    }

    #[test]
    fn test_can_split() {
        let node = TreeNode::new_leaf(10.0, 5.0, 100, 1, None);
        assert!(node.can_split(20, 1.0));
        assert!(node.can_split(50, 1.0));
        assert!(!node.can_split(51, 1.0));
        assert!(!node.can_split(20, 3.0));
    }

    #[test]
    fn test_display() {
        let mut node = TreeNode::new_leaf(1.0, 2.0, 4, 0, None);
        assert!(node.to_string().starts_with("Leaf("));
        node.set_split(1, 2, 0, 0.5, 0.1);
        assert!(node.to_string().starts_with("Internal(feature=0"));
    }
}
