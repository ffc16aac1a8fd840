//! Regression tree module.
//!
//! This module provides the decision tree structure, exact split finding and
//! the growth strategies used by the boosting loop.

pub mod learner;
pub mod node;
pub mod split;
pub mod tree;

pub use learner::{create_grower, DepthWiseGrower, GrowerConfig, LeafWiseGrower};
pub use node::TreeNode;
pub use split::{SplitFinder, SplitFinderConfig, SplitInfo};
pub use tree::{ChildStats, Tree};
