//! Core data types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample indexing and counting type.
pub type DataSize = usize;

/// Raw margins, gradients, hessians and leaf outputs.
pub type Score = f64;

/// Normalized feature value.
pub type FeatureValue = f64;

/// Feature index type for identifying features in a feature vector.
pub type FeatureIndex = usize;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Boosting round number.
pub type IterationIndex = usize;

/// Tree growth strategy used by the boosting loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStrategy {
    /// Always split the leaf with the largest gain until the leaf budget is spent
    LeafWise,
    /// Split level by level (breadth-first) until the leaf budget is spent
    DepthWise,
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        GrowthStrategy::LeafWise
    }
}

impl fmt::Display for GrowthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthStrategy::LeafWise => write!(f, "leaf_wise"),
            GrowthStrategy::DepthWise => write!(f, "depth_wise"),
        }
    }
}

impl std::str::FromStr for GrowthStrategy {
    type Err = crate::core::error::TrafficGbdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "leaf_wise" | "leafwise" | "best_first" => Ok(GrowthStrategy::LeafWise),
            "depth_wise" | "depthwise" | "level_wise" => Ok(GrowthStrategy::DepthWise),
            _ => Err(crate::core::error::TrafficGbdtError::invalid_parameter(
                "growth_strategy",
                s,
                "expected leaf_wise or depth_wise",
            )),
        }
    }
}

/// Traffic class of a sample. `Normal` is the positive class throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrafficClass {
    /// Regular traffic (label `true`)
    Normal,
    /// Anomalous traffic (label `false`)
    Anomaly,
}

impl TrafficClass {
    /// Map a boolean label (true = normal) to a class.
    pub fn from_label(label: bool) -> Self {
        if label {
            TrafficClass::Normal
        } else {
            TrafficClass::Anomaly
        }
    }

    /// Boolean label of this class (true = normal).
    pub fn label(self) -> bool {
        matches!(self, TrafficClass::Normal)
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficClass::Normal => write!(f, "Normal"),
            TrafficClass::Anomaly => write!(f, "Anomaly"),
        }
    }
}

/// Numeric target for a boolean label (1.0 = normal, 0.0 = anomaly).
#[inline]
pub fn label_to_target(label: bool) -> f64 {
    if label {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_strategy_parsing() {
        assert_eq!("leaf_wise".parse::<GrowthStrategy>().unwrap(), GrowthStrategy::LeafWise);
        assert_eq!("Depth-Wise".parse::<GrowthStrategy>().unwrap(), GrowthStrategy::DepthWise);
        assert!("random".parse::<GrowthStrategy>().is_err());
        assert_eq!(GrowthStrategy::default(), GrowthStrategy::LeafWise);
        assert_eq!(GrowthStrategy::DepthWise.to_string(), "depth_wise");
    }

    #[test]
    fn test_traffic_class_labels() {
        assert_eq!(TrafficClass::from_label(true), TrafficClass::Normal);
        assert_eq!(TrafficClass::from_label(false), TrafficClass::Anomaly);
        assert!(TrafficClass::Normal.label());
        assert!(!TrafficClass::Anomaly.label());
        assert_eq!(label_to_target(true), 1.0);
        assert_eq!(label_to_target(false), 0.0);
    }
}
