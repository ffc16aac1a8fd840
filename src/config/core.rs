//! Core configuration structure and builder.
//!
//! [`Config`] carries every option recognised by the harness: boosting
//! parameters for the trainer and the generator parameters used by the
//! driver. Values can come from code (via [`ConfigBuilder`]), from a JSON or
//! TOML file, and from `TRAFFIC_GBDT_*` environment variables.

use crate::core::constants::*;
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Main configuration structure for training and data generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Boosting parameters
    /// Number of boosting rounds
    pub num_trees: usize,
    /// Maximum number of leaves in one tree
    pub num_leaves: usize,
    /// Shrinkage applied to every tree's contribution
    pub learning_rate: f64,
    /// Minimum number of samples in a leaf
    pub min_leaf_samples: DataSize,
    /// Maximum depth of tree (-1 for unlimited)
    pub max_depth: i32,
    /// Tree growth strategy
    pub growth_strategy: GrowthStrategy,

    // Regularization parameters
    /// Damping added to hessian sums in gains and leaf outputs
    pub lambda_l2: f64,
    /// Minimum sum of hessian values in a leaf
    pub min_sum_hessian_in_leaf: f64,
    /// Minimum gain required to make a split
    pub min_gain_to_split: f64,
    /// Fail training when every label is identical instead of fitting a
    /// constant model
    pub reject_degenerate_labels: bool,

    // Execution
    /// Number of threads for split search (0 = rayon default)
    pub num_threads: usize,

    // Generator parameters
    /// Probability that a generated sample is an anomaly
    pub anomaly_probability: f64,
    /// Number of samples the driver generates
    pub sample_count: usize,
    /// Random seed for reproducible generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_trees: DEFAULT_NUM_TREES,
            num_leaves: DEFAULT_NUM_LEAVES,
            learning_rate: DEFAULT_LEARNING_RATE,
            min_leaf_samples: DEFAULT_MIN_LEAF_SAMPLES,
            max_depth: DEFAULT_MAX_DEPTH,
            growth_strategy: GrowthStrategy::LeafWise,

            lambda_l2: DEFAULT_LAMBDA_L2,
            min_sum_hessian_in_leaf: DEFAULT_MIN_SUM_HESSIAN_IN_LEAF,
            min_gain_to_split: DEFAULT_MIN_GAIN_TO_SPLIT,
            reject_degenerate_labels: false,

            num_threads: DEFAULT_NUM_THREADS,

            anomaly_probability: DEFAULT_ANOMALY_PROBABILITY,
            sample_count: DEFAULT_SAMPLE_COUNT,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(TrafficGbdtError::invalid_parameter(
                "num_trees",
                self.num_trees.to_string(),
                "must be positive",
            ));
        }

        if self.num_leaves == 0 {
            return Err(TrafficGbdtError::invalid_parameter(
                "num_leaves",
                self.num_leaves.to_string(),
                "must be positive",
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrafficGbdtError::invalid_parameter(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be a positive finite number",
            ));
        }
        if self.learning_rate > 1.0 {
            log::warn!(
                "learning_rate ({}) is above 1.0; training loss may not decrease monotonically",
                self.learning_rate
            );
        }

        if self.min_leaf_samples < 1 {
            return Err(TrafficGbdtError::invalid_parameter(
                "min_leaf_samples",
                self.min_leaf_samples.to_string(),
                "must be at least 1",
            ));
        }

        if self.max_depth < -1 {
            return Err(TrafficGbdtError::invalid_parameter(
                "max_depth",
                self.max_depth.to_string(),
                "must be -1 (unlimited) or non-negative",
            ));
        }

        if !(self.lambda_l2 >= 0.0) || !self.lambda_l2.is_finite() {
            return Err(TrafficGbdtError::invalid_parameter(
                "lambda_l2",
                self.lambda_l2.to_string(),
                "must be non-negative",
            ));
        }

        if !(self.min_sum_hessian_in_leaf >= 0.0) {
            return Err(TrafficGbdtError::invalid_parameter(
                "min_sum_hessian_in_leaf",
                self.min_sum_hessian_in_leaf.to_string(),
                "must be non-negative",
            ));
        }

        if !(self.min_gain_to_split >= 0.0) {
            return Err(TrafficGbdtError::invalid_parameter(
                "min_gain_to_split",
                self.min_gain_to_split.to_string(),
                "must be non-negative",
            ));
        }

        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(TrafficGbdtError::invalid_parameter(
                "anomaly_probability",
                self.anomaly_probability.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }

        if self.sample_count == 0 {
            return Err(TrafficGbdtError::invalid_parameter(
                "sample_count",
                "0",
                "must be positive",
            ));
        }

        if self.num_threads > num_cpus::get() * 2 {
            log::warn!(
                "num_threads ({}) is much larger than available cores ({})",
                self.num_threads,
                num_cpus::get()
            );
        }

        Ok(())
    }

    /// Maximum depth as a bound, `None` when unlimited.
    pub fn depth_limit(&self) -> Option<usize> {
        if self.max_depth < 0 {
            None
        } else {
            Some(self.max_depth as usize)
        }
    }

    /// Number of threads split search will use.
    pub fn effective_num_threads(&self) -> usize {
        if self.num_threads == 0 {
            rayon::current_num_threads()
        } else {
            self.num_threads
        }
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrafficGbdtError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .map_err(|e| TrafficGbdtError::config(format!("Failed to parse JSON config: {}", e)))?
        } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| TrafficGbdtError::config(format!("Failed to parse TOML config: {}", e)))?
        } else {
            return Err(TrafficGbdtError::config(
                "Unsupported config file format. Use .json or .toml",
            ));
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| TrafficGbdtError::config(format!("Failed to serialize to JSON: {}", e)))?
        } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| TrafficGbdtError::config(format!("Failed to serialize to TOML: {}", e)))?
        } else {
            return Err(TrafficGbdtError::config(
                "Unsupported config file format. Use .json or .toml",
            ));
        };

        std::fs::write(path, content)
            .map_err(|e| TrafficGbdtError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load configuration from defaults overlaid with environment variables
    pub fn load_from_environment() -> Result<Self> {
        let mut config = Config::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Apply `TRAFFIC_GBDT_*` environment variable overrides
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary `NAME -> value` lookup.
    ///
    /// Names are the environment variable names, e.g. `TRAFFIC_GBDT_NUM_TREES`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, "NUM_TREES")? {
            self.num_trees = v;
        }
        if let Some(v) = parse_override(&lookup, "NUM_LEAVES")? {
            self.num_leaves = v;
        }
        if let Some(v) = parse_override(&lookup, "LEARNING_RATE")? {
            self.learning_rate = v;
        }
        if let Some(v) = parse_override(&lookup, "MIN_LEAF_SAMPLES")? {
            self.min_leaf_samples = v;
        }
        if let Some(v) = parse_override(&lookup, "MAX_DEPTH")? {
            self.max_depth = v;
        }
        if let Some(v) = parse_override(&lookup, "GROWTH_STRATEGY")? {
            self.growth_strategy = v;
        }
        if let Some(v) = parse_override(&lookup, "ANOMALY_PROBABILITY")? {
            self.anomaly_probability = v;
        }
        if let Some(v) = parse_override(&lookup, "SAMPLE_COUNT")? {
            self.sample_count = v;
        }
        if let Some(v) = parse_override(&lookup, "SEED")? {
            self.seed = Some(v);
        }
        if let Some(v) = parse_override(&lookup, "NUM_THREADS")? {
            self.num_threads = v;
        }

        self.validate()
    }

    /// Get configuration as a flat parameter map (for logging)
    pub fn as_parameter_map(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("num_trees".to_string(), self.num_trees.to_string());
        params.insert("num_leaves".to_string(), self.num_leaves.to_string());
        params.insert("learning_rate".to_string(), self.learning_rate.to_string());
        params.insert("min_leaf_samples".to_string(), self.min_leaf_samples.to_string());
        params.insert("max_depth".to_string(), self.max_depth.to_string());
        params.insert("growth_strategy".to_string(), self.growth_strategy.to_string());
        params.insert("lambda_l2".to_string(), self.lambda_l2.to_string());
        params.insert(
            "min_sum_hessian_in_leaf".to_string(),
            self.min_sum_hessian_in_leaf.to_string(),
        );
        params.insert("min_gain_to_split".to_string(), self.min_gain_to_split.to_string());
        params.insert("num_threads".to_string(), self.num_threads.to_string());
        params.insert(
            "anomaly_probability".to_string(),
            self.anomaly_probability.to_string(),
        );
        params.insert("sample_count".to_string(), self.sample_count.to_string());
        if let Some(seed) = self.seed {
            params.insert("seed".to_string(), seed.to_string());
        }
        params
    }
}

fn parse_override<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let key = format!("{}{}", ENV_PREFIX, name);
    match lookup(&key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| TrafficGbdtError::config(format!("Invalid {}: {:?}", key, raw))),
    }
}

/// Configuration builder for fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    config: Config,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the number of boosting rounds
    pub fn num_trees(mut self, trees: usize) -> Self {
        if trees == 0 {
            self.validation_errors
                .push("num_trees must be positive".to_string());
        }
        self.config.num_trees = trees;
        self
    }

    /// Set the number of leaves
    pub fn num_leaves(mut self, leaves: usize) -> Self {
        if leaves == 0 {
            self.validation_errors
                .push("num_leaves must be positive".to_string());
        }
        self.config.num_leaves = leaves;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        if !(rate > 0.0) {
            self.validation_errors
                .push("learning_rate must be positive".to_string());
        }
        self.config.learning_rate = rate;
        self
    }

    /// Set the minimum number of samples per leaf
    pub fn min_leaf_samples(mut self, samples: DataSize) -> Self {
        if samples < 1 {
            self.validation_errors
                .push("min_leaf_samples must be at least 1".to_string());
        }
        self.config.min_leaf_samples = samples;
        self
    }

    /// Set the maximum tree depth (-1 for unlimited)
    pub fn max_depth(mut self, depth: i32) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the tree growth strategy
    pub fn growth_strategy(mut self, strategy: GrowthStrategy) -> Self {
        self.config.growth_strategy = strategy;
        self
    }

    /// Set L2 hessian damping
    pub fn lambda_l2(mut self, lambda: f64) -> Self {
        if lambda < 0.0 {
            self.validation_errors
                .push("lambda_l2 must be non-negative".to_string());
        }
        self.config.lambda_l2 = lambda;
        self
    }

    /// Set minimum sum of hessians in leaf
    pub fn min_sum_hessian_in_leaf(mut self, min_sum: f64) -> Self {
        self.config.min_sum_hessian_in_leaf = min_sum;
        self
    }

    /// Set minimum gain to split
    pub fn min_gain_to_split(mut self, min_gain: f64) -> Self {
        self.config.min_gain_to_split = min_gain;
        self
    }

    /// Reject single-class training data instead of fitting a constant model
    pub fn reject_degenerate_labels(mut self, reject: bool) -> Self {
        self.config.reject_degenerate_labels = reject;
        self
    }

    /// Set number of threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set the generator's anomaly probability
    pub fn anomaly_probability(mut self, probability: f64) -> Self {
        if !(0.0..=1.0).contains(&probability) {
            self.validation_errors
                .push("anomaly_probability must be in range [0.0, 1.0]".to_string());
        }
        self.config.anomaly_probability = probability;
        self
    }

    /// Set the number of generated samples
    pub fn sample_count(mut self, count: usize) -> Self {
        self.config.sample_count = count;
        self
    }

    /// Set random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        if !self.validation_errors.is_empty() {
            return Err(TrafficGbdtError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
