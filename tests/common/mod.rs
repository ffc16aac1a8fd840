//! Common test utilities for traffic GBDT integration tests.
#![allow(dead_code)]

use ndarray::Array2;
use std::fs;
use std::path::Path;
use traffic_gbdt::*;

/// Header of the sample CSV format.
pub const CSV_HEADER: &str = "packet_count,avg_packet_size,packet_duration,interval_between_packets,packet_frequency,total_data_sent,source_destination_ratio,label";

/// The reference training scenario: 100 trees, 20 leaves, learning rate 0.1.
pub fn scenario_config() -> Config {
    ConfigBuilder::new()
        .num_trees(100)
        .num_leaves(20)
        .learning_rate(0.1)
        .build()
        .unwrap()
}

/// Small configuration for quick training runs.
pub fn create_test_config(num_trees: usize) -> Config {
    Config {
        num_trees,
        num_leaves: 6,
        min_leaf_samples: 2,
        ..Config::default()
    }
}

/// The reference sample set: 100 draws, 20% anomalies, seed 42.
pub fn scenario_samples() -> Vec<TrafficSample> {
    generate(100, 0.2, Some(42)).unwrap()
}

/// Feature matrix whose first column separates the classes by a wide margin.
///
/// The first `num_normal` rows are normal (label `true`).
pub fn create_separable_features(num_normal: usize, num_anomalous: usize) -> (Array2<f64>, Vec<bool>) {
    let n = num_normal + num_anomalous;
    let features = Array2::from_shape_fn((n, 3), |(i, j)| match j {
        0 if i < num_normal => 0.1 * (i % 3) as f64,
        0 => 0.9 + 0.01 * (i % 5) as f64,
        1 => ((i * 7) % 11) as f64 / 11.0,
        _ => ((i * 3) % 4) as f64 / 4.0,
    });
    let labels = (0..n).map(|i| i < num_normal).collect();
    (features, labels)
}

/// Write samples as CSV rows by hand, leaving the label empty when absent.
pub fn create_test_csv<P: AsRef<Path>>(path: P, samples: &[TrafficSample]) -> std::io::Result<()> {
    let mut content = String::from(CSV_HEADER);
    content.push('\n');
    for sample in samples {
        let label = sample.label.map(|l| l.to_string()).unwrap_or_default();
        content.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            sample.packet_count,
            sample.avg_packet_size,
            sample.packet_duration,
            sample.interval_between_packets,
            sample.packet_frequency,
            sample.total_data_sent,
            sample.source_destination_ratio,
            label
        ));
    }
    fs::write(path, content)
}

/// The two demonstration flows scored by the driver.
pub fn demo_flows() -> [TrafficSample; 2] {
    [
        TrafficSample {
            packet_count: 150,
            avg_packet_size: 500,
            ..TrafficSample::default()
        },
        TrafficSample {
            packet_count: 400,
            avg_packet_size: 1500,
            ..TrafficSample::default()
        },
    ]
}

/// Assert that every metric lies in `[0, 1]`.
pub fn assert_metrics_bounded(metrics: &EvaluationMetrics) {
    for (name, value) in [
        ("accuracy", metrics.accuracy),
        ("auc", metrics.auc),
        ("f1", metrics.f1),
        ("precision", metrics.precision),
        ("recall", metrics.recall),
    ] {
        assert!((0.0..=1.0).contains(&value), "{} = {} out of range", name, value);
    }
    assert!(metrics.log_loss >= 0.0);
}

/// Samples plus a configuration, fitted on demand.
pub struct TestDataFixture {
    pub samples: Vec<TrafficSample>,
    pub config: Config,
}

impl TestDataFixture {
    pub fn new(count: usize, seed: u64) -> Self {
        TestDataFixture {
            samples: generate(count, 0.3, Some(seed)).unwrap(),
            config: create_test_config(15),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn fit(&self) -> FittedPipeline {
        TrainingPipeline::fit(&self.samples, &self.config).unwrap()
    }
}
