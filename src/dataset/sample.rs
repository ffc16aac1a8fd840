//! Per-flow traffic observation.

use crate::core::constants::{FEATURE_NAMES, NUM_FEATURES};
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::TrafficClass;
use serde::{Deserialize, Serialize};

/// One observation of a network flow.
///
/// `label` is `Some(true)` for normal traffic, `Some(false)` for an anomaly,
/// and `None` for inference-only samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficSample {
    /// Number of packets in the flow
    pub packet_count: u32,
    /// Average packet size in bytes
    pub avg_packet_size: u32,
    /// Flow duration in milliseconds
    pub packet_duration: u32,
    /// Mean gap between packets in milliseconds
    pub interval_between_packets: u32,
    /// Packets per second
    pub packet_frequency: u32,
    /// Total bytes sent
    pub total_data_sent: u32,
    /// Ratio of bytes sent by source to bytes sent by destination
    pub source_destination_ratio: f64,
    /// True for normal traffic, false for an anomaly
    #[serde(default)]
    pub label: Option<bool>,
}

impl TrafficSample {
    /// Return a copy of this sample carrying the given label.
    pub fn with_label(mut self, label: bool) -> Self {
        self.label = Some(label);
        self
    }

    /// Class of the sample, if labelled.
    pub fn class(&self) -> Option<TrafficClass> {
        self.label.map(TrafficClass::from_label)
    }

    /// True when the sample is labelled as an anomaly.
    pub fn is_anomaly(&self) -> bool {
        self.label == Some(false)
    }

    /// Check that every numeric field is usable as a feature.
    ///
    /// Integer fields are non-negative by construction; the ratio must be
    /// finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.source_destination_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(TrafficGbdtError::data(format!(
                "{} must be finite and non-negative, got {}",
                FEATURE_NAMES[NUM_FEATURES - 1],
                ratio
            )));
        }
        Ok(())
    }

    /// Raw feature values in feature-vector order.
    pub fn feature_values(&self) -> [f64; NUM_FEATURES] {
        [
            self.packet_count as f64,
            self.avg_packet_size as f64,
            self.packet_duration as f64,
            self.interval_between_packets as f64,
            self.packet_frequency as f64,
            self.total_data_sent as f64,
            self.source_destination_ratio,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrafficSample {
        TrafficSample {
            packet_count: 150,
            avg_packet_size: 500,
            packet_duration: 100,
            interval_between_packets: 50,
            packet_frequency: 4,
            total_data_sent: 3000,
            source_destination_ratio: 1.0,
            label: None,
        }
    }

    #[test]
    fn test_feature_order() {
        let values = sample().feature_values();
        assert_eq!(values, [150.0, 500.0, 100.0, 50.0, 4.0, 3000.0, 1.0]);
    }

    #[test]
    fn test_labels() {
        let unlabelled = sample();
        assert_eq!(unlabelled.class(), None);
        assert!(!unlabelled.is_anomaly());

        let anomaly = sample().with_label(false);
        assert_eq!(anomaly.class(), Some(TrafficClass::Anomaly));
        assert!(anomaly.is_anomaly());
    }

    #[test]
    fn test_validate_ratio() {
        assert!(sample().validate().is_ok());

        let mut bad = sample();
        bad.source_destination_ratio = f64::NAN;
        assert!(bad.validate().unwrap_err().is_data_error());

        bad.source_destination_ratio = -1.0;
        assert!(bad.validate().is_err());

        bad.source_destination_ratio = f64::INFINITY;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_default_is_zeroed_and_unlabelled() {
        let sample = TrafficSample {
            packet_count: 400,
            avg_packet_size: 1500,
            ..Default::default()
        };
        assert_eq!(sample.packet_duration, 0);
        assert_eq!(sample.label, None);
        assert!(sample.validate().is_ok());
    }
}
