//! Traffic sample management.
//!
//! This module covers everything that happens before training: the
//! [`TrafficSample`] record, synthetic generation of labelled samples,
//! CSV input and output, and assembly of normalized feature vectors.

pub mod features;
pub mod generator;
pub mod loader;
pub mod sample;

pub use features::{FeatureAssembler, FeatureRange, FeatureVector, NormalizationModel};
pub use generator::{generate, ClassProfile, FieldRange, GeneratorConfig, SampleGenerator};
pub use loader::{load_samples_csv, read_samples_csv, save_samples_csv, write_samples_csv};
pub use sample::TrafficSample;

/// Count labelled samples per class as `(normal, anomalous)`.
pub fn class_counts(samples: &[TrafficSample]) -> (usize, usize) {
    samples.iter().fold((0, 0), |(normal, anomalous), sample| match sample.label {
        Some(true) => (normal + 1, anomalous),
        Some(false) => (normal, anomalous + 1),
        None => (normal, anomalous),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_counts() {
        let samples = vec![
            TrafficSample::default().with_label(true),
            TrafficSample::default().with_label(false),
            TrafficSample::default().with_label(true),
            TrafficSample::default(),
        ];
        assert_eq!(class_counts(&samples), (2, 1));
    }
}
