//! Feature assembly and min-max normalization.
//!
//! Raw samples are turned into fixed-order 7-dimensional vectors and each
//! feature is rescaled with per-feature minimum and maximum values learned on
//! the training set. Values outside the fitted range are not clipped, so the
//! transform may leave `[0, 1]` on unseen data.

use crate::core::constants::{FEATURE_NAMES, NUM_FEATURES};
use crate::core::error::{Result, TrafficGbdtError};
use crate::core::types::{FeatureIndex, FeatureValue};
use crate::dataset::sample::TrafficSample;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Normalized feature vector of length [`NUM_FEATURES`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<FeatureValue>);

impl FeatureVector {
    /// Wrap raw values.
    pub fn new(values: Array1<FeatureValue>) -> Self {
        FeatureVector(values)
    }

    /// Borrow the values.
    pub fn view(&self) -> ArrayView1<'_, FeatureValue> {
        self.0.view()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length vector.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of feature `index`, if present.
    pub fn get(&self, index: FeatureIndex) -> Option<FeatureValue> {
        self.0.get(index).copied()
    }
}

/// Observed range of one feature on the fitting set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
}

impl FeatureRange {
    /// True when every fitting sample had the same value.
    pub fn is_constant(&self) -> bool {
        self.max == self.min
    }

    /// Rescale `value` into the fitted range. Constant features map to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_constant() {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}

/// Per-feature scaling parameters learned on the training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationModel {
    ranges: Vec<FeatureRange>,
}

impl NormalizationModel {
    /// Build from explicit ranges, one per feature.
    pub fn from_ranges(ranges: Vec<FeatureRange>) -> Result<Self> {
        let model = NormalizationModel { ranges };
        model.validate()?;
        Ok(model)
    }

    /// Number of features the model scales.
    pub fn num_features(&self) -> usize {
        self.ranges.len()
    }

    /// Fitted range of feature `index`.
    pub fn range(&self, index: FeatureIndex) -> Option<&FeatureRange> {
        self.ranges.get(index)
    }

    /// All fitted ranges.
    pub fn ranges(&self) -> &[FeatureRange] {
        &self.ranges
    }

    /// Check structural usability.
    pub fn validate(&self) -> Result<()> {
        if self.ranges.len() != NUM_FEATURES {
            return Err(TrafficGbdtError::model_state(format!(
                "normalization model covers {} features, expected {}",
                self.ranges.len(),
                NUM_FEATURES
            )));
        }
        for (index, range) in self.ranges.iter().enumerate() {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(TrafficGbdtError::model_state(format!(
                    "invalid range [{}, {}] for feature {}",
                    range.min, range.max, FEATURE_NAMES[index]
                )));
            }
        }
        Ok(())
    }

    /// Normalize one raw vector.
    pub fn normalize(&self, raw: &[f64]) -> Result<FeatureVector> {
        if raw.len() != self.ranges.len() {
            return Err(TrafficGbdtError::length_mismatch(
                "feature vector",
                self.ranges.len(),
                raw.len(),
            ));
        }
        let values = raw
            .iter()
            .zip(&self.ranges)
            .map(|(&value, range)| range.normalize(value))
            .collect::<Array1<f64>>();
        Ok(FeatureVector(values))
    }
}

/// Builds feature vectors from samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Create an assembler.
    pub fn new() -> Self {
        FeatureAssembler
    }

    /// Feature names in vector order.
    pub fn feature_names(&self) -> &'static [&'static str; NUM_FEATURES] {
        &FEATURE_NAMES
    }

    /// Raw (unnormalized) values of one sample after validation.
    pub fn assemble(&self, sample: &TrafficSample) -> Result<[f64; NUM_FEATURES]> {
        sample.validate()?;
        Ok(sample.feature_values())
    }

    /// Raw feature matrix, one row per sample.
    pub fn raw_matrix(&self, samples: &[TrafficSample]) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((samples.len(), NUM_FEATURES));
        for (mut row, sample) in matrix.outer_iter_mut().zip(samples) {
            let values = self.assemble(sample)?;
            row.assign(&ArrayView1::from(&values[..]));
        }
        Ok(matrix)
    }

    /// Learn per-feature minimum and maximum values.
    pub fn fit(&self, samples: &[TrafficSample]) -> Result<NormalizationModel> {
        if samples.is_empty() {
            return Err(TrafficGbdtError::data(
                "cannot fit normalization on an empty sample set",
            ));
        }

        let mut ranges = vec![
            FeatureRange {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            };
            NUM_FEATURES
        ];
        for sample in samples {
            let values = self.assemble(sample)?;
            for (range, value) in ranges.iter_mut().zip(values) {
                range.min = range.min.min(value);
                range.max = range.max.max(value);
            }
        }

        for (name, range) in FEATURE_NAMES.iter().zip(&ranges) {
            if range.is_constant() {
                log::warn!("Feature {} is constant ({}); it will normalize to 0", name, range.min);
            }
        }
        log::debug!("Fitted normalization on {} samples", samples.len());

        NormalizationModel::from_ranges(ranges)
    }

    /// Normalize one sample.
    pub fn transform_one(
        &self,
        sample: &TrafficSample,
        model: &NormalizationModel,
    ) -> Result<FeatureVector> {
        model.normalize(&self.assemble(sample)?)
    }

    /// Normalize every sample.
    pub fn transform(
        &self,
        samples: &[TrafficSample],
        model: &NormalizationModel,
    ) -> Result<Vec<FeatureVector>> {
        model.validate()?;
        samples
            .iter()
            .map(|sample| self.transform_one(sample, model))
            .collect()
    }

    /// Normalize every sample into a row-major matrix.
    pub fn transform_matrix(
        &self,
        samples: &[TrafficSample],
        model: &NormalizationModel,
    ) -> Result<Array2<f64>> {
        model.validate()?;
        let mut matrix = self.raw_matrix(samples)?;
        for mut row in matrix.outer_iter_mut() {
            for (value, range) in row.iter_mut().zip(model.ranges()) {
                *value = range.normalize(*value);
            }
        }
        Ok(matrix)
    }

    /// Fit on `samples` and normalize them in one pass.
    pub fn fit_transform(
        &self,
        samples: &[TrafficSample],
    ) -> Result<(NormalizationModel, Array2<f64>)> {
        let model = self.fit(samples)?;
        let matrix = self.transform_matrix(samples, &model)?;
        Ok((model, matrix))
    }

    /// Labels of every sample. Unlabelled samples are a data error.
    pub fn labels(&self, samples: &[TrafficSample]) -> Result<Vec<bool>> {
        samples
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                sample.label.ok_or_else(|| {
                    TrafficGbdtError::data(format!("sample {} has no label", index))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample(packet_count: u32, ratio: f64) -> TrafficSample {
        TrafficSample {
            packet_count,
            avg_packet_size: 500,
            packet_duration: packet_count / 2,
            interval_between_packets: 60,
            packet_frequency: 4,
            total_data_sent: packet_count * 10,
            source_destination_ratio: ratio,
            label: Some(true),
        }
    }

    #[test]
    fn test_fit_records_extremes() {
        let samples = vec![sample(100, 1.0), sample(300, 3.0), sample(200, 2.0)];
        let model = FeatureAssembler::new().fit(&samples).unwrap();

        assert_eq!(model.num_features(), NUM_FEATURES);
        let packet_count = model.range(0).unwrap();
        assert_eq!(packet_count.min, 100.0);
        assert_eq!(packet_count.max, 300.0);
        assert!(model.range(1).unwrap().is_constant());
    }

    #[test]
    fn test_training_set_lands_in_unit_interval() {
        let samples = vec![sample(100, 1.0), sample(300, 3.0), sample(200, 2.5)];
        let assembler = FeatureAssembler::new();
        let (_, matrix) = assembler.fit_transform(&samples).unwrap();

        assert!(matrix.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_abs_diff_eq!(matrix[[0, 0]], 0.0);
        assert_abs_diff_eq!(matrix[[1, 0]], 1.0);
        assert_abs_diff_eq!(matrix[[2, 0]], 0.5);
        assert_abs_diff_eq!(matrix[[2, 6]], 0.75);
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let samples = vec![sample(100, 1.0), sample(300, 1.0)];
        let assembler = FeatureAssembler::new();
        let model = assembler.fit(&samples).unwrap();

        let mut unseen = sample(200, 9.0);
        unseen.avg_packet_size = 10_000;
        let vector = assembler.transform_one(&unseen, &model).unwrap();
        assert_eq!(vector.get(1), Some(0.0));
        assert_eq!(vector.get(6), Some(0.0));
    }

    #[test]
    fn test_no_clipping_outside_fitted_range() {
        let samples = vec![sample(100, 1.0), sample(200, 2.0)];
        let assembler = FeatureAssembler::new();
        let model = assembler.fit(&samples).unwrap();

        let vector = assembler.transform_one(&sample(400, 0.0), &model).unwrap();
        assert_abs_diff_eq!(vector.get(0).unwrap(), 3.0);
        assert_abs_diff_eq!(vector.get(6).unwrap(), -1.0);
    }

    #[test]
    fn test_vector_and_matrix_paths_agree() {
        let samples = vec![sample(120, 1.0), sample(280, 1.5), sample(190, 1.2)];
        let assembler = FeatureAssembler::new();
        let (model, matrix) = assembler.fit_transform(&samples).unwrap();
        let vectors = assembler.transform(&samples, &model).unwrap();

        for (row, vector) in matrix.outer_iter().zip(&vectors) {
            assert_eq!(row, vector.view());
        }
    }

    #[test]
    fn test_fit_rejects_empty_and_invalid_input() {
        let assembler = FeatureAssembler::new();
        assert!(assembler.fit(&[]).unwrap_err().is_data_error());

        let bad = vec![sample(100, f64::NAN)];
        assert!(assembler.fit(&bad).unwrap_err().is_data_error());
    }

    #[test]
    fn test_labels_require_every_sample_labelled() {
        let assembler = FeatureAssembler::new();
        let mut samples = vec![sample(100, 1.0), sample(200, 1.0).with_label(false)];
        assert_eq!(assembler.labels(&samples).unwrap(), vec![true, false]);

        samples.push(TrafficSample::default());
        assert!(assembler.labels(&samples).unwrap_err().is_data_error());
    }

    #[test]
    fn test_model_validation() {
        assert!(NormalizationModel::from_ranges(vec![]).unwrap_err().is_model_state_error());

        let mut ranges = vec![FeatureRange { min: 0.0, max: 1.0 }; NUM_FEATURES];
        ranges[3] = FeatureRange { min: 2.0, max: 1.0 };
        assert!(NormalizationModel::from_ranges(ranges).is_err());
    }
}
