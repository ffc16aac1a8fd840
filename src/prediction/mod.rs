//! Scoring of individual traffic samples with a fitted pipeline.

pub mod predictor;

pub use predictor::{Prediction, PredictionConfig, Predictor};
