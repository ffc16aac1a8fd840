//! On-disk formats for fitted pipelines.
//!
//! Both formats store the same [`PersistedModel`] envelope: format version,
//! feature names, creation time and the fitted pipeline itself.

pub mod bincode;
pub mod json;

use crate::core::constants::{FEATURE_NAMES, MODEL_FORMAT_VERSION, TRAFFIC_GBDT_VERSION};
use crate::core::error::{Result, TrafficGbdtError};
use crate::pipeline::FittedPipeline;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SerializationFormat {
    /// Native Rust bincode format (fast, compact)
    Bincode,
    /// JSON format (human-readable, portable)
    Json,
}

impl Default for SerializationFormat {
    fn default() -> Self {
        SerializationFormat::Json
    }
}

impl std::fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationFormat::Bincode => write!(f, "bincode"),
            SerializationFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for SerializationFormat {
    type Err = TrafficGbdtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bincode" | "bin" => Ok(SerializationFormat::Bincode),
            "json" => Ok(SerializationFormat::Json),
            _ => Err(TrafficGbdtError::serialization(format!("Unknown format: {}", s))),
        }
    }
}

impl SerializationFormat {
    /// Pick the format from a file extension (`.json`, `.bin`, `.bincode`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                TrafficGbdtError::serialization(format!(
                    "cannot infer model format of {}: no file extension",
                    path.display()
                ))
            })?;
        extension.parse()
    }

    /// Conventional file extension for the format.
    pub fn file_extension(self) -> &'static str {
        match self {
            SerializationFormat::Bincode => "bin",
            SerializationFormat::Json => "json",
        }
    }
}

/// Envelope written to disk around a fitted pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedModel {
    /// Layout version of this envelope
    pub format_version: u32,
    /// Version of the crate that wrote the file
    pub crate_version: String,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Feature names in feature-vector order
    pub feature_names: Vec<String>,
    /// Normalization and ensemble
    pub pipeline: FittedPipeline,
}

impl PersistedModel {
    /// Wrap a pipeline, stamping it with the current time.
    pub fn new(pipeline: FittedPipeline) -> Self {
        PersistedModel {
            format_version: MODEL_FORMAT_VERSION,
            crate_version: TRAFFIC_GBDT_VERSION.to_string(),
            created_at: chrono::Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            pipeline,
        }
    }

    /// Check that the envelope can be used by this build.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(TrafficGbdtError::model_state(format!(
                "unsupported model format version {} (expected {})",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(TrafficGbdtError::model_state(format!(
                "model features {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        self.pipeline.validate()
    }

    /// Unwrap after validation.
    pub fn into_pipeline(self) -> Result<FittedPipeline> {
        self.validate()?;
        Ok(self.pipeline)
    }
}
