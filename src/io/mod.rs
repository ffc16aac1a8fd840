//! Persistence of fitted pipelines.
//!
//! The format is chosen from the file extension: `.json` for JSON,
//! `.bin` or `.bincode` for bincode.

pub mod serialization;

pub use serialization::{PersistedModel, SerializationFormat};

use crate::core::error::Result;
use crate::pipeline::FittedPipeline;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Save a fitted pipeline, picking the format from the extension.
pub fn save_pipeline<P: AsRef<Path>>(path: P, pipeline: &FittedPipeline) -> Result<()> {
    let path = path.as_ref();
    let format = SerializationFormat::from_path(path)?;
    save_pipeline_as(path, pipeline, format)
}

/// Save a fitted pipeline in an explicit format.
pub fn save_pipeline_as<P: AsRef<Path>>(
    path: P,
    pipeline: &FittedPipeline,
    format: SerializationFormat,
) -> Result<()> {
    let path = path.as_ref();
    pipeline.validate()?;
    let model = PersistedModel::new(pipeline.clone());

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        SerializationFormat::Json => serialization::json::write_model(&mut writer, &model)?,
        SerializationFormat::Bincode => serialization::bincode::write_model(&mut writer, &model)?,
    }
    writer.flush()?;

    log::info!(
        "Saved model ({} trees) to {} as {}",
        pipeline.ensemble().num_trees(),
        path.display(),
        format
    );
    Ok(())
}

/// Load and validate a fitted pipeline, picking the format from the
/// extension.
pub fn load_pipeline<P: AsRef<Path>>(path: P) -> Result<FittedPipeline> {
    let path = path.as_ref();
    let format = SerializationFormat::from_path(path)?;
    load_pipeline_as(path, format)
}

/// Load and validate a fitted pipeline stored in `format`.
pub fn load_pipeline_as<P: AsRef<Path>>(path: P, format: SerializationFormat) -> Result<FittedPipeline> {
    let path = path.as_ref();
    let model = load_persisted_model(path, format)?;
    log::info!(
        "Loaded model written by traffic-gbdt {} at {}",
        model.crate_version,
        model.created_at
    );
    model.into_pipeline()
}

/// Read the persisted envelope without validating it.
pub fn load_persisted_model<P: AsRef<Path>>(
    path: P,
    format: SerializationFormat,
) -> Result<PersistedModel> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    match format {
        SerializationFormat::Json => serialization::json::read_model(reader),
        SerializationFormat::Bincode => serialization::bincode::read_model(reader),
    }
}
