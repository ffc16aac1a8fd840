//! JSON encoding of persisted models.

use crate::core::error::Result;
use crate::io::serialization::PersistedModel;
use std::io::{Read, Write};

/// Write a model as pretty-printed JSON.
pub fn write_model<W: Write>(writer: W, model: &PersistedModel) -> Result<()> {
    serde_json::to_writer_pretty(writer, model)?;
    Ok(())
}

/// Read a model written by [`write_model`]. The result is not validated.
pub fn read_model<R: Read>(reader: R) -> Result<PersistedModel> {
    Ok(serde_json::from_reader(reader)?)
}

/// Encode a model to a JSON string.
pub fn to_string(model: &PersistedModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Decode a model from a JSON string. The result is not validated.
pub fn from_str(json: &str) -> Result<PersistedModel> {
    Ok(serde_json::from_str(json)?)
}
