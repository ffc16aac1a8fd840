//! Compact binary encoding of persisted models.

use crate::core::error::Result;
use crate::io::serialization::PersistedModel;
use std::io::{Read, Write};

/// Write a model with bincode.
pub fn write_model<W: Write>(writer: W, model: &PersistedModel) -> Result<()> {
    ::bincode::serialize_into(writer, model)?;
    Ok(())
}

/// Read a model written by [`write_model`]. The result is not validated.
pub fn read_model<R: Read>(reader: R) -> Result<PersistedModel> {
    Ok(::bincode::deserialize_from(reader)?)
}

/// Encode a model to bytes.
pub fn to_bytes(model: &PersistedModel) -> Result<Vec<u8>> {
    Ok(::bincode::serialize(model)?)
}

/// Decode a model from bytes. The result is not validated.
pub fn from_bytes(bytes: &[u8]) -> Result<PersistedModel> {
    Ok(::bincode::deserialize(bytes)?)
}
