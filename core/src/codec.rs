//! Structured encode/decode of composite records to/from bytes.
//!
//! Every record the ledger persists goes through this module, so the wire
//! format of the store is defined in exactly one place. Records are encoded
//! with bincode; a record type's serde definition IS its storage schema.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A record could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Stored bytes could not be deserialized into the expected record type.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Encode a record into bytes for storage.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(|err| CodecError::Encode(err.to_string()))
}

/// Decode a record from stored bytes.
///
/// # Errors
///
/// Returns `CodecError::Decode` if the bytes do not describe a valid `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|err| CodecError::Decode(err.to_string()))
}
