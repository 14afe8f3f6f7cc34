//! # Argument Codec
//!
//! Adapter call arguments are opaque to the integration manager. Adapters
//! and their callers agree on a `bincode` layout per selector.

use crate::entities::Bytes;
use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode typed adapter arguments into an opaque payload.
pub fn encode_args<T: Serialize>(args: &T) -> Result<Bytes, CodecError> {
    bincode::serialize(args)
        .map(Bytes)
        .map_err(|e| CodecError::Encoding(e.to_string()))
}

/// Decode an opaque payload into typed adapter arguments.
pub fn decode_args<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(payload).map_err(|e| CodecError::Malformed(e.to_string()))
}
