//! Value codecs

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{CacheError, Result};

/// Turns typed values into stored bytes and back
///
/// Output must be decodable by any other process using the same codec.
pub trait ValueCodec: Send + Sync + Debug {
    /// Serializes a value
    fn encode<V: Serialize + ?Sized>(&self, value: &V) -> Result<Vec<u8>>;

    /// Deserializes bytes into `V`
    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<V>;
}

/// JSON codec backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode<V: Serialize + ?Sized>(&self, value: &V) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| CacheError::encode(format!("Failed to serialize cache value: {}", e)))
    }

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<V> {
        serde_json::from_slice(bytes)
            .map_err(|e| CacheError::decode(format!("Failed to deserialize cache value: {}", e)))
    }
}
