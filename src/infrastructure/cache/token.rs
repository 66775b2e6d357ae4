//! Namespace generation token generation
//!
//! A token is the little-endian nanosecond timestamp followed by random bytes
//! from the OS entropy source, encoded as URL-safe base64 without padding.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::{CacheError, Result};

/// Smallest accepted random block (64 bits)
pub const MIN_RANDOM_BYTES: usize = 8;

/// Current generation of a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationToken(String);

impl GenerationToken {
    /// Wraps an already stored token value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Parses the raw bytes of a namespace entry
    pub fn from_stored(namespace: &str, bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes).map(Self).map_err(|e| {
            CacheError::decode(format!(
                "Namespace '{}' holds a non UTF-8 token: {}",
                namespace, e
            ))
        })
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generator for namespace generation tokens
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    random_bytes: usize,
}

impl TokenGenerator {
    /// Creates a generator with the minimum random block
    pub fn new() -> Self {
        Self {
            random_bytes: MIN_RANDOM_BYTES,
        }
    }

    /// Creates a generator with `random_bytes` of entropy per token
    pub fn with_random_bytes(random_bytes: usize) -> Result<Self> {
        if random_bytes < MIN_RANDOM_BYTES {
            return Err(CacheError::configuration(format!(
                "Token random bytes must be at least {}, got {}",
                MIN_RANDOM_BYTES, random_bytes
            )));
        }

        Ok(Self { random_bytes })
    }

    pub fn random_bytes(&self) -> usize {
        self.random_bytes
    }

    /// Generates a fresh token
    ///
    /// # Panics
    ///
    /// Panics if the OS entropy source cannot be read.
    pub fn generate(&self) -> GenerationToken {
        let mut buf = Vec::with_capacity(8 + self.random_bytes);
        buf.extend_from_slice(&Self::now_nanos().to_le_bytes());

        let mut random = vec![0u8; self.random_bytes];
        if let Err(e) = OsRng.try_fill_bytes(&mut random) {
            panic!("entropy source unavailable, refusing to generate a weak token: {}", e);
        }
        buf.extend_from_slice(&random);

        GenerationToken(URL_SAFE_NO_PAD.encode(&buf))
    }

    fn now_nanos() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as i64
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
