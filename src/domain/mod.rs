//! Domain layer - Cache addressing, store boundary and errors

pub mod cache;
pub mod error;

pub use cache::{effective_key, CacheAddress, JsonCodec, KeyStore, ValueCodec, KEY_SEPARATOR};
pub use error::{CacheError, Result};
