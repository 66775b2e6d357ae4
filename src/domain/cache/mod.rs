//! Cache domain - addressing, store boundary and value codecs

mod codec;
mod key;
mod store;

pub use codec::{JsonCodec, ValueCodec};
pub use key::{effective_key, CacheAddress, KEY_SEPARATOR};
pub use store::KeyStore;

#[cfg(test)]
pub use store::MockKeyStore;
