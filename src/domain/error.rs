use thiserror::Error;

/// Errors surfaced by cache operations
///
/// Key arity mistakes and entropy failures are not represented here: the first
/// cannot be expressed through [`CacheAddress`](crate::domain::cache::CacheAddress),
/// the second aborts the calling operation with a panic.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Not found: {key}")]
    NotFound { key: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CacheError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true when the error only reports an absent key
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = CacheError::not_found("user:42");
        assert_eq!(error.to_string(), "Not found: user:42");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_store_error() {
        let error = CacheError::store("connection refused");
        assert_eq!(error.to_string(), "Store error: connection refused");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_decode_error() {
        let error = CacheError::decode("invalid type: integer, expected a string");
        assert!(error.to_string().starts_with("Decode error:"));
        assert!(!error.is_not_found());
    }
}
