//! Cache addressing and effective key construction

use std::fmt;

/// Separator placed between a generation token and a caller key
///
/// Generation tokens are URL-safe base64, so they never contain it.
pub const KEY_SEPARATOR: char = ':';

/// Where a value lives: directly under a key, or under a key inside a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheAddress {
    /// A key used as-is against the store
    Flat(String),
    /// A key scoped to the current generation of a namespace
    Namespaced { namespace: String, key: String },
}

impl CacheAddress {
    /// Creates a flat address
    pub fn flat(key: impl Into<String>) -> Self {
        Self::Flat(key.into())
    }

    /// Creates a namespaced address
    pub fn namespaced(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Namespaced {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Returns the caller key, without namespace
    pub fn key(&self) -> &str {
        match self {
            Self::Flat(key) => key,
            Self::Namespaced { key, .. } => key,
        }
    }

    /// Returns the namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Flat(_) => None,
            Self::Namespaced { namespace, .. } => Some(namespace),
        }
    }
}

impl fmt::Display for CacheAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(key) => write!(f, "{}", key),
            Self::Namespaced { namespace, key } => write!(f, "{}/{}", namespace, key),
        }
    }
}

impl From<&str> for CacheAddress {
    fn from(key: &str) -> Self {
        Self::flat(key)
    }
}

impl From<String> for CacheAddress {
    fn from(key: String) -> Self {
        Self::Flat(key)
    }
}

impl From<(&str, &str)> for CacheAddress {
    fn from((namespace, key): (&str, &str)) -> Self {
        Self::namespaced(namespace, key)
    }
}

impl From<(String, String)> for CacheAddress {
    fn from((namespace, key): (String, String)) -> Self {
        Self::Namespaced { namespace, key }
    }
}

/// Builds the store key for `key` under the namespace generation `token`
pub fn effective_key(token: &str, key: &str) -> String {
    let mut out = String::with_capacity(token.len() + 1 + key.len());
    out.push_str(token);
    out.push(KEY_SEPARATOR);
    out.push_str(key);
    out
}
