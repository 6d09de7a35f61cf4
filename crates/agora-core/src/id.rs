//! Opaque identifiers handed out by the document store.
//!
//! Keys are never interpreted by agora; they are compared for equality only.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a user document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Wraps a raw key without validation.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Parses a key supplied by an untrusted caller.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidKey` if the key is empty or only whitespace.
    pub fn parse(key: &str) -> CoreResult<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidKey(key.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for UserKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for UserKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let key = UserKey::parse("  u1 ").unwrap();
        assert_eq!(key.as_str(), "u1");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(
            UserKey::parse("   "),
            Err(CoreError::InvalidKey("   ".to_string()))
        );
    }

    #[test]
    fn test_serde_transparent() {
        let key = UserKey::from("abc");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"abc\"");
    }
}
