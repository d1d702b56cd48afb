//! Session key type.

use std::fmt;

/// The per-login token the platform requires on state-changing requests.
///
/// # Security
///
/// Never logged or displayed in Debug output. Treat as opaque.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey(String);

impl SessionKey {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key, for callers building their own platform requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionKey").field(&"[REDACTED]").finish()
    }
}

impl PartialEq<str> for SessionKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_hides_value_in_debug() {
        let key = SessionKey::new("Xy7kQ2pLmN");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("Xy7kQ2pLmN"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn compares_with_strings() {
        let key = SessionKey::new("abc");
        assert_eq!(key, "abc");
        assert_eq!(key.as_str(), "abc");
    }
}
