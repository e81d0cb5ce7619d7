// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype.
//!
//! Keys are dotted paths (`server.http.port`) and double as binding names, so the
//! same type is used on both sides of resolution.

use std::borrow::Borrow;
use std::fmt;

/// A dotted configuration path, unique within a flattened tree.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("repo.fetchBackoff");
/// assert!(key.ends_with("Backoff"));
/// assert_eq!(key.leaf(), "fetchBackoff");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the full dotted path ends with `suffix`.
    ///
    /// Matching is case-sensitive and applies to the whole path, so
    /// `db.retryBackoff` matches `Backoff` while `db.backoff` does not.
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }

    /// Returns the last path segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgbind::domain::config_key::ConfigKey;
    ///
    /// assert_eq!(ConfigKey::from("a.b.c").leaf(), "c");
    /// assert_eq!(ConfigKey::from("plain").leaf(), "plain");
    /// ```
    pub fn leaf(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Iterates over the dot-separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns a child key formed by appending `segment` to this key.
    ///
    /// An empty parent yields the segment alone.
    pub fn child(&self, segment: &str) -> ConfigKey {
        if self.0.is_empty() {
            ConfigKey::from(segment)
        } else {
            ConfigKey(format!("{}.{}", self.0, segment))
        }
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConfigKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
