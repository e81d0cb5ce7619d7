// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leaf entries of the configuration tree and their provenance.

use crate::domain::{ConfigKey, ConfigValue};
use std::fmt;

/// Where a configuration value came from.
///
/// Only values with an [`Origin::Explicit`] origin are turned into bindings;
/// compiled-in defaults stay reachable through whatever default path the
/// consumer already has.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The value is a built-in default that nothing overrode.
    Default,
    /// The value was supplied by an external source (file, environment, CLI).
    Explicit {
        /// Name of the supplying source, e.g. `yaml-file` or `env`
        source: String,
    },
}

impl Origin {
    /// Creates an explicit origin for the named source.
    pub fn explicit(source: impl Into<String>) -> Self {
        Origin::Explicit {
            source: source.into(),
        }
    }

    /// Returns `true` if the value was supplied by an external source.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Origin::Explicit { .. })
    }

    /// Returns the supplying source's name for explicit origins.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Origin::Default => None,
            Origin::Explicit { source } => Some(source),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Default => f.write_str("built-in default"),
            Origin::Explicit { source } => write!(f, "{}", source),
        }
    }
}

/// A single leaf of a flattened configuration tree.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::{ConfigEntry, Origin};
///
/// let entry = ConfigEntry::new("http.port", 8080, Origin::explicit("yaml-file"));
/// assert!(entry.is_explicit());
/// assert_eq!(entry.key().as_str(), "http.port");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigEntry {
    key: ConfigKey,
    value: ConfigValue,
    origin: Origin,
}

impl ConfigEntry {
    /// Creates a new entry.
    pub fn new(key: impl Into<ConfigKey>, value: impl Into<ConfigValue>, origin: Origin) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            origin,
        }
    }

    /// Creates an entry for a built-in default.
    pub fn default_value(key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Self {
        Self::new(key, value, Origin::Default)
    }

    /// Returns the dotted key.
    pub fn key(&self) -> &ConfigKey {
        &self.key
    }

    /// Returns the resolved value.
    pub fn value(&self) -> &ConfigValue {
        &self.value
    }

    /// Returns the value's provenance.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Returns `true` if an external source supplied the value.
    pub fn is_explicit(&self) -> bool {
        self.origin.is_explicit()
    }

    /// Splits the entry into its parts.
    pub fn into_parts(self) -> (ConfigKey, ConfigValue, Origin) {
        (self.key, self.value, self.origin)
    }
}
