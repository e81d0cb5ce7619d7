// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in defaults layer.
//!
//! Entries from this source carry [`Origin::Default`] and are therefore never
//! turned into bindings on their own. An explicit source has to override them.

use crate::domain::{ConfigKey, ConfigValue, Origin, Result};
use crate::ports::ConfigSource;
use std::collections::BTreeMap;

/// In-memory built-in defaults, the lowest layer of the tree.
///
/// # Examples
///
/// ```rust
/// use cfgbind::adapters::DefaultsSource;
/// use cfgbind::ports::ConfigSource;
///
/// let defaults = DefaultsSource::new()
///     .with_value("http.port", 9554)
///     .with_value("fetchBackoff", "1s,5s,30s");
///
/// assert_eq!(defaults.priority(), 0);
/// assert!(!defaults.origin().is_explicit());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultsSource {
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl DefaultsSource {
    /// Creates an empty defaults layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a default value.
    pub fn with_value(mut self, key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builds the layer from a compiled-in YAML document, typically `include_str!`'d.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(content: &str) -> Result<Self> {
        use crate::adapters::YamlParser;
        use crate::ports::ConfigParser;

        let values = YamlParser::new().parse(content)?;
        tracing::debug!("Loaded {} built-in defaults", values.len());
        Ok(Self { values })
    }
}

impl<K, V> FromIterator<(K, V)> for DefaultsSource
where
    K: Into<ConfigKey>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for DefaultsSource {
    fn name(&self) -> &str {
        "defaults"
    }

    fn priority(&self) -> u8 {
        0
    }

    fn origin(&self) -> Origin {
        Origin::Default
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self.values.get(key).cloned())
    }

    fn entries(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
        Ok(self.values.clone())
    }
}
