// SPDX-License-Identifier: MIT OR Apache-2.0

//! The flattened, layered configuration tree.
//!
//! A `ConfigTree` holds exactly one entry per key. Layering happens on insert:
//! a later layer replaces whatever an earlier layer put under the same key,
//! origin included.

use crate::domain::{ConfigEntry, ConfigError, ConfigKey, ConfigValue, Result};
use std::collections::btree_map::{self, BTreeMap};

/// A fully merged configuration tree with provenance per leaf.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::{ConfigEntry, ConfigTree, Origin};
///
/// let mut tree = ConfigTree::new();
/// tree.insert(ConfigEntry::default_value("http.port", 8080));
/// tree.insert(ConfigEntry::new("http.port", 9090, Origin::explicit("yaml-file")));
///
/// assert_eq!(tree.len(), 1);
/// assert!(tree.get("http.port").unwrap().is_explicit());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigTree {
    entries: BTreeMap<ConfigKey, ConfigEntry>,
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing and returning any entry under the same key.
    pub fn insert(&mut self, entry: ConfigEntry) -> Option<ConfigEntry> {
        self.entries.insert(entry.key().clone(), entry)
    }

    /// Overlays a whole layer on top of the tree.
    ///
    /// Entries of the layer win over existing entries with the same key.
    pub fn merge_layer<I>(&mut self, layer: I)
    where
        I: IntoIterator<Item = ConfigEntry>,
    {
        for entry in layer {
            self.insert(entry);
        }
    }

    /// Returns the entry under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.get(key)
    }

    /// Returns the value under `key`, if any.
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.get(key).map(ConfigEntry::value)
    }

    /// Returns the entry under `key` or a `ConfigKeyNotFound` error.
    pub fn require(&self, key: &str) -> Result<&ConfigEntry> {
        self.get(key).ok_or_else(|| ConfigError::ConfigKeyNotFound {
            key: key.to_string(),
        })
    }

    /// Returns `true` if the tree has an entry under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of leaf entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every entry in key order.
    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.values()
    }

    /// Iterates over entries supplied by an external source.
    pub fn explicit_entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries().filter(|e| e.is_explicit())
    }

    /// Iterates over every key in order.
    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.entries.keys()
    }
}

impl FromIterator<ConfigEntry> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = ConfigEntry>>(iter: I) -> Self {
        let mut tree = ConfigTree::new();
        tree.merge_layer(iter);
        tree
    }
}

impl Extend<ConfigEntry> for ConfigTree {
    fn extend<I: IntoIterator<Item = ConfigEntry>>(&mut self, iter: I) {
        self.merge_layer(iter);
    }
}

impl IntoIterator for ConfigTree {
    type Item = ConfigEntry;
    type IntoIter = btree_map::IntoValues<ConfigKey, ConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Origin;

    fn sample() -> ConfigTree {
        vec![
            ConfigEntry::default_value("http.port", 8080),
            ConfigEntry::default_value("http.host", "0.0.0.0"),
            ConfigEntry::new("data.dir", "/var/qdb", Origin::explicit("yaml-file")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_later_layer_overrides() {
        let mut tree = sample();
        let previous = tree.insert(ConfigEntry::new("http.port", 9000, Origin::explicit("env")));

        assert_eq!(previous.unwrap().origin(), &Origin::Default);
        assert_eq!(tree.value("http.port"), Some(&ConfigValue::Integer(9000)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_explicit_entries() {
        let tree = sample();
        let keys: Vec<_> = tree.explicit_entries().map(|e| e.key().as_str()).collect();
        assert_eq!(keys, vec!["data.dir"]);
    }

    #[test]
    fn test_require_missing_key() {
        let tree = sample();
        assert!(tree.require("http.host").is_ok());
        let err = tree.require("nope").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigKeyNotFound { .. }));
    }

    #[test]
    fn test_keys_are_sorted() {
        let tree = sample();
        let keys: Vec<_> = tree.keys().map(ConfigKey::as_str).collect();
        assert_eq!(keys, vec!["data.dir", "http.host", "http.port"]);
    }

    #[test]
    fn test_extend_and_into_iter() {
        let mut tree = ConfigTree::new();
        assert!(tree.is_empty());
        tree.extend(vec![ConfigEntry::default_value("a", 1)]);
        assert!(tree.contains("a"));
        let entries: Vec<_> = tree.into_iter().collect();
        assert_eq!(entries.len(), 1);
    }
}
