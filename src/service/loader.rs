// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! The loader stacks [`ConfigSource`]s by priority and merges them into a
//! [`ConfigTree`]. A key supplied by several sources keeps the value and origin
//! of the highest-priority one.

use crate::adapters::DefaultsSource;
use crate::domain::{ConfigEntry, ConfigTree, Result};
use crate::ports::ConfigSource;
#[cfg(feature = "yaml")]
use std::path::{Path, PathBuf};

/// Environment variable naming the local override file.
pub const LOCAL_OVERRIDE_VAR: &str = "QDB_CONF";

/// File stem used for the local override when [`LOCAL_OVERRIDE_VAR`] is unset.
pub const LOCAL_OVERRIDE_STEM: &str = "qdb";

/// Builds a [`ConfigTree`] from layered sources.
///
/// # Examples
///
/// ```rust
/// use cfgbind::adapters::DefaultsSource;
/// use cfgbind::service::ConfigLoader;
///
/// # fn main() -> cfgbind::domain::Result<()> {
/// let tree = ConfigLoader::new()
///     .with_defaults(DefaultsSource::new().with_value("http.port", 9554))
///     .with_cli_args(["--http.port=8080"])
///     .load()?;
///
/// let entry = tree.require("http.port")?;
/// assert_eq!(entry.origin().source_name(), Some("cli"));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ConfigLoader {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigLoader {
    /// Creates a loader with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a configuration source.
    pub fn with_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds the built-in defaults layer.
    pub fn with_defaults(self, defaults: DefaultsSource) -> Self {
        self.with_source(Box::new(defaults))
    }

    /// Adds a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    #[cfg(feature = "yaml")]
    pub fn with_yaml_file(self, path: impl AsRef<Path>) -> Result<Self> {
        use crate::adapters::YamlFileAdapter;
        let adapter = YamlFileAdapter::from_file(path)?;
        Ok(self.with_source(Box::new(adapter)))
    }

    /// Adds a YAML file if it exists.
    ///
    /// A missing file is skipped. A file that exists but is unreadable or
    /// malformed is still an error.
    #[cfg(feature = "yaml")]
    pub fn with_optional_yaml_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            tracing::debug!("No configuration file at {}, skipping", path.display());
            return Ok(self);
        }
        self.with_yaml_file(path)
    }

    /// Adds the local override file.
    ///
    /// The file is named by the `QDB_CONF` environment variable, falling back to
    /// `qdb` in the working directory. A name without an extension is tried as is
    /// and then with `.yaml` and `.yml`. If no candidate exists the loader runs
    /// on defaults alone.
    #[cfg(feature = "yaml")]
    pub fn with_local_override(self) -> Result<Self> {
        let name = std::env::var(LOCAL_OVERRIDE_VAR)
            .unwrap_or_else(|_| LOCAL_OVERRIDE_STEM.to_string());
        match local_override_candidates(&name).into_iter().find(|p| p.is_file()) {
            Some(path) => self.with_yaml_file(path),
            None => {
                tracing::debug!("No local override found for '{}'", name);
                Ok(self)
            }
        }
    }

    /// Adds environment variables starting with `prefix`.
    ///
    /// Keys keep their case so camel-case names like `fetchBackoff` survive.
    /// `QDB_CONF` names the override file and is never read as a setting.
    #[cfg(feature = "env")]
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(Box::new(
            EnvVarAdapter::with_prefix(prefix).excluding(LOCAL_OVERRIDE_VAR),
        ))
    }

    /// Adds command-line arguments.
    #[cfg(feature = "cli")]
    pub fn with_cli_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        use crate::adapters::CommandLineAdapter;
        self.with_source(Box::new(CommandLineAdapter::from_args(args)))
    }

    /// Returns the number of registered sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Merges every source into a tree.
    ///
    /// Sources are applied from lowest to highest priority; sources of equal
    /// priority are applied in registration order, so the later one wins.
    ///
    /// # Errors
    ///
    /// Fails on the first source that cannot list its entries.
    pub fn load(mut self) -> Result<ConfigTree> {
        self.sources.sort_by_key(|s| s.priority());

        let mut tree = ConfigTree::new();
        for source in &self.sources {
            let origin = source.origin();
            let entries = source.entries()?;
            tracing::debug!(
                "Merging {} entries from source '{}' (priority {})",
                entries.len(),
                source.name(),
                source.priority()
            );
            tree.merge_layer(
                entries
                    .into_iter()
                    .map(|(key, value)| ConfigEntry::new(key, value, origin.clone())),
            );
        }

        tracing::debug!(
            "Loaded {} configuration keys from {} sources",
            tree.len(),
            self.sources.len()
        );
        Ok(tree)
    }
}

#[cfg(feature = "yaml")]
fn local_override_candidates(name: &str) -> Vec<PathBuf> {
    let path = PathBuf::from(name);
    if path.extension().is_some() {
        return vec![path];
    }
    vec![
        path.clone(),
        path.with_extension("yaml"),
        path.with_extension("yml"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigError, ConfigKey, ConfigValue, Origin};
    use std::collections::BTreeMap;

    struct MockSource {
        name: String,
        priority: u8,
        values: BTreeMap<ConfigKey, ConfigValue>,
        fail: bool,
    }

    impl MockSource {
        fn new(name: &str, priority: u8) -> Self {
            Self {
                name: name.to_string(),
                priority,
                values: BTreeMap::new(),
                fail: false,
            }
        }

        fn with_value(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
            self.values.insert(ConfigKey::from(key), value.into());
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    impl ConfigSource for MockSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
            Ok(self.values.get(key).cloned())
        }

        fn entries(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
            if self.fail {
                return Err(ConfigError::SourceError {
                    source_name: self.name.clone(),
                    message: "unavailable".to_string(),
                    source: None,
                });
            }
            Ok(self.values.clone())
        }
    }

    #[test]
    fn test_empty_loader() {
        let tree = ConfigLoader::new().load().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let tree = ConfigLoader::new()
            .with_source(Box::new(MockSource::new("high", 2).with_value("a", "high")))
            .with_source(Box::new(MockSource::new("low", 1).with_value("a", "low").with_value("b", 1)))
            .load()
            .unwrap();

        let a = tree.require("a").unwrap();
        assert_eq!(a.value(), &ConfigValue::from("high"));
        assert_eq!(a.origin(), &Origin::explicit("high"));

        let b = tree.require("b").unwrap();
        assert_eq!(b.origin(), &Origin::explicit("low"));
    }

    #[test]
    fn test_equal_priority_later_source_wins() {
        let tree = ConfigLoader::new()
            .with_source(Box::new(MockSource::new("first", 1).with_value("a", 1)))
            .with_source(Box::new(MockSource::new("second", 1).with_value("a", 2)))
            .load()
            .unwrap();
        assert_eq!(tree.value("a"), Some(&ConfigValue::Integer(2)));
    }

    #[test]
    fn test_defaults_keep_default_origin() {
        let tree = ConfigLoader::new()
            .with_defaults(DefaultsSource::new().with_value("a", 1).with_value("b", 2))
            .with_source(Box::new(MockSource::new("file", 1).with_value("a", 10)))
            .load()
            .unwrap();

        assert!(tree.require("a").unwrap().is_explicit());
        assert_eq!(tree.require("b").unwrap().origin(), &Origin::Default);
        assert_eq!(tree.explicit_entries().count(), 1);
    }

    #[test]
    fn test_failing_source_aborts_load() {
        let result = ConfigLoader::new()
            .with_source(Box::new(MockSource::new("broken", 1).failing()))
            .load();
        assert!(matches!(result, Err(ConfigError::SourceError { .. })));
    }

    #[test]
    fn test_source_count() {
        let loader = ConfigLoader::new()
            .with_defaults(DefaultsSource::new())
            .with_source(Box::new(MockSource::new("m", 1)));
        assert_eq!(loader.source_count(), 2);
    }

    #[test]
    #[cfg(feature = "cli")]
    fn test_cli_overrides_defaults() {
        let tree = ConfigLoader::new()
            .with_defaults(DefaultsSource::new().with_value("fetchBackoff", "1s"))
            .with_cli_args(["--fetchBackoff", "2s,4s"])
            .load()
            .unwrap();

        let entry = tree.require("fetchBackoff").unwrap();
        assert_eq!(entry.value(), &ConfigValue::from("2s,4s"));
        assert_eq!(entry.origin().source_name(), Some("cli"));
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_optional_yaml_file_missing_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new()
            .with_optional_yaml_file(dir.path().join("absent.yaml"))
            .unwrap();
        assert_eq!(loader.source_count(), 0);
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_optional_yaml_file_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "invalid: yaml: content:").unwrap();

        let result = ConfigLoader::new().with_optional_yaml_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_local_override_candidates() {
        assert_eq!(
            local_override_candidates("qdb"),
            vec![
                PathBuf::from("qdb"),
                PathBuf::from("qdb.yaml"),
                PathBuf::from("qdb.yml")
            ]
        );
        assert_eq!(
            local_override_candidates("/etc/qdb/server.yaml"),
            vec![PathBuf::from("/etc/qdb/server.yaml")]
        );
    }
}
