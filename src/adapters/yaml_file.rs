// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file configuration source adapter.
//!
//! This module provides the YAML parser and an adapter that serves a YAML file
//! as one explicit layer of the configuration tree.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use crate::ports::{ConfigParser, ConfigSource};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed file size for YAML configuration files (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SOURCE_NAME: &str = "yaml-file";

/// YAML parser implementation.
///
/// The document root must be a mapping (or empty). Mappings are flattened with
/// dot notation. Strings, integers and booleans keep
/// their type; sequences, floats and other leaves are kept whole as opaque
/// values; null leaves are dropped.
///
/// # Examples
///
/// ```rust
/// use cfgbind::adapters::YamlParser;
/// use cfgbind::domain::ConfigValue;
/// use cfgbind::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let result = parser.parse("http:\n  port: 9554\n  host: localhost").unwrap();
/// assert_eq!(result.get("http.port"), Some(&ConfigValue::Integer(9554)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn flatten(
        value: serde_yaml::Value,
        prefix: &ConfigKey,
        result: &mut BTreeMap<ConfigKey, ConfigValue>,
    ) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    match key.as_str() {
                        Some(segment) => Self::flatten(val, &prefix.child(segment), result),
                        None => tracing::debug!(
                            "Skipping non-string YAML key {:?} under '{}'",
                            key,
                            prefix
                        ),
                    }
                }
            }
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Tagged(tagged) => Self::flatten(tagged.value, prefix, result),
            leaf => {
                result.insert(prefix.clone(), ConfigValue::from_yaml(leaf));
            }
        }
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        let root = match value {
            serde_yaml::Value::Tagged(tagged) => tagged.value,
            other => other,
        };
        if !matches!(root, serde_yaml::Value::Mapping(_) | serde_yaml::Value::Null) {
            return Err(ConfigError::ParseError {
                message: "YAML document root must be a mapping".to_string(),
                source: None,
            });
        }

        let mut result = BTreeMap::new();
        Self::flatten(root, &ConfigKey::from(""), &mut result);
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

fn file_label(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

fn source_error(message: String, err: std::io::Error) -> ConfigError {
    ConfigError::SourceError {
        source_name: SOURCE_NAME.to_string(),
        message,
        source: Some(Box::new(err)),
    }
}

/// Configuration source adapter for YAML files.
///
/// # Priority
///
/// YAML files have a priority of 1: they override built-in defaults and are
/// overridden by environment variables and command-line arguments.
///
/// # Examples
///
/// ```rust,no_run
/// use cfgbind::adapters::YamlFileAdapter;
///
/// let adapter = YamlFileAdapter::from_file("/etc/qdb/qdb.yaml").unwrap();
/// let adapter = YamlFileAdapter::from_default_location("qdb", "io.qdb").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileAdapter {
    file_path: PathBuf,
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl YamlFileAdapter {
    /// Loads a YAML file.
    ///
    /// # Errors
    ///
    /// `SourceError` if the file is missing, unreadable or larger than 10MB;
    /// `ParseError` if it is not valid YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref();

        let canonical_path = file_path.canonicalize().map_err(|e| {
            source_error(
                format!("Invalid or inaccessible path: {}", file_label(file_path)),
                e,
            )
        })?;

        let metadata = fs::metadata(&canonical_path).map_err(|e| {
            source_error(
                format!("Failed to read file metadata: {}", file_label(&canonical_path)),
                e,
            )
        })?;

        if metadata.len() > MAX_YAML_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: SOURCE_NAME.to_string(),
                message: format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_YAML_FILE_SIZE
                ),
                source: None,
            });
        }

        let content = fs::read_to_string(&canonical_path).map_err(|e| {
            source_error(
                format!(
                    "Failed to read configuration file: {}",
                    file_label(&canonical_path)
                ),
                e,
            )
        })?;

        let values = YamlParser::new().parse(&content)?;
        tracing::debug!(
            "Loaded {} entries from {}",
            values.len(),
            canonical_path.display()
        );

        Ok(Self {
            file_path: canonical_path,
            values,
        })
    }

    /// Loads `config.yaml` from the OS-appropriate configuration directory.
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, "config.yaml")
    }

    /// Loads `filename` from the OS-appropriate configuration directory.
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        Self::from_file(default_location(app_name, qualifier)?.join(filename))
    }

    /// Returns the canonical path of the loaded file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Returns the OS-appropriate configuration directory for an application.
pub fn default_location(app_name: &str, qualifier: &str) -> Result<PathBuf> {
    ProjectDirs::from(qualifier, "", app_name)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ConfigError::SourceError {
            source_name: SOURCE_NAME.to_string(),
            message: "Failed to determine project directories".to_string(),
            source: None,
        })
}

impl ConfigSource for YamlFileAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn priority(&self) -> u8 {
        1
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self.values.get(key).cloned())
    }

    fn entries(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
        Ok(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BindingKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_parser_nested() {
        let parser = YamlParser::new();
        let yaml = r#"
repo:
  sync:
    retryBackoff: 1s,5s
    enabled: true
  maxSize: 1000
"#;
        let result = parser.parse(yaml).unwrap();

        assert_eq!(
            result.get("repo.sync.retryBackoff"),
            Some(&ConfigValue::from("1s,5s"))
        );
        assert_eq!(
            result.get("repo.sync.enabled"),
            Some(&ConfigValue::Boolean(true))
        );
        assert_eq!(result.get("repo.maxSize"), Some(&ConfigValue::Integer(1000)));
    }

    #[test]
    fn test_yaml_parser_sequence_is_opaque_leaf() {
        let parser = YamlParser::new();
        let result = parser.parse("servers:\n  - a\n  - b\n").unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("servers").unwrap().kind(), BindingKind::Opaque);
    }

    #[test]
    fn test_yaml_parser_float_is_opaque_and_null_dropped() {
        let parser = YamlParser::new();
        let result = parser.parse("ratio: 0.75\nunset: null\n").unwrap();

        assert_eq!(result.get("ratio").unwrap().kind(), BindingKind::Opaque);
        assert!(result.get("unset").is_none());
    }

    #[test]
    fn test_yaml_parser_quoted_number_is_text() {
        let parser = YamlParser::new();
        let result = parser.parse("port: \"9554\"").unwrap();
        assert_eq!(result.get("port"), Some(&ConfigValue::from("9554")));
    }

    #[test]
    fn test_yaml_parser_empty_document() {
        let parser = YamlParser::new();
        assert!(parser.parse("").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_parser_invalid() {
        let parser = YamlParser::new();
        let result = parser.parse("invalid: yaml: content:");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_yaml_parser_rejects_scalar_root() {
        let parser = YamlParser::new();
        for content in ["hello", "42", "- a\n- b\n"] {
            let result = parser.parse(content);
            assert!(
                matches!(result, Err(ConfigError::ParseError { .. })),
                "accepted {:?}",
                content
            );
        }
    }

    #[test]
    fn test_yaml_parser_supported_extensions() {
        let parser = YamlParser::default();
        assert_eq!(parser.supported_extensions(), &["yaml", "yml"]);
    }

    #[test]
    fn test_yaml_adapter_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "http:\n  port: 8080").unwrap();

        let adapter = YamlFileAdapter::from_file(temp_file.path()).unwrap();

        assert_eq!(adapter.name(), "yaml-file");
        assert_eq!(adapter.priority(), 1);
        assert!(adapter.origin().is_explicit());
        assert_eq!(
            adapter.get_str("http.port").unwrap(),
            Some(ConfigValue::Integer(8080))
        );
        assert_eq!(adapter.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_yaml_adapter_file_path_is_canonical() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key: value").unwrap();

        let adapter = YamlFileAdapter::from_file(temp_file.path()).unwrap();
        assert_eq!(
            adapter.file_path(),
            temp_file.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_yaml_adapter_nonexistent_file() {
        let result = YamlFileAdapter::from_file("/nonexistent/path/to/config.yaml");
        assert!(matches!(result, Err(ConfigError::SourceError { .. })));
    }
}
