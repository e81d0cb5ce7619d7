// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration source adapter.
//!
//! Every value read from the environment is text; declared kind rules on the
//! resolver decide whether it becomes an integer, a boolean or a backoff policy.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use crate::ports::ConfigSource;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::env;

/// Maximum length for environment variable keys
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (1MB)
const MAX_ENV_VALUE_LEN: usize = 1_048_576;

/// Configuration source adapter for environment variables.
///
/// Supports prefix filtering (only `QDB_*`, prefix stripped) and key transforms.
/// Because keys are case-sensitive, a camel-case key such as `fetchBackoff` is
/// best supplied as `QDB_fetchBackoff` with lowercasing left off.
///
/// The environment is read once, on first use. Variables outside the prefix are
/// ignored whatever their encoding; a matching variable whose value is not
/// UTF-8 fails the load with a `SourceError`.
///
/// # Priority
///
/// Environment variables have a priority of 2: they override files and defaults
/// and are overridden by command-line arguments.
///
/// # Examples
///
/// ```rust
/// use cfgbind::adapters::EnvVarAdapter;
///
/// let adapter = EnvVarAdapter::with_prefix("QDB_");
/// ```
#[derive(Debug)]
pub struct EnvVarAdapter {
    prefix: Option<String>,
    lowercase_keys: bool,
    replace_underscores: bool,
    excluded: Vec<String>,
    values: OnceCell<BTreeMap<ConfigKey, ConfigValue>>,
}

impl EnvVarAdapter {
    /// Creates an adapter over every environment variable.
    pub fn new() -> Self {
        Self {
            prefix: None,
            lowercase_keys: false,
            replace_underscores: true,
            excluded: Vec::new(),
            values: OnceCell::new(),
        }
    }

    /// Creates an adapter over variables starting with `prefix`.
    ///
    /// The prefix is stripped from the resulting keys.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Sets whether to convert keys to lowercase.
    pub fn lowercase_keys(mut self, enabled: bool) -> Self {
        self.lowercase_keys = enabled;
        self
    }

    /// Sets whether to replace underscores with dots in keys (default: on).
    pub fn replace_underscores(mut self, enabled: bool) -> Self {
        self.replace_underscores = enabled;
        self
    }

    /// Ignores the variable `name` (matched before the prefix is stripped).
    pub fn excluding(mut self, name: impl Into<String>) -> Self {
        self.excluded.push(name.into());
        self
    }

    /// Creates an adapter over a fixed set of values instead of the process
    /// environment. Keys are used verbatim.
    pub fn with_values<K, V, I>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let adapter = Self::new();
        let map = values
            .into_iter()
            .map(|(k, v)| (ConfigKey::from(k.into()), ConfigValue::Text(v.into())))
            .collect();
        let _ = adapter.values.set(map);
        adapter
    }

    fn transform_key(&self, name: String) -> Option<ConfigKey> {
        let name = match &self.prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str())?.to_string(),
            None => name,
        };
        if name.is_empty() {
            return None;
        }

        let mut key = name;
        if self.lowercase_keys {
            key = key.to_lowercase();
        }
        if self.replace_underscores {
            key = key.replace('_', ".");
        }
        Some(ConfigKey::from(key))
    }

    fn load(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
        let mut values = BTreeMap::new();

        for (name, value) in env::vars_os() {
            let Some(name) = name.to_str() else {
                tracing::debug!("Skipping environment variable with non UTF-8 name {:?}", name);
                continue;
            };
            if self.excluded.iter().any(|e| e == name) {
                continue;
            }
            let Some(key) = self.transform_key(name.to_string()) else {
                continue;
            };
            let Some(value) = value.to_str() else {
                return Err(ConfigError::SourceError {
                    source_name: "env".to_string(),
                    message: format!("Environment variable {} is not valid UTF-8", name),
                    source: None,
                });
            };
            if name.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={}",
                    name.len(),
                    value.len()
                );
                continue;
            }
            values.insert(key, ConfigValue::Text(value.to_string()));
        }

        tracing::debug!(
            "Loaded {} environment variables (prefix={:?}, lowercase={}, replace_underscores={})",
            values.len(),
            self.prefix,
            self.lowercase_keys,
            self.replace_underscores
        );

        Ok(values)
    }

    fn values(&self) -> Result<&BTreeMap<ConfigKey, ConfigValue>> {
        self.values.get_or_try_init(|| self.load())
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        "env"
    }

    fn priority(&self) -> u8 {
        2
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn entries(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
        Ok(self.values()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvGuard {
        keys: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { keys: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.keys.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_env_adapter_name_and_priority() {
        let adapter = EnvVarAdapter::default();
        assert_eq!(adapter.name(), "env");
        assert_eq!(adapter.priority(), 2);
        assert!(adapter.origin().is_explicit());
    }

    #[test]
    fn test_env_adapter_with_prefix() {
        let mut guard = EnvGuard::new();
        guard.set("CFGBIND_ENV_T1_DATABASE_HOST", "localhost");
        guard.set("CFGBIND_OTHER_T1", "ignored");

        let adapter = EnvVarAdapter::with_prefix("CFGBIND_ENV_T1_");
        assert_eq!(
            adapter.get_str("DATABASE.HOST").unwrap(),
            Some(ConfigValue::from("localhost"))
        );
        assert_eq!(adapter.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_env_adapter_keeps_camel_case() {
        let mut guard = EnvGuard::new();
        guard.set("CFGBIND_ENV_T2_fetchBackoff", "1s,2s");

        let adapter = EnvVarAdapter::with_prefix("CFGBIND_ENV_T2_");
        assert_eq!(
            adapter.get_str("fetchBackoff").unwrap(),
            Some(ConfigValue::from("1s,2s"))
        );
    }

    #[test]
    fn test_env_adapter_lowercase_keys() {
        let mut guard = EnvGuard::new();
        guard.set("CFGBIND_ENV_T3_UPPER_CASE", "value");

        let adapter = EnvVarAdapter::with_prefix("CFGBIND_ENV_T3_").lowercase_keys(true);
        assert_eq!(
            adapter.get_str("upper.case").unwrap(),
            Some(ConfigValue::from("value"))
        );
    }

    #[test]
    fn test_env_adapter_no_replace_underscores() {
        let mut guard = EnvGuard::new();
        guard.set("CFGBIND_ENV_T4_MY_VAR", "value");

        let adapter = EnvVarAdapter::with_prefix("CFGBIND_ENV_T4_").replace_underscores(false);
        assert_eq!(
            adapter.get_str("MY_VAR").unwrap(),
            Some(ConfigValue::from("value"))
        );
    }

    #[test]
    fn test_env_adapter_with_values() {
        let adapter = EnvVarAdapter::with_values(vec![("http.port", "9554")]);
        assert_eq!(
            adapter.get_str("http.port").unwrap(),
            Some(ConfigValue::from("9554"))
        );
        assert_eq!(adapter.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_env_adapter_excluding() {
        let mut guard = EnvGuard::new();
        guard.set("CFGBIND_ENV_T7_CONF", "/etc/qdb.yaml");
        guard.set("CFGBIND_ENV_T7_fetchBackoff", "1s");

        let adapter = EnvVarAdapter::with_prefix("CFGBIND_ENV_T7_").excluding("CFGBIND_ENV_T7_CONF");
        let entries = adapter.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("fetchBackoff"));
    }

    #[test]
    #[cfg(unix)]
    fn test_env_adapter_non_utf8_value() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("CFGBIND_ENV_T5_BAD", OsStr::from_bytes(b"\xff\xfe"));

        let unrelated = EnvVarAdapter::with_prefix("CFGBIND_ENV_T6_").entries();
        let matching = EnvVarAdapter::with_prefix("CFGBIND_ENV_T5_").entries();

        env::remove_var("CFGBIND_ENV_T5_BAD");

        assert!(unrelated.unwrap().is_empty());
        match matching {
            Err(ConfigError::SourceError { source_name, message, .. }) => {
                assert_eq!(source_name, "env");
                assert!(message.contains("CFGBIND_ENV_T5_BAD"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
