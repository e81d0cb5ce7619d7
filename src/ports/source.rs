// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! A `ConfigSource` is one layer of the configuration tree: built-in defaults,
//! a YAML file, the environment, or the command line. The loader stacks sources
//! by priority and tags every entry with the origin of the layer that won.

use crate::domain::{ConfigKey, ConfigValue, Origin, Result};
use std::collections::BTreeMap;

/// A trait for configuration sources.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow for use in multi-threaded contexts.
///
/// # Priority
///
/// Higher priority values override lower ones when the loader merges layers:
///
/// - **3**: Command-line arguments
/// - **2**: Environment variables
/// - **1**: Configuration files
/// - **0**: Built-in defaults
///
/// # Examples
///
/// ```rust
/// use cfgbind::ports::ConfigSource;
/// use cfgbind::domain::{ConfigKey, ConfigValue, Result};
/// use std::collections::BTreeMap;
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn priority(&self) -> u8 {
///         1
///     }
///
///     fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
///         Ok((key.as_str() == "answer").then(|| ConfigValue::from(42)))
///     }
///
///     fn entries(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>> {
///         Ok(BTreeMap::from([(ConfigKey::from("answer"), ConfigValue::from(42))]))
///     }
/// }
///
/// assert!(Fixed.origin().is_explicit());
/// assert!(Fixed.get_str("answer").unwrap().is_some());
/// ```
pub trait ConfigSource: Send + Sync {
    /// Returns the name of this source, used in origins and log lines.
    fn name(&self) -> &str;

    /// Returns the priority of this source.
    fn priority(&self) -> u8;

    /// Returns the origin stamped on entries supplied by this source.
    ///
    /// Defaults to an explicit origin named after the source; only built-in
    /// default layers should override this.
    fn origin(&self) -> Origin {
        Origin::explicit(self.name())
    }

    /// Retrieves the value for a single key.
    ///
    /// * `Ok(Some(ConfigValue))` - The value was found
    /// * `Ok(None)` - The key does not exist in this source
    /// * `Err(ConfigError)` - An error occurred
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>>;

    /// Returns every flattened entry this source supplies.
    fn entries(&self) -> Result<BTreeMap<ConfigKey, ConfigValue>>;

    /// Retrieves a value by key string.
    fn get_str(&self, key: &str) -> Result<Option<ConfigValue>> {
        self.get(&ConfigKey::from(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestSource {
        values: BTreeMap<ConfigKey, ConfigValue>,
    }

    impl ConfigSource for TestSource {
        fn name(&self) -> &str {
            "test-source"
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

    fn source() -> TestSource {
        TestSource {
            values: BTreeMap::from([(ConfigKey::from("app.name"), ConfigValue::from("qdb"))]),
        }
    }

    #[test]
    fn test_default_origin_is_explicit() {
        assert_eq!(source().origin(), Origin::explicit("test-source"));
    }

    #[test]
    fn test_get_str() {
        let source = source();
        assert_eq!(
            source.get_str("app.name").unwrap(),
            Some(ConfigValue::from("qdb"))
        );
        assert!(source.get_str("nope").unwrap().is_none());
    }

    #[test]
    fn test_config_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn ConfigSource>>();
    }
}
