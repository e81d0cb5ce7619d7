// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for integration tests.

use cfgbind::domain::{ConfigKey, ConfigValue, Result};
use cfgbind::ports::ConfigSource;
use std::collections::BTreeMap;
use std::env;

/// A configuration source with predefined values and a custom priority.
#[derive(Debug, Clone)]
pub struct MockConfigSource {
    name: String,
    priority: u8,
    values: BTreeMap<ConfigKey, ConfigValue>,
}

#[allow(dead_code)]
impl MockConfigSource {
    /// Creates a new mock source with the given name and priority.
    pub fn new(name: impl Into<String>, priority: u8) -> Self {
        Self {
            name: name.into(),
            priority,
            values: BTreeMap::new(),
        }
    }

    /// Adds a value to the mock source.
    pub fn with_value(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(ConfigKey::from(key), value.into());
        self
    }

    /// Boxes the source for a loader.
    pub fn boxed(self) -> Box<dyn ConfigSource> {
        Box::new(self)
    }
}

impl ConfigSource for MockConfigSource {
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
        Ok(self.values.clone())
    }
}

/// Sets environment variables and removes them on drop.
#[allow(dead_code)]
pub struct EnvGuard {
    keys: Vec<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new() -> Self {
        EnvGuard { keys: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
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
