// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument configuration source adapter.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::ConfigSource;
use std::collections::BTreeMap;

/// Configuration source adapter for command-line arguments.
///
/// Recognised forms:
/// - `--key=value`
/// - `--key value`
/// - `--flag` (followed by another option or nothing), bound as `true`
///
/// Anything else, including positional arguments, is ignored. Values are text;
/// bare flags are booleans.
///
/// # Priority
///
/// Command-line arguments have the highest priority (3).
///
/// # Examples
///
/// ```rust
/// use cfgbind::adapters::CommandLineAdapter;
/// use cfgbind::domain::ConfigValue;
/// use cfgbind::ports::ConfigSource;
///
/// let adapter = CommandLineAdapter::from_args(["--fetchBackoff=1s,5s", "--http.port", "9554", "--verbose"]);
/// assert_eq!(adapter.get_str("http.port").unwrap(), Some(ConfigValue::from("9554")));
/// assert_eq!(adapter.get_str("verbose").unwrap(), Some(ConfigValue::from(true)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLineAdapter {
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl CommandLineAdapter {
    /// Creates an adapter with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the given arguments (without the program name).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let mut values = BTreeMap::new();
        let mut rest = args.iter().map(|s| AsRef::<str>::as_ref(s)).peekable();

        while let Some(arg) = rest.next() {
            let Some(option) = arg.strip_prefix("--").filter(|o| !o.is_empty()) else {
                continue;
            };

            if let Some((key, value)) = option.split_once('=') {
                values.insert(ConfigKey::from(key), ConfigValue::from(value));
                continue;
            }

            let value = match rest.peek() {
                Some(next) if !next.starts_with("--") => {
                    let value = ConfigValue::from(*next);
                    rest.next();
                    value
                }
                _ => ConfigValue::Boolean(true),
            };
            values.insert(ConfigKey::from(option), value);
        }

        Self { values }
    }

    /// Parses the process's own arguments, skipping the program name.
    pub fn from_env_args() -> Self {
        Self::from_args(std::env::args().skip(1))
    }
}

impl ConfigSource for CommandLineAdapter {
    fn name(&self) -> &str {
        "cli"
    }

    fn priority(&self) -> u8 {
        3
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

    #[test]
    fn test_cli_adapter_name_and_priority() {
        let adapter = CommandLineAdapter::new();
        assert_eq!(adapter.name(), "cli");
        assert_eq!(adapter.priority(), 3);
        assert!(adapter.entries().unwrap().is_empty());
    }

    #[test]
    fn test_cli_adapter_equals_form() {
        let adapter = CommandLineAdapter::from_args(["--repo.syncBackoff=1s,cap5s"]);
        assert_eq!(
            adapter.get_str("repo.syncBackoff").unwrap(),
            Some(ConfigValue::from("1s,cap5s"))
        );
    }

    #[test]
    fn test_cli_adapter_space_form() {
        let adapter = CommandLineAdapter::from_args(vec!["--data.dir", "/var/qdb"]);
        assert_eq!(
            adapter.get_str("data.dir").unwrap(),
            Some(ConfigValue::from("/var/qdb"))
        );
    }

    #[test]
    fn test_cli_adapter_bare_flags() {
        let adapter = CommandLineAdapter::from_args(["--debug", "--port", "1", "--quiet"]);
        assert_eq!(adapter.get_str("debug").unwrap(), Some(ConfigValue::Boolean(true)));
        assert_eq!(adapter.get_str("port").unwrap(), Some(ConfigValue::from("1")));
        assert_eq!(adapter.get_str("quiet").unwrap(), Some(ConfigValue::Boolean(true)));
    }

    #[test]
    fn test_cli_adapter_negative_number_value() {
        let adapter = CommandLineAdapter::from_args(["--offset", "-5"]);
        assert_eq!(adapter.get_str("offset").unwrap(), Some(ConfigValue::from("-5")));
    }

    #[test]
    fn test_cli_adapter_ignores_positionals() {
        let adapter = CommandLineAdapter::from_args(["serve", "--", "-x"]);
        assert!(adapter.entries().unwrap().is_empty());
    }

    #[test]
    fn test_cli_adapter_last_occurrence_wins() {
        let adapter = CommandLineAdapter::from_args(["--a=1", "--a=2"]);
        assert_eq!(adapter.get_str("a").unwrap(), Some(ConfigValue::from("2")));
    }
}
