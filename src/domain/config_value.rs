// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration values.
//!
//! A leaf of the configuration tree is text, an integer, a boolean, or anything
//! else (floats, lists, maps, null), which is carried as an opaque YAML value.

use crate::domain::binding::BindingKind;
use crate::domain::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A configuration leaf value with its primitive type preserved.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::binding::BindingKind;
/// use cfgbind::domain::config_value::ConfigValue;
///
/// assert_eq!(ConfigValue::from("localhost").kind(), BindingKind::Text);
/// assert_eq!(ConfigValue::from(8080).kind(), BindingKind::Integer);
/// assert_eq!(ConfigValue::from(true).kind(), BindingKind::Boolean);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A boolean scalar.
    Boolean(bool),
    /// An integer scalar that fits in an `i64`.
    Integer(i64),
    /// A text scalar.
    Text(String),
    /// Any other value, kept as-is.
    Opaque(serde_yaml::Value),
}

impl ConfigValue {
    /// Classifies a parsed YAML value.
    ///
    /// Integers outside the `i64` range, floats, sequences, mappings and null
    /// become [`ConfigValue::Opaque`].
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::String(s) => ConfigValue::Text(s),
            serde_yaml::Value::Bool(b) => ConfigValue::Boolean(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Opaque(serde_yaml::Value::Number(n)),
            },
            other => ConfigValue::Opaque(other),
        }
    }

    /// Returns the natural binding kind of this value.
    ///
    /// Never returns [`BindingKind::BackoffPolicy`]; that kind only arises when
    /// text is converted by the resolver.
    pub fn kind(&self) -> BindingKind {
        match self {
            ConfigValue::Text(_) => BindingKind::Text,
            ConfigValue::Integer(_) => BindingKind::Integer,
            ConfigValue::Boolean(_) => BindingKind::Boolean,
            ConfigValue::Opaque(_) => BindingKind::Opaque,
        }
    }

    /// Returns the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Reads the value as a boolean.
    ///
    /// Boolean values pass through. Text is recognised case-insensitively:
    /// - `true`: "true", "yes", "1", "on"
    /// - `false`: "false", "no", "0", "off"
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgbind::domain::config_value::ConfigValue;
    ///
    /// assert!(ConfigValue::from("Yes").as_bool("app.debug").unwrap());
    /// assert!(!ConfigValue::from(false).as_bool("app.debug").unwrap());
    /// ```
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            ConfigValue::Text(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(true),
                "false" | "no" | "0" | "off" => Ok(false),
                _ => s
                    .parse::<bool>()
                    .map_err(|e| ConfigError::from_parse_bool_error(key.to_string(), e)),
            },
            other => Err(other.mismatch(key, "boolean")),
        }
    }

    /// Reads the value as an `i64`.
    ///
    /// Integer values pass through; text is parsed after trimming whitespace.
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        match self {
            ConfigValue::Integer(i) => Ok(*i),
            ConfigValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e)),
            other => Err(other.mismatch(key, "integer")),
        }
    }

    /// Parses a text value into any type that implements `FromStr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgbind::domain::config_value::ConfigValue;
    /// use std::net::IpAddr;
    ///
    /// let ip: IpAddr = ConfigValue::from("127.0.0.1").parse("server.bind").unwrap();
    /// assert!(ip.is_loopback());
    /// ```
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let text = self
            .as_text()
            .ok_or_else(|| self.mismatch(key, std::any::type_name::<T>()))?;
        text.parse::<T>()
            .map_err(|e| ConfigError::TypeConversionError {
                key: key.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Box::new(e),
            })
    }

    fn mismatch(&self, key: &str, target_type: &str) -> ConfigError {
        ConfigError::TypeConversionError {
            key: key.to_string(),
            target_type: target_type.to_string(),
            source: format!("value is {}, not text", self.kind()).into(),
        }
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Text(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        ConfigValue::Integer(i64::from(i))
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Boolean(b)
    }
}

impl From<serde_yaml::Value> for ConfigValue {
    fn from(value: serde_yaml::Value) -> Self {
        ConfigValue::from_yaml(value)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(s) => f.write_str(s),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Boolean(b) => write!(f, "{}", b),
            ConfigValue::Opaque(v) => match serde_yaml::to_string(v) {
                Ok(s) => f.write_str(s.trim_end()),
                Err(_) => write!(f, "{:?}", v),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn test_from_yaml_classifies_scalars() {
        let doc: serde_yaml::Value =
            serde_yaml::from_str("{s: hi, i: 42, b: true, f: 1.5, n: null, l: [1]}").unwrap();
        let get = |k: &str| ConfigValue::from_yaml(doc.get(k).unwrap().clone());

        assert_eq!(get("s"), ConfigValue::Text("hi".to_string()));
        assert_eq!(get("i"), ConfigValue::Integer(42));
        assert_eq!(get("b"), ConfigValue::Boolean(true));
        assert_eq!(get("f").kind(), BindingKind::Opaque);
        assert_eq!(get("n").kind(), BindingKind::Opaque);
        assert_eq!(get("l").kind(), BindingKind::Opaque);
    }

    #[test]
    fn test_from_yaml_large_unsigned_is_opaque() {
        let v: serde_yaml::Value = serde_yaml::from_str("18446744073709551615").unwrap();
        assert_eq!(ConfigValue::from_yaml(v).kind(), BindingKind::Opaque);
    }

    #[test]
    fn test_as_bool_text_variants() {
        for val in ["true", "True", "YES", "1", "on"] {
            assert!(ConfigValue::from(val).as_bool("k").unwrap(), "{}", val);
        }
        for val in ["false", "False", "no", "0", "OFF"] {
            assert!(!ConfigValue::from(val).as_bool("k").unwrap(), "{}", val);
        }
        assert!(ConfigValue::from("maybe").as_bool("k").is_err());
    }

    #[test]
    fn test_as_bool_rejects_integer() {
        let err = ConfigValue::from(1).as_bool("k").unwrap_err();
        assert!(matches!(err, ConfigError::TypeConversionError { .. }));
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(ConfigValue::from(7).as_i64("k").unwrap(), 7);
        assert_eq!(ConfigValue::from(" -42 ").as_i64("k").unwrap(), -42);
        assert!(ConfigValue::from("3.14").as_i64("k").is_err());
        assert!(ConfigValue::from(true).as_i64("k").is_err());
    }

    #[test]
    fn test_parse_custom_type() {
        let ip: IpAddr = ConfigValue::from("127.0.0.1").parse("k").unwrap();
        assert_eq!(ip.to_string(), "127.0.0.1");

        let result: Result<IpAddr> = ConfigValue::from(5).parse("k");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigValue::from("x").to_string(), "x");
        assert_eq!(ConfigValue::from(5).to_string(), "5");
        assert_eq!(ConfigValue::from(false).to_string(), "false");
        let seq: serde_yaml::Value = serde_yaml::from_str("[1, 2]").unwrap();
        assert!(ConfigValue::from(seq).to_string().contains('1'));
    }

    #[test]
    fn test_deserialize_untagged() {
        let v: ConfigValue = serde_yaml::from_str("true").unwrap();
        assert_eq!(v, ConfigValue::Boolean(true));
        let v: ConfigValue = serde_yaml::from_str("12").unwrap();
        assert_eq!(v, ConfigValue::Integer(12));
        let v: ConfigValue = serde_yaml::from_str("hello").unwrap();
        assert_eq!(v, ConfigValue::Text("hello".to_string()));
        let v: ConfigValue = serde_yaml::from_str("2.5").unwrap();
        assert_eq!(v.kind(), BindingKind::Opaque);
    }
}
