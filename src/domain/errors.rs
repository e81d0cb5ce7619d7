// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the binding resolver.
//!
//! This module defines the errors raised while loading a configuration tree,
//! parsing backoff specifications, resolving bindings and reading them back.
//! All errors use `thiserror` for proper error handling and conversion.

use crate::domain::binding::BindingKind;
use std::fmt;
use std::num::ParseIntError;
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration and binding operations.
///
/// Every failure detected during the startup resolution pass surfaces as one of
/// these variants. It is marked as `#[non_exhaustive]` to allow for future
/// additions without breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::errors::ConfigError;
///
/// fn lookup() -> Result<String, ConfigError> {
///     Err(ConfigError::BindingNotFound {
///         name: "fetchBackoff".to_string(),
///     })
/// }
///
/// assert!(lookup().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested key is not present in the configuration tree.
    #[error("Configuration key not found: {key}")]
    ConfigKeyNotFound {
        /// The key that was not found
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error occurred in a configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a configuration document.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A key following the `Backoff` naming convention holds an invalid spec.
    #[error("Invalid {key} [{spec}]: {source}")]
    MalformedBackoffSpec {
        /// The offending key
        key: String,
        /// The raw text that failed to parse
        spec: String,
        /// The parser's error detail
        source: BackoffParseError,
    },

    /// No binding exists under the requested name.
    #[error("No binding named '{name}'")]
    BindingNotFound {
        /// The requested binding name
        name: String,
    },

    /// A binding exists under the requested name but holds a different kind.
    #[error("Binding '{name}' is bound as {actual}, not {expected}")]
    BindingTypeMismatch {
        /// The requested binding name
        name: String,
        /// The kind the caller asked for
        expected: BindingKind,
        /// The kind actually bound
        actual: BindingKind,
    },

    /// One or more entries failed during resolution; no table was produced.
    #[error(
        "Invalid configuration, {} offending key(s): {}",
        .failures.len(),
        join_failures(.failures)
    )]
    ConfigurationError {
        /// Every entry-level failure, in key order
        failures: Vec<ConfigError>,
    },
}

fn join_failures(failures: &[ConfigError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }

    /// Returns the configuration key this error is attributed to, if any.
    ///
    /// For an aggregated [`ConfigError::ConfigurationError`] this is `None`; use
    /// [`ConfigError::offending_keys`] instead.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::ConfigKeyNotFound { key }
            | ConfigError::TypeConversionError { key, .. }
            | ConfigError::MalformedBackoffSpec { key, .. } => Some(key),
            ConfigError::BindingNotFound { name }
            | ConfigError::BindingTypeMismatch { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Lists every key named by this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgbind::domain::errors::ConfigError;
    ///
    /// let err = ConfigError::ConfigurationError {
    ///     failures: vec![
    ///         ConfigError::ConfigKeyNotFound { key: "a".to_string() },
    ///         ConfigError::ConfigKeyNotFound { key: "b".to_string() },
    ///     ],
    /// };
    /// assert_eq!(err.offending_keys(), vec!["a", "b"]);
    /// ```
    pub fn offending_keys(&self) -> Vec<&str> {
        match self {
            ConfigError::ConfigurationError { failures } => {
                failures.iter().flat_map(|f| f.offending_keys()).collect()
            }
            other => other.key().into_iter().collect(),
        }
    }
}

/// The way a backoff specification failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackoffErrorKind {
    /// The specification is empty or has an empty item.
    Empty,
    /// A duration has a missing or unrecognised unit suffix.
    UnknownUnit,
    /// A duration is zero or negative.
    NonPositiveDuration,
    /// A duration is not a valid number or does not fit in a `Duration`.
    InvalidDuration,
    /// An `xN` or `*F` modifier is malformed or out of range.
    MalformedModifier,
    /// The cap is smaller than the first tier's delay.
    CapBelowFirstTier,
    /// A tier is shorter than the tier before it.
    DecreasingTier,
    /// A growth tier is followed by another tier.
    GrowthNotLast,
    /// A growth tier has no explicit cap.
    MissingCap,
    /// `cap` or `jitter` is repeated or placed before a tier.
    MisplacedItem,
}

impl fmt::Display for BackoffErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BackoffErrorKind::Empty => "empty backoff specification",
            BackoffErrorKind::UnknownUnit => "unknown duration unit (expected ms, s or m)",
            BackoffErrorKind::NonPositiveDuration => "duration must be positive",
            BackoffErrorKind::InvalidDuration => "invalid duration",
            BackoffErrorKind::MalformedModifier => "malformed modifier (expected xN or *F)",
            BackoffErrorKind::CapBelowFirstTier => "cap is smaller than the first delay",
            BackoffErrorKind::DecreasingTier => "delay is smaller than the previous delay",
            BackoffErrorKind::GrowthNotLast => "growth tier must be the last tier",
            BackoffErrorKind::MissingCap => "growth tier requires an explicit cap",
            BackoffErrorKind::MisplacedItem => "cap and jitter must follow the tiers, once each",
        };
        f.write_str(text)
    }
}

/// A backoff specification could not be parsed.
///
/// Carries the offending substring so operators can locate the mistake.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} at '{fragment}'")]
pub struct BackoffParseError {
    kind: BackoffErrorKind,
    fragment: String,
}

impl BackoffParseError {
    /// Creates a new parse error for the given fragment.
    pub fn new(kind: BackoffErrorKind, fragment: impl Into<String>) -> Self {
        Self {
            kind,
            fragment: fragment.into(),
        }
    }

    /// Returns the failure category.
    pub fn kind(&self) -> BackoffErrorKind {
        self.kind
    }

    /// Returns the substring of the specification that failed.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
