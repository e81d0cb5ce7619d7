// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! Parsers turn a document into a flat, typed key/value map.

use crate::domain::{ConfigKey, ConfigValue, Result};
use std::collections::BTreeMap;

/// A trait for parsing configuration documents.
///
/// # Key Format
///
/// Nested mappings are flattened with dot notation, so
///
/// ```yaml
/// http:
///   port: 9554
/// ```
///
/// becomes `http.port -> Integer(9554)`. Scalars keep their primitive type; any
/// other leaf (lists, floats) is carried as an opaque value.
pub trait ConfigParser {
    /// Parses document content into a flat map of typed values.
    fn parse(&self, content: &str) -> Result<BTreeMap<ConfigKey, ConfigValue>>;

    /// Returns the file extensions (without the leading dot) this parser handles.
    fn supported_extensions(&self) -> &[&str];
}
