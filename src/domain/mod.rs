// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and logic.
//!
//! This module holds the configuration tree model, the backoff policy parser and
//! the binding table. It is independent of where configuration is loaded from.

pub mod backoff;
pub mod binding;
pub mod config_entry;
pub mod config_key;
pub mod config_tree;
pub mod config_value;
pub mod errors;

// Re-export commonly used types
pub use backoff::BackoffPolicy;
pub use binding::{Binding, BindingKind, BindingTable, BoundValue, FromBoundValue, TypedKey};
pub use config_entry::{ConfigEntry, Origin};
pub use config_key::ConfigKey;
pub use config_tree::ConfigTree;
pub use config_value::ConfigValue;
pub use errors::{BackoffErrorKind, BackoffParseError, ConfigError, Result};
