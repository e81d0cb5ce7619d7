// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration bindings with backoff policy parsing.
//!
//! This crate turns a layered configuration tree into a table of named, typed
//! bindings that a server can hand to its components at startup. Only settings
//! that were explicitly configured are bound; built-in defaults stay in the tree
//! for the components that read them directly.
//!
//! Keys ending in `Backoff` hold retry schedules written in a compact grammar
//! (`"100ms,200ms,400ms"`, `"1sx3,5s*2,cap1m,jitter"`) and are bound as parsed
//! [`BackoffPolicy`](domain::BackoffPolicy) values. A malformed schedule fails
//! the whole resolution, with every offending key reported at once.
//!
//! # Architecture
//!
//! - **Domain Layer**: keys, values, entries, the tree, backoff policies,
//!   bindings and errors
//! - **Ports**: the `ConfigSource` and `ConfigParser` traits
//! - **Adapters**: built-in defaults, YAML files, environment variables and
//!   command-line arguments
//! - **Service**: `ConfigLoader` stacks sources into a tree; `BindingResolver`
//!   turns the tree into a `BindingTable`
//!
//! # Feature Flags
//!
//! - `yaml`: YAML file support (default)
//! - `env`: environment variable support (default)
//! - `cli`: command-line argument support (default)
//! - `full`: all of the above
//!
//! # Quick Start
//!
//! ```rust
//! use cfgbind::prelude::*;
//! use std::time::Duration;
//!
//! const FETCH_BACKOFF: TypedKey<BackoffPolicy> = TypedKey::new("fetchBackoff");
//!
//! # fn main() -> cfgbind::domain::Result<()> {
//! let tree = ConfigLoader::new()
//!     .with_defaults(DefaultsSource::new().with_value("http.port", 9554))
//!     .with_cli_args(["--fetchBackoff=100ms,200ms,400ms"])
//!     .load()?;
//!
//! let bindings = BindingResolver::new().resolve(&tree)?;
//! let backoff = bindings.require(&FETCH_BACKOFF)?;
//!
//! assert_eq!(backoff.delay_for_attempt(4), Duration::from_millis(400));
//! assert!(!bindings.contains("http.port"));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
pub mod prelude {
    pub use crate::domain::{
        BackoffPolicy, Binding, BindingKind, BindingTable, BoundValue, ConfigEntry, ConfigError,
        ConfigKey, ConfigTree, ConfigValue, FromBoundValue, Origin, Result, TypedKey,
    };
    pub use crate::ports::{ConfigParser, ConfigSource};
    pub use crate::service::{BindingResolver, ConfigLoader, KindRule};

    pub use crate::adapters::DefaultsSource;
    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineAdapter;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileAdapter, YamlParser};
}
