// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing configuration source implementations.
//!
//! Each adapter implements the `ConfigSource` port for one layer of the
//! configuration tree. Built-in defaults are always available; the other
//! layers are gated by feature flags.

#[cfg(feature = "cli")]
pub mod cli;
pub mod defaults;
#[cfg(feature = "env")]
pub mod env_var;
#[cfg(feature = "yaml")]
pub mod yaml_file;

// Re-export adapters based on feature flags
#[cfg(feature = "cli")]
pub use cli::CommandLineAdapter;
pub use defaults::DefaultsSource;
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
#[cfg(feature = "yaml")]
pub use yaml_file::{YamlFileAdapter, YamlParser};
