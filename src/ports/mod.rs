// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits describe where configuration comes from. They are implemented by
//! the adapters and consumed by the loader; the resolver never sees them.

pub mod parser;
pub mod source;

// Re-export commonly used types
pub use parser::ConfigParser;
pub use source::ConfigSource;
