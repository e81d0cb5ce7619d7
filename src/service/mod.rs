// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: loading layered sources into a tree and resolving the tree
//! into bindings.

pub mod loader;
pub mod resolver;

pub use loader::{ConfigLoader, LOCAL_OVERRIDE_STEM, LOCAL_OVERRIDE_VAR};
pub use resolver::{resolve, BindingResolver, KeyMatcher, KindRule, BACKOFF_SUFFIX};
