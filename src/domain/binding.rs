// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named, typed bindings produced by resolution.
//!
//! A [`BindingTable`] maps names to tagged values. Consumers read it back by
//! `(name, type)` through [`BindingTable::get`] or a declared [`TypedKey`], so the
//! wiring step that constructs components is explicit and statically typed.

use crate::domain::backoff::BackoffPolicy;
use crate::domain::{ConfigError, ConfigKey, ConfigValue, Origin, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// The type a binding is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKind {
    /// Plain text.
    Text,
    /// A signed 64-bit integer.
    Integer,
    /// A boolean flag.
    Boolean,
    /// A parsed [`BackoffPolicy`].
    BackoffPolicy,
    /// Any other value, bound as-is.
    Opaque,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingKind::Text => "text",
            BindingKind::Integer => "integer",
            BindingKind::Boolean => "boolean",
            BindingKind::BackoffPolicy => "backoff policy",
            BindingKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// A bound value, tagged with its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundValue {
    /// Plain text.
    Text(String),
    /// A signed 64-bit integer.
    Integer(i64),
    /// A boolean flag.
    Boolean(bool),
    /// A parsed backoff policy.
    Backoff(BackoffPolicy),
    /// Any other value.
    Opaque(serde_yaml::Value),
}

impl BoundValue {
    /// Returns the kind this value is bound under.
    pub fn kind(&self) -> BindingKind {
        match self {
            BoundValue::Text(_) => BindingKind::Text,
            BoundValue::Integer(_) => BindingKind::Integer,
            BoundValue::Boolean(_) => BindingKind::Boolean,
            BoundValue::Backoff(_) => BindingKind::BackoffPolicy,
            BoundValue::Opaque(_) => BindingKind::Opaque,
        }
    }
}

impl From<ConfigValue> for BoundValue {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Text(s) => BoundValue::Text(s),
            ConfigValue::Integer(i) => BoundValue::Integer(i),
            ConfigValue::Boolean(b) => BoundValue::Boolean(b),
            ConfigValue::Opaque(v) => BoundValue::Opaque(v),
        }
    }
}

impl From<BackoffPolicy> for BoundValue {
    fn from(policy: BackoffPolicy) -> Self {
        BoundValue::Backoff(policy)
    }
}

/// A Rust type that can be read out of a [`BoundValue`].
pub trait FromBoundValue: Sized {
    /// The binding kind this type is registered under.
    const KIND: BindingKind;

    /// Extracts the value, or `None` if `value` is of another kind.
    fn from_bound(value: &BoundValue) -> Option<Self>;
}

impl FromBoundValue for String {
    const KIND: BindingKind = BindingKind::Text;

    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromBoundValue for i64 {
    const KIND: BindingKind = BindingKind::Integer;

    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromBoundValue for bool {
    const KIND: BindingKind = BindingKind::Boolean;

    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromBoundValue for BackoffPolicy {
    const KIND: BindingKind = BindingKind::BackoffPolicy;

    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Backoff(p) => Some(p.clone()),
            _ => None,
        }
    }
}

impl FromBoundValue for serde_yaml::Value {
    const KIND: BindingKind = BindingKind::Opaque;

    fn from_bound(value: &BoundValue) -> Option<Self> {
        match value {
            BoundValue::Opaque(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// A binding name declared together with the type it must hold.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::backoff::BackoffPolicy;
/// use cfgbind::domain::binding::{BindingKind, TypedKey};
///
/// const FETCH: TypedKey<BackoffPolicy> = TypedKey::new("fetchBackoff");
/// assert_eq!(FETCH.kind(), BindingKind::BackoffPolicy);
/// ```
pub struct TypedKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedKey<T> {
    /// Declares a key.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the binding name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: FromBoundValue> TypedKey<T> {
    /// Returns the kind the key is declared as.
    pub fn kind(&self) -> BindingKind {
        T::KIND
    }
}

impl<T> Clone for TypedKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedKey<T> {}

impl<T> fmt::Debug for TypedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedKey").field(&self.name).finish()
    }
}

/// One named, typed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    name: ConfigKey,
    value: BoundValue,
    origin: Origin,
}

impl Binding {
    /// Creates a binding.
    pub fn new(name: ConfigKey, value: BoundValue, origin: Origin) -> Self {
        Self {
            name,
            value,
            origin,
        }
    }

    /// Returns the binding name, equal to the originating configuration key.
    pub fn name(&self) -> &ConfigKey {
        &self.name
    }

    /// Returns the kind the value is bound under.
    pub fn kind(&self) -> BindingKind {
        self.value.kind()
    }

    /// Returns the bound value.
    pub fn value(&self) -> &BoundValue {
        &self.value
    }

    /// Returns the provenance of the originating entry.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

/// The immutable output of resolution: at most one binding per name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingTable {
    bindings: BTreeMap<ConfigKey, Binding>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding, replacing and returning any binding with the same name.
    pub(crate) fn insert(&mut self, binding: Binding) -> Option<Binding> {
        self.bindings.insert(binding.name.clone(), binding)
    }

    /// Returns the raw binding under `name`.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Reads the value bound under `name` as `T`.
    ///
    /// # Errors
    ///
    /// `BindingNotFound` if nothing is bound under `name`, `BindingTypeMismatch`
    /// if the binding holds another kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgbind::domain::{ConfigEntry, ConfigTree, Origin};
    /// use cfgbind::service::BindingResolver;
    ///
    /// let tree: ConfigTree = vec![ConfigEntry::new("http.port", 9090, Origin::explicit("cli"))]
    ///     .into_iter()
    ///     .collect();
    /// let table = BindingResolver::new().resolve(&tree).unwrap();
    ///
    /// assert_eq!(table.get::<i64>("http.port").unwrap(), 9090);
    /// assert!(table.get::<String>("http.port").is_err());
    /// ```
    pub fn get<T: FromBoundValue>(&self, name: &str) -> Result<T> {
        self.find(name)?
            .ok_or_else(|| ConfigError::BindingNotFound {
                name: name.to_string(),
            })
    }

    /// Like [`BindingTable::get`], but an unbound name yields `Ok(None)`.
    ///
    /// Useful for consumers that fall back to their own built-in default.
    pub fn find<T: FromBoundValue>(&self, name: &str) -> Result<Option<T>> {
        let Some(binding) = self.bindings.get(name) else {
            return Ok(None);
        };
        T::from_bound(&binding.value)
            .map(Some)
            .ok_or_else(|| ConfigError::BindingTypeMismatch {
                name: name.to_string(),
                expected: T::KIND,
                actual: binding.kind(),
            })
    }

    /// Reads the value bound under `name`, or `default` if nothing is bound.
    pub fn get_or<T: FromBoundValue>(&self, name: &str, default: T) -> Result<T> {
        Ok(self.find(name)?.unwrap_or(default))
    }

    /// Reads a declared key.
    pub fn require<T: FromBoundValue>(&self, key: &TypedKey<T>) -> Result<T> {
        self.get(key.name())
    }

    /// Borrows the backoff policy bound under `name`.
    pub fn backoff(&self, name: &str) -> Result<&BackoffPolicy> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| ConfigError::BindingNotFound {
                name: name.to_string(),
            })?;
        match &binding.value {
            BoundValue::Backoff(policy) => Ok(policy),
            other => Err(ConfigError::BindingTypeMismatch {
                name: name.to_string(),
                expected: BindingKind::BackoffPolicy,
                actual: other.kind(),
            }),
        }
    }

    /// Returns `true` if something is bound under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the bound names in order.
    pub fn names(&self) -> impl Iterator<Item = &ConfigKey> {
        self.bindings.keys()
    }

    /// Iterates over the bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// Counts bindings per kind.
    pub fn kinds_summary(&self) -> BTreeMap<BindingKind, usize> {
        let mut summary = BTreeMap::new();
        for binding in self.bindings.values() {
            *summary.entry(binding.kind()).or_insert(0) += 1;
        }
        summary
    }

    /// Hands the underlying map to the wiring step.
    pub fn into_inner(self) -> BTreeMap<ConfigKey, Binding> {
        self.bindings
    }
}
