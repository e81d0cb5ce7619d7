// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a configuration tree into a binding table.
//!
//! Only explicitly configured entries are bound. Each one keeps its natural
//! kind unless a [`KindRule`] declares a target kind for its key, in which case
//! text is converted. The default rule set sends every key ending in `Backoff`
//! through the backoff policy parser.

use crate::domain::{
    BackoffPolicy, Binding, BindingKind, BindingTable, BoundValue, ConfigEntry, ConfigError,
    ConfigKey, ConfigTree, ConfigValue, Result,
};

/// The reserved key suffix for backoff specifications.
pub const BACKOFF_SUFFIX: &str = "Backoff";

/// Which keys a [`KindRule`] applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyMatcher {
    /// Exactly this key.
    Exact(ConfigKey),
    /// Any key whose full dotted path ends with this suffix.
    Suffix(String),
}

impl KeyMatcher {
    /// Returns `true` if `key` is covered.
    pub fn matches(&self, key: &ConfigKey) -> bool {
        match self {
            KeyMatcher::Exact(exact) => exact == key,
            KeyMatcher::Suffix(suffix) => key.ends_with(suffix),
        }
    }
}

/// Declares the kind that text under matching keys must be bound as.
///
/// Rules only apply to text values. Integers, booleans and opaque values are
/// always bound under their own kind.
///
/// # Examples
///
/// ```
/// use cfgbind::domain::{BindingKind, ConfigKey};
/// use cfgbind::service::KindRule;
///
/// let rule = KindRule::exact("http.port", BindingKind::Integer);
/// assert!(rule.matches(&ConfigKey::from("http.port")));
/// assert!(!rule.matches(&ConfigKey::from("https.port")));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindRule {
    matcher: KeyMatcher,
    kind: BindingKind,
}

impl KindRule {
    /// Declares the kind of a single key.
    pub fn exact(key: impl Into<ConfigKey>, kind: BindingKind) -> Self {
        Self {
            matcher: KeyMatcher::Exact(key.into()),
            kind,
        }
    }

    /// Declares the kind of every key ending in `suffix`.
    pub fn suffix(suffix: impl Into<String>, kind: BindingKind) -> Self {
        Self {
            matcher: KeyMatcher::Suffix(suffix.into()),
            kind,
        }
    }

    /// Returns the key matcher.
    pub fn matcher(&self) -> &KeyMatcher {
        &self.matcher
    }

    /// Returns the declared kind.
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Returns `true` if the rule covers `key`.
    pub fn matches(&self, key: &ConfigKey) -> bool {
        self.matcher.matches(key)
    }

    fn is_exact(&self) -> bool {
        matches!(self.matcher, KeyMatcher::Exact(_))
    }
}

/// Resolves configuration trees into binding tables.
///
/// Resolution is a pure function of the tree and the rules: it never mutates
/// the tree and its result does not depend on entry order.
///
/// # Examples
///
/// ```rust
/// use cfgbind::domain::{BackoffPolicy, ConfigEntry, ConfigTree, Origin};
/// use cfgbind::service::BindingResolver;
/// use std::time::Duration;
///
/// let tree: ConfigTree = vec![
///     ConfigEntry::new("fetchBackoff", "100ms,200ms,400ms", Origin::explicit("yaml-file")),
///     ConfigEntry::default_value("http.port", 9554),
/// ]
/// .into_iter()
/// .collect();
///
/// let table = BindingResolver::new().resolve(&tree).unwrap();
/// let policy: BackoffPolicy = table.get("fetchBackoff").unwrap();
///
/// assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(400));
/// assert!(!table.contains("http.port"));
/// ```
#[derive(Clone, Debug)]
pub struct BindingResolver {
    rules: Vec<KindRule>,
}

impl BindingResolver {
    /// Creates a resolver with the default rule set (the `Backoff` suffix).
    pub fn new() -> Self {
        Self {
            rules: vec![KindRule::suffix(BACKOFF_SUFFIX, BindingKind::BackoffPolicy)],
        }
    }

    /// Creates a resolver with no kind rules; every entry keeps its natural kind.
    pub fn without_rules() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a kind rule.
    pub fn with_rule(mut self, rule: KindRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several kind rules.
    pub fn with_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = KindRule>,
    {
        self.rules.extend(rules);
        self
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[KindRule] {
        &self.rules
    }

    /// Returns the kind declared for `key`, if any.
    ///
    /// Exact rules take precedence over suffix rules; among rules of the same
    /// sort the first declared wins.
    pub fn declared_kind(&self, key: &ConfigKey) -> Option<BindingKind> {
        self.rules
            .iter()
            .find(|r| r.is_exact() && r.matches(key))
            .or_else(|| self.rules.iter().find(|r| r.matches(key)))
            .map(KindRule::kind)
    }

    /// Binds a single entry, ignoring its origin.
    ///
    /// # Errors
    ///
    /// `MalformedBackoffSpec` if a backoff key holds an invalid spec;
    /// `TypeConversionError` if text cannot be read as a declared integer or
    /// boolean.
    pub fn bind_entry(&self, entry: &ConfigEntry) -> Result<Binding> {
        let key = entry.key();
        let value = match (entry.value(), self.declared_kind(key)) {
            (ConfigValue::Text(text), Some(kind)) => convert_text(key, entry.value(), text, kind)?,
            (value, _) => BoundValue::from(value.clone()),
        };
        Ok(Binding::new(key.clone(), value, entry.origin().clone()))
    }

    /// Resolves every explicitly configured entry of `tree`.
    ///
    /// # Errors
    ///
    /// If any entry fails, returns a single `ConfigurationError` listing every
    /// failure, and no table.
    pub fn resolve(&self, tree: &ConfigTree) -> Result<BindingTable> {
        let mut table = BindingTable::new();
        let mut failures = Vec::new();
        let mut skipped = 0usize;

        for entry in tree.entries() {
            if !entry.is_explicit() {
                skipped += 1;
                continue;
            }
            match self.bind_entry(entry) {
                Ok(binding) => {
                    table.insert(binding);
                }
                Err(e) => {
                    tracing::warn!(
                        "Rejecting configuration key '{}' from {}: {}",
                        entry.key(),
                        entry.origin(),
                        e
                    );
                    failures.push(e);
                }
            }
        }

        tracing::debug!("Skipped {} built-in default entries", skipped);

        if !failures.is_empty() {
            return Err(ConfigError::ConfigurationError { failures });
        }

        tracing::info!(
            "Resolved {} configuration bindings: {:?}",
            table.len(),
            table.kinds_summary()
        );
        Ok(table)
    }
}

impl Default for BindingResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_text(
    key: &ConfigKey,
    value: &ConfigValue,
    text: &str,
    kind: BindingKind,
) -> Result<BoundValue> {
    Ok(match kind {
        BindingKind::Text => BoundValue::Text(text.to_string()),
        BindingKind::Integer => BoundValue::Integer(value.as_i64(key.as_str())?),
        BindingKind::Boolean => BoundValue::Boolean(value.as_bool(key.as_str())?),
        BindingKind::BackoffPolicy => {
            let policy =
                BackoffPolicy::parse(text).map_err(|source| ConfigError::MalformedBackoffSpec {
                    key: key.to_string(),
                    spec: text.to_string(),
                    source,
                })?;
            BoundValue::Backoff(policy)
        }
        BindingKind::Opaque => BoundValue::Opaque(serde_yaml::Value::String(text.to_string())),
    })
}

/// Resolves `tree` with the default rule set.
pub fn resolve(tree: &ConfigTree) -> Result<BindingTable> {
    BindingResolver::new().resolve(tree)
}
